pub mod domain;
pub mod kinematics;
pub mod species;
