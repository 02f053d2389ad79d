use nalgebra::Vector3;

use azicorr::core::domain::{EventRecord, ParticleRecord};

/// Builds a particle from transverse momentum, azimuth and pseudorapidity,
/// with the position at the origin.
#[allow(dead_code)]
pub fn track(code: i32, pt: f64, phi: f64, eta: f64) -> ParticleRecord {
    track_at(code, pt, phi, eta, Vector3::zeros())
}

/// Same, with an explicit production position.
#[allow(dead_code)]
pub fn track_at(code: i32, pt: f64, phi: f64, eta: f64, position: Vector3<f64>) -> ParticleRecord {
    ParticleRecord {
        code,
        momentum: Vector3::new(pt * phi.cos(), pt * phi.sin(), pt * eta.sinh()),
        position,
    }
}

#[allow(dead_code)]
pub fn event(id: i64, impact_parameter: f64, particles: Vec<ParticleRecord>) -> EventRecord {
    EventRecord {
        id,
        impact_parameter,
        particles,
    }
}

/// A two-track hadron event: a pion at phi_1 and a kaon at phi_2, both well
/// inside acceptance, positions mirroring the momentum azimuths.
#[allow(dead_code)]
pub fn two_track_event(id: i64, impact_parameter: f64, phi_1: f64, phi_2: f64) -> EventRecord {
    event(
        id,
        impact_parameter,
        vec![
            track_at(
                211,
                1.0,
                phi_1,
                0.0,
                Vector3::new(phi_1.cos(), phi_1.sin(), 0.0),
            ),
            track_at(
                321,
                1.0,
                phi_2,
                0.0,
                Vector3::new(phi_2.cos(), phi_2.sin(), 0.0),
            ),
        ],
    )
}
