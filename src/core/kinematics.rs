use std::f64::consts::{PI, TAU};

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

/// Guard against division by zero in the pseudorapidity formula when pz -> p.
pub const ETA_EPSILON: f64 = 1e-10;

/// Transverse component sqrt(vx^2 + vy^2). Also the spatial radius when
/// applied to a position vector.
#[inline]
pub fn transverse(v: &Vector3<f64>) -> f64 {
    (v.x * v.x + v.y * v.y).sqrt()
}

/// Azimuthal angle atan2(vy, vx) in (-pi, pi].
#[inline]
pub fn azimuth(v: &Vector3<f64>) -> f64 {
    v.y.atan2(v.x)
}

/// Pseudorapidity 0.5 * ln((|v| + vz) / (|v| - vz + eps)).
#[inline]
pub fn pseudorapidity(v: &Vector3<f64>) -> f64 {
    let mag = v.norm();
    0.5 * ((mag + v.z) / (mag - v.z + ETA_EPSILON)).ln()
}

/// A half-open angular interval [lo, lo + 2pi) that azimuthal differences
/// are reduced into.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WrapWindow {
    pub lo: f64,
}

impl WrapWindow {
    /// [-pi, pi)
    pub fn symmetric() -> Self {
        Self { lo: -PI }
    }

    /// [-pi/2, 3pi/2)
    pub fn shifted() -> Self {
        Self { lo: -PI / 2.0 }
    }

    #[inline]
    pub fn hi(&self) -> f64 {
        self.lo + TAU
    }

    /// Reduces any finite angle into the window by repeated 2pi shifts.
    /// Terminating and idempotent.
    pub fn wrap(&self, mut dphi: f64) -> f64 {
        while dphi >= self.hi() {
            dphi -= TAU;
        }
        while dphi < self.lo {
            dphi += TAU;
        }
        dphi
    }
}
