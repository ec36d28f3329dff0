//! Triangle-mesh kernel for the setting generator.
//!
//! Everything here works on plain indexed triangle meshes: building them
//! by revolution and lofting, measuring them, checking closure, and
//! stitching several closed meshes into one solid.

pub mod bounds;
pub mod error;
pub mod mesh;
pub mod query;
pub mod sweep;
pub mod topology;
pub mod traits;
pub mod weld;

pub use bounds::Aabb;
pub use error::KernelError;
pub use mesh::{CoordinateFrame, TriMesh};
pub use topology::{analyze, TopologyReport};
pub use traits::{StitchKernel, UnionKernel, UnionOutput};

pub use nalgebra::{Point2, Point3, Vector3};

/// Tolerances for geometric comparisons.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Tolerance {
    /// Points closer than this are considered coincident (millimetres).
    pub coincidence: f64,
    /// Angles smaller than this (radians) are considered zero.
    pub angular: f64,
}

impl Default for Tolerance {
    fn default() -> Self {
        Self {
            coincidence: 1e-9,
            angular: 1e-9,
        }
    }
}

impl Tolerance {
    pub fn points_coincident(&self, a: &Point3<f64>, b: &Point3<f64>) -> bool {
        (a - b).norm() < self.coincidence
    }

    pub fn is_zero_length(&self, length: f64) -> bool {
        length.abs() < self.coincidence
    }

    pub fn is_zero_angle(&self, angle: f64) -> bool {
        angle.abs() < self.angular
    }
}

/// Normalize an angle into `[0, 2π)`.
pub fn normalize_angle(angle: f64) -> f64 {
    let tau = std::f64::consts::TAU;
    let a = angle.rem_euclid(tau);
    if a >= tau {
        0.0
    } else {
        a
    }
}
