use mesh_kernel::KernelError;
use setting_types::ParameterError;

use crate::clearance::{ClearancePair, ClearanceViolation};

/// Why a generation request produced no output.
#[derive(Debug, Clone, thiserror::Error)]
pub enum GenerationError {
    /// A spec field is out of range or inconsistent with another.
    #[error(transparent)]
    InvalidParameter(#[from] ParameterError),

    /// Two parts that must not touch come closer than the clearance gap.
    #[error("geometry infeasible: {pair} separated by {distance:.4} mm, need at least {min_gap} mm")]
    GeometryInfeasible {
        pair: ClearancePair,
        distance: f64,
        min_gap: f64,
    },

    /// The production mesh is not a single closed solid.
    #[error("production assembly failed: {reason}")]
    AssemblyFailure { reason: String },

    /// A mesh builder rejected its input.
    #[error("mesh construction failed: {0}")]
    Kernel(#[from] KernelError),
}

impl From<ClearanceViolation> for GenerationError {
    fn from(v: ClearanceViolation) -> Self {
        GenerationError::GeometryInfeasible {
            pair: v.pair,
            distance: v.distance,
            min_gap: v.min_gap,
        }
    }
}

impl GenerationError {
    /// The spec field at fault, for parameter errors.
    pub fn field(&self) -> Option<&'static str> {
        match self {
            GenerationError::InvalidParameter(e) => Some(e.field),
            _ => None,
        }
    }
}
