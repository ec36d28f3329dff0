/// Errors raised while constructing or combining meshes.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum KernelError {
    #[error("profile has {provided} points, need at least {required}")]
    InsufficientProfile { required: usize, provided: usize },

    #[error("need at least {required} stations, got {provided}")]
    InsufficientStations { required: usize, provided: usize },

    #[error("{parameter} must be positive, got {value}")]
    InvalidDimension { parameter: &'static str, value: f64 },

    #[error("profile must be wound counter-clockwise (signed area {area})")]
    ProfileOrientation { area: f64 },

    #[error("stations must increase strictly within [0, 2π): station {index} = {value}")]
    UnorderedStations { index: usize, value: f64 },

    #[error("section {index} has {found} points, expected {expected}")]
    SectionMismatch {
        index: usize,
        expected: usize,
        found: usize,
    },

    #[error("index {index} out of range (vertex count = {vertex_count})")]
    IndexOutOfRange { index: u32, vertex_count: usize },

    #[error("union failed: {reason}")]
    UnionFailed { reason: String },
}
