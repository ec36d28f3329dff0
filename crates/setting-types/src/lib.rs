//! Strongly typed parameter sets for prong-setting generation.
//!
//! Every recognized option is a field or enum variant with a documented
//! default, and each spec validates itself before any geometry is built.

pub mod band;
pub mod error;
pub mod prong;
pub mod stone;

pub use band::*;
pub use error::ParameterError;
pub use prong::*;
pub use stone::*;
