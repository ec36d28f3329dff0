//! Prong-setting geometry: stones, bands, prongs, clearance and assembly.
//!
//! [`generate`] runs the whole pipeline for one parameter set and returns a
//! designer scene plus a single watertight production solid.

pub mod assembly;
pub mod base;
pub mod clearance;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod placement;
pub mod prong;
pub mod shapes;

pub use assembly::{DesignerMesh, Fragment, MeshAssembler, PartKind, PartRange, ProductionMesh};
pub use base::{build_base, BaseMesh};
pub use clearance::{
    ClearanceMode, ClearancePair, ClearancePolicy, ClearanceReport, ClearanceScene,
    ClearanceViolation, PairClearance,
};
pub use config::{GeneratorConfig, ProductionOptions, TessellationConfig};
pub use error::GenerationError;
pub use pipeline::{generate, Generator, SettingOutput, SettingRequest};
pub use placement::{PlacementTransform, SettingFrame};
pub use prong::ProngMesh;
