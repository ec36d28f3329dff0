//! Writers that serialize setting meshes to interchange formats.
//!
//! The generator core never touches files. Callers pick a [`MeshWriter`]
//! and an [`ExportSink`] and hand both to [`export_setting`].

pub mod error;
pub mod json;
pub mod sink;
pub mod stl;

use std::io::Write;

use mesh_kernel::TriMesh;

pub use error::ExportError;
pub use json::JsonMesh;
pub use sink::{export_setting, DirectorySink, ExportSink, MemorySink};
pub use stl::{AsciiStl, BinaryStl};

/// Serializes one triangle mesh.
pub trait MeshWriter {
    fn format_name(&self) -> &'static str;

    /// File extension for names produced by [`export_setting`].
    fn extension(&self) -> &'static str {
        "mesh"
    }

    fn write_mesh(&self, mesh: &TriMesh, name: &str, out: &mut dyn Write) -> Result<(), ExportError>;
}

/// Reject meshes no format can represent.
pub(crate) fn check_mesh(mesh: &TriMesh, name: &str) -> Result<(), ExportError> {
    if mesh.is_empty() {
        return Err(ExportError::EmptyMesh {
            name: name.to_string(),
        });
    }
    let vertex_count = mesh.vertex_count();
    if let Some(&index) = mesh
        .triangles
        .iter()
        .flatten()
        .find(|&&i| i as usize >= vertex_count)
    {
        return Err(ExportError::IndexOutOfRange {
            index,
            vertex_count,
        });
    }
    Ok(())
}
