//! Indexed JSON mesh for web viewers.

use std::io::Write;

use mesh_kernel::{CoordinateFrame, TriMesh};
use serde::Serialize;
use tracing::debug;

use crate::error::ExportError;
use crate::{check_mesh, MeshWriter};

/// Format identifier written into every file.
pub const FORMAT_NAME: &str = "prong-setting-mesh";

/// Current format version.
pub const FORMAT_VERSION: u32 = 1;

/// The top-level file structure.
#[derive(Debug, Serialize)]
struct MeshFile<'a> {
    format: &'static str,
    version: u32,
    name: &'a str,
    frame: &'a CoordinateFrame,
    /// Flat `[x0, y0, z0, x1, ...]`.
    positions: Vec<f64>,
    /// Flat `[a0, b0, c0, a1, ...]`, counter-clockwise from outside.
    indices: Vec<u32>,
}

/// Writes `{format, version, name, frame, positions, indices}`.
#[derive(Debug, Clone, PartialEq)]
pub struct JsonMesh {
    pub frame: CoordinateFrame,
    pub pretty: bool,
}

impl Default for JsonMesh {
    fn default() -> Self {
        Self {
            frame: CoordinateFrame::world("setting"),
            pretty: false,
        }
    }
}

impl JsonMesh {
    pub fn with_frame(frame: CoordinateFrame) -> Self {
        Self {
            frame,
            ..Self::default()
        }
    }

    pub fn pretty(mut self) -> Self {
        self.pretty = true;
        self
    }

    pub fn to_json(&self, mesh: &TriMesh, name: &str) -> Result<String, ExportError> {
        let mut out = Vec::new();
        self.write_mesh(mesh, name, &mut out)?;
        // serde_json only emits UTF-8.
        Ok(String::from_utf8_lossy(&out).into_owned())
    }
}

impl MeshWriter for JsonMesh {
    fn format_name(&self) -> &'static str {
        "json"
    }

    fn extension(&self) -> &'static str {
        "json"
    }

    fn write_mesh(&self, mesh: &TriMesh, name: &str, out: &mut dyn Write) -> Result<(), ExportError> {
        check_mesh(mesh, name)?;
        let file = MeshFile {
            format: FORMAT_NAME,
            version: FORMAT_VERSION,
            name,
            frame: &self.frame,
            positions: mesh
                .positions
                .iter()
                .flat_map(|p| [p.x, p.y, p.z])
                .collect(),
            indices: mesh.triangles.iter().flatten().copied().collect(),
        };
        if self.pretty {
            serde_json::to_writer_pretty(&mut *out, &file)?;
        } else {
            serde_json::to_writer(&mut *out, &file)?;
        }
        debug!(
            name,
            vertices = mesh.vertex_count(),
            triangles = mesh.triangle_count(),
            "json mesh written"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mesh_kernel::mesh::unit_cube;
    use serde_json::Value;

    #[test]
    fn envelope_fields() {
        let text = JsonMesh::default().to_json(&unit_cube(), "cube").unwrap();
        let value: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["format"], "prong-setting-mesh");
        assert_eq!(value["version"], 1);
        assert_eq!(value["name"], "cube");
        assert_eq!(value["frame"]["name"], "setting");
        assert_eq!(value["positions"].as_array().unwrap().len(), 8 * 3);
        assert_eq!(value["indices"].as_array().unwrap().len(), 12 * 3);
    }

    #[test]
    fn indices_follow_triangles() {
        let cube = unit_cube();
        let text = JsonMesh::default().to_json(&cube, "cube").unwrap();
        let value: Value = serde_json::from_str(&text).unwrap();
        let indices: Vec<u64> = value["indices"]
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_u64().unwrap())
            .collect();
        let [a, b, c] = cube.triangles[0];
        assert_eq!(&indices[..3], &[u64::from(a), u64::from(b), u64::from(c)]);
    }

    #[test]
    fn pretty_output_parses_the_same() {
        let cube = unit_cube();
        let compact: Value =
            serde_json::from_str(&JsonMesh::default().to_json(&cube, "c").unwrap()).unwrap();
        let pretty_text = JsonMesh::default().pretty().to_json(&cube, "c").unwrap();
        assert!(pretty_text.contains('\n'));
        let pretty: Value = serde_json::from_str(&pretty_text).unwrap();
        assert_eq!(compact, pretty);
    }

    #[test]
    fn custom_frame_is_recorded() {
        let writer = JsonMesh::with_frame(CoordinateFrame::world("ring"));
        let value: Value =
            serde_json::from_str(&writer.to_json(&unit_cube(), "c").unwrap()).unwrap();
        assert_eq!(value["frame"]["name"], "ring");
    }

    #[test]
    fn empty_mesh_rejected() {
        let err = JsonMesh::default()
            .to_json(&TriMesh::new(), "nothing")
            .unwrap_err();
        assert!(matches!(err, ExportError::EmptyMesh { .. }));
    }
}
