//! STL writers, binary and ASCII.

use std::io::Write;

use mesh_kernel::{Point3, TriMesh, Vector3};
use tracing::debug;

use crate::error::ExportError;
use crate::{check_mesh, MeshWriter};

/// Unit face normal, or +Z for a degenerate triangle.
fn unit_normal([a, b, c]: [Point3<f64>; 3]) -> Vector3<f64> {
    (b - a)
        .cross(&(c - a))
        .try_normalize(1e-12)
        .unwrap_or_else(Vector3::z)
}

/// Binary STL.
///
/// - 80-byte header (the mesh name, zero padded)
/// - u32 triangle count (little-endian)
/// - per triangle: 3×f32 normal, 3×(3×f32) vertices, u16 attribute = 50 bytes
#[derive(Debug, Clone, Copy, Default)]
pub struct BinaryStl;

impl BinaryStl {
    pub const HEADER_LEN: usize = 80;
    pub const RECORD_LEN: usize = 50;

    /// Size in bytes of the output for `triangles` triangles.
    pub fn encoded_len(triangles: usize) -> usize {
        Self::HEADER_LEN + 4 + triangles * Self::RECORD_LEN
    }

    /// Encode into a fresh buffer.
    pub fn to_bytes(&self, mesh: &TriMesh, name: &str) -> Result<Vec<u8>, ExportError> {
        let mut buf = Vec::with_capacity(Self::encoded_len(mesh.triangle_count()));
        self.write_mesh(mesh, name, &mut buf)?;
        Ok(buf)
    }
}

impl MeshWriter for BinaryStl {
    fn format_name(&self) -> &'static str {
        "binary STL"
    }

    fn extension(&self) -> &'static str {
        "stl"
    }

    fn write_mesh(&self, mesh: &TriMesh, name: &str, out: &mut dyn Write) -> Result<(), ExportError> {
        check_mesh(mesh, name)?;
        let count = u32::try_from(mesh.triangle_count()).map_err(|_| {
            ExportError::TooManyTriangles {
                count: mesh.triangle_count(),
                max: u32::MAX,
            }
        })?;

        let mut header = [0u8; BinaryStl::HEADER_LEN];
        let label = format!("binary STL: {name}");
        let len = label.len().min(BinaryStl::HEADER_LEN);
        header[..len].copy_from_slice(&label.as_bytes()[..len]);
        out.write_all(&header)?;
        out.write_all(&count.to_le_bytes())?;

        let mut record = Vec::with_capacity(BinaryStl::RECORD_LEN);
        for tri in mesh.triangles_iter() {
            record.clear();
            let n = unit_normal(tri);
            for v in n.iter().chain(tri.iter().flat_map(|p| p.coords.iter())) {
                record.extend_from_slice(&(*v as f32).to_le_bytes());
            }
            record.extend_from_slice(&0u16.to_le_bytes());
            out.write_all(&record)?;
        }
        debug!(name, triangles = count, "binary STL written");
        Ok(())
    }
}

/// ASCII STL.
#[derive(Debug, Clone, Copy, Default)]
pub struct AsciiStl;

impl AsciiStl {
    pub fn to_text(&self, mesh: &TriMesh, name: &str) -> Result<String, ExportError> {
        let mut buf = Vec::with_capacity(mesh.triangle_count() * 256);
        self.write_mesh(mesh, name, &mut buf)?;
        // Only ASCII is written.
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }
}

impl MeshWriter for AsciiStl {
    fn format_name(&self) -> &'static str {
        "ASCII STL"
    }

    fn extension(&self) -> &'static str {
        "stl"
    }

    fn write_mesh(&self, mesh: &TriMesh, name: &str, out: &mut dyn Write) -> Result<(), ExportError> {
        check_mesh(mesh, name)?;
        writeln!(out, "solid {name}")?;
        for tri in mesh.triangles_iter() {
            let n = unit_normal(tri);
            writeln!(out, "  facet normal {} {} {}", n.x as f32, n.y as f32, n.z as f32)?;
            writeln!(out, "    outer loop")?;
            for p in &tri {
                writeln!(out, "      vertex {} {} {}", p.x as f32, p.y as f32, p.z as f32)?;
            }
            writeln!(out, "    endloop")?;
            writeln!(out, "  endfacet")?;
        }
        writeln!(out, "endsolid {name}")?;
        debug!(name, triangles = mesh.triangle_count(), "ASCII STL written");
        Ok(())
    }
}
