use tracing::{debug, instrument};

use crate::error::KernelError;
use crate::mesh::TriMesh;
use crate::weld;

/// Result of combining several closed meshes into one.
#[derive(Debug, Clone)]
pub struct UnionOutput {
    pub mesh: TriMesh,
    /// For each output triangle, the index of the input part it came from.
    pub sources: Vec<u32>,
}

/// Boolean-union service used to build a single solid from closed parts.
///
/// A full CAD kernel can implement this; [`StitchKernel`] handles parts that
/// were built to meet along exactly shared contact patches.
pub trait UnionKernel: Send + Sync {
    fn name(&self) -> &'static str;

    fn union(&self, parts: &[&TriMesh]) -> Result<UnionOutput, KernelError>;
}

/// Contact-aware stitching: weld coincident vertices, cancel opposing
/// contact faces, drop orphaned vertices.
#[derive(Debug, Clone, Copy)]
pub struct StitchKernel {
    /// Grid spacing for vertex welding (millimetres).
    pub weld_resolution: f64,
}

impl Default for StitchKernel {
    fn default() -> Self {
        Self {
            weld_resolution: 1e-6,
        }
    }
}

impl UnionKernel for StitchKernel {
    fn name(&self) -> &'static str {
        "stitch"
    }

    #[instrument(skip(self, parts), fields(parts = parts.len()))]
    fn union(&self, parts: &[&TriMesh]) -> Result<UnionOutput, KernelError> {
        if parts.is_empty() {
            return Err(KernelError::UnionFailed {
                reason: "no parts to combine".to_string(),
            });
        }
        if self.weld_resolution.is_nan() || self.weld_resolution <= 0.0 {
            return Err(KernelError::InvalidDimension {
                parameter: "weld_resolution",
                value: self.weld_resolution,
            });
        }

        let mut mesh = TriMesh::new();
        let mut sources = Vec::new();
        for (i, part) in parts.iter().enumerate() {
            part.validate_indices()?;
            mesh.merge(part);
            sources.extend(std::iter::repeat(i as u32).take(part.triangle_count()));
        }

        let welded = weld::weld_vertices(&mut mesh, self.weld_resolution);
        let cancelled = weld::cancel_opposing_faces(&mut mesh, &mut sources);
        let orphaned = weld::remove_unreferenced(&mut mesh);
        debug!(welded, cancelled, orphaned, "stitched parts");

        Ok(UnionOutput { mesh, sources })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::unit_cube;
    use crate::topology::analyze;
    use nalgebra::Vector3;

    #[test]
    fn stitch_joins_touching_cubes() {
        let a = unit_cube();
        let b = unit_cube().translated(&Vector3::new(1.0, 0.0, 0.0));
        let out = StitchKernel::default().union(&[&a, &b]).unwrap();
        let report = analyze(&out.mesh);
        assert!(report.is_single_solid(), "{report:?}");
        assert_eq!(out.sources.len(), out.mesh.triangle_count());
        assert_eq!(out.sources.iter().filter(|&&s| s == 0).count(), 10);
        assert_eq!(out.sources.iter().filter(|&&s| s == 1).count(), 10);
    }

    #[test]
    fn stitch_keeps_separate_parts_separate() {
        let a = unit_cube();
        let b = unit_cube().translated(&Vector3::new(3.0, 0.0, 0.0));
        let out = StitchKernel::default().union(&[&a, &b]).unwrap();
        assert_eq!(analyze(&out.mesh).components, 2);
    }

    #[test]
    fn stitch_rejects_empty_input() {
        assert!(matches!(
            StitchKernel::default().union(&[]),
            Err(KernelError::UnionFailed { .. })
        ));
    }
}
