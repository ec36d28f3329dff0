//! Designer and production assembly of the setting parts.

use std::fmt;

use mesh_kernel::{analyze, CoordinateFrame, TopologyReport, TriMesh, UnionKernel};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::config::ProductionOptions;
use crate::error::GenerationError;

/// Name of the frame every output mesh is expressed in.
pub const FRAME_NAME: &str = "setting";

/// Which part a mesh or triangle range belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "kind", content = "index", rename_all = "snake_case")]
pub enum PartKind {
    Band,
    Stone,
    Base,
    Prong(u32),
}

impl PartKind {
    pub fn is_metal(self) -> bool {
        !matches!(self, PartKind::Stone)
    }
}

impl fmt::Display for PartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PartKind::Band => write!(f, "band"),
            PartKind::Stone => write!(f, "stone"),
            PartKind::Base => write!(f, "base"),
            PartKind::Prong(i) => write!(f, "prong_{i}"),
        }
    }
}

/// One closed part mesh in the setting frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fragment {
    pub part: PartKind,
    pub mesh: TriMesh,
}

impl Fragment {
    pub fn new(part: PartKind, mesh: TriMesh) -> Self {
        Self { part, mesh }
    }
}

/// Triangles `start..end` of a combined mesh came from `part`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartRange {
    pub part: PartKind,
    pub start: usize,
    pub end: usize,
}

impl PartRange {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// The parts side by side, unrepaired. Contacts overlap by coincident faces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DesignerMesh {
    pub frame: CoordinateFrame,
    pub fragments: Vec<Fragment>,
}

impl DesignerMesh {
    pub fn fragment(&self, part: PartKind) -> Option<&Fragment> {
        self.fragments.iter().find(|f| f.part == part)
    }

    pub fn prong_count(&self) -> usize {
        self.fragments
            .iter()
            .filter(|f| matches!(f.part, PartKind::Prong(_)))
            .count()
    }

    pub fn triangle_count(&self) -> usize {
        self.fragments.iter().map(|f| f.mesh.triangle_count()).sum()
    }

    /// Concatenate the fragments into one mesh with per-part triangle ranges.
    pub fn flatten(&self) -> (TriMesh, Vec<PartRange>) {
        let mut mesh = TriMesh::new();
        let mut parts = Vec::with_capacity(self.fragments.len());
        for f in &self.fragments {
            let start = mesh.triangle_count();
            mesh.merge(&f.mesh);
            parts.push(PartRange {
                part: f.part,
                start,
                end: mesh.triangle_count(),
            });
        }
        (mesh, parts)
    }
}

/// A single closed solid ready for manufacture.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductionMesh {
    pub frame: CoordinateFrame,
    pub mesh: TriMesh,
    /// Surviving triangles of each input part, contiguous and in part order.
    pub parts: Vec<PartRange>,
    pub topology: TopologyReport,
}

impl ProductionMesh {
    pub fn range(&self, part: PartKind) -> Option<&PartRange> {
        self.parts.iter().find(|r| r.part == part)
    }

    pub fn genus(&self) -> Option<i64> {
        self.topology.genus
    }
}

/// Builds both output variants from the positioned parts.
pub struct MeshAssembler<'k> {
    kernel: &'k dyn UnionKernel,
    options: ProductionOptions,
}

impl<'k> MeshAssembler<'k> {
    pub fn new(kernel: &'k dyn UnionKernel, options: ProductionOptions) -> Self {
        Self { kernel, options }
    }

    /// Concatenate parts for viewing. Never fails.
    pub fn designer(&self, fragments: Vec<Fragment>) -> DesignerMesh {
        DesignerMesh {
            frame: CoordinateFrame::world(FRAME_NAME),
            fragments,
        }
    }

    /// Union the parts into one solid and check that it is closed.
    #[instrument(skip_all, fields(kernel = self.kernel.name(), parts = fragments.len()))]
    pub fn production(&self, fragments: &[Fragment]) -> Result<ProductionMesh, GenerationError> {
        let selected: Vec<&Fragment> = fragments
            .iter()
            .filter(|f| self.options.include_stone || f.part.is_metal())
            .collect();
        let meshes: Vec<&TriMesh> = selected.iter().map(|f| &f.mesh).collect();
        let output = self
            .kernel
            .union(&meshes)
            .map_err(|e| GenerationError::AssemblyFailure {
                reason: format!("{} union failed: {e}", self.kernel.name()),
            })?;
        if output.sources.len() != output.mesh.triangle_count() {
            return Err(GenerationError::AssemblyFailure {
                reason: format!(
                    "{} union labelled {} of {} triangles",
                    self.kernel.name(),
                    output.sources.len(),
                    output.mesh.triangle_count()
                ),
            });
        }

        let (mesh, parts) = group_by_source(output.mesh, &output.sources, &selected)?;
        let topology = analyze(&mesh);

        let prongs = selected
            .iter()
            .filter(|f| matches!(f.part, PartKind::Prong(_)))
            .count() as i64;
        let expected_genus = if self.options.include_stone { prongs } else { 1 };
        check_closure(&mesh, &topology, expected_genus)?;

        info!(
            triangles = mesh.triangle_count(),
            genus = ?topology.genus,
            include_stone = self.options.include_stone,
            "production mesh assembled"
        );
        Ok(ProductionMesh {
            frame: CoordinateFrame::world(FRAME_NAME),
            mesh,
            parts,
            topology,
        })
    }

    /// Build both variants. The production solid is checked first so that a
    /// failure returns no output at all.
    pub fn assemble(
        &self,
        fragments: Vec<Fragment>,
    ) -> Result<(DesignerMesh, ProductionMesh), GenerationError> {
        let production = self.production(&fragments)?;
        Ok((self.designer(fragments), production))
    }
}

/// Reorder triangles so each source part is one contiguous range.
fn group_by_source(
    mesh: TriMesh,
    sources: &[u32],
    selected: &[&Fragment],
) -> Result<(TriMesh, Vec<PartRange>), GenerationError> {
    let mut order: Vec<usize> = (0..mesh.triangle_count()).collect();
    order.sort_by_key(|&t| sources[t]);

    let mut grouped = TriMesh {
        positions: mesh.positions,
        triangles: Vec::with_capacity(order.len()),
    };
    let mut parts: Vec<PartRange> = Vec::with_capacity(selected.len());
    for t in order {
        let source = sources[t] as usize;
        let part = selected
            .get(source)
            .map(|f| f.part)
            .ok_or_else(|| GenerationError::AssemblyFailure {
                reason: format!("triangle labelled with unknown part {source}"),
            })?;
        let index = grouped.triangle_count();
        match parts.last_mut() {
            Some(range) if range.part == part => range.end = index + 1,
            _ => parts.push(PartRange {
                part,
                start: index,
                end: index + 1,
            }),
        }
        grouped.triangles.push(mesh.triangles[t]);
    }
    Ok((grouped, parts))
}

fn check_closure(
    mesh: &TriMesh,
    topology: &TopologyReport,
    expected_genus: i64,
) -> Result<(), GenerationError> {
    let fail = |reason: String| Err(GenerationError::AssemblyFailure { reason });
    if !topology.is_closed_manifold() {
        return fail(format!(
            "not a closed manifold: {} boundary, {} non-manifold, {} inconsistent edges, {} degenerate triangles",
            topology.boundary_edges,
            topology.non_manifold_edges,
            topology.inconsistent_edges,
            topology.degenerate_triangles
        ));
    }
    if topology.components != 1 {
        return fail(format!("{} disconnected pieces", topology.components));
    }
    let Some(genus) = topology.genus else {
        return fail(format!(
            "odd Euler characteristic {}",
            topology.euler_characteristic
        ));
    };
    let volume = mesh.signed_volume();
    if volume <= 0.0 {
        return fail(format!("non-positive volume {volume}"));
    }
    if genus != expected_genus {
        return fail(format!("genus {genus}, expected {expected_genus}"));
    }
    debug!(genus, volume, "closure verified");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use mesh_kernel::mesh::unit_cube;
    use mesh_kernel::{KernelError, StitchKernel, UnionOutput};
    use nalgebra::Vector3;

    struct FailingKernel;

    impl UnionKernel for FailingKernel {
        fn name(&self) -> &'static str {
            "failing"
        }

        fn union(&self, _parts: &[&TriMesh]) -> Result<UnionOutput, KernelError> {
            Err(KernelError::UnionFailed {
                reason: "unsupported".to_string(),
            })
        }
    }

    /// Concatenates without stitching.
    struct ConcatKernel;

    impl UnionKernel for ConcatKernel {
        fn name(&self) -> &'static str {
            "concat"
        }

        fn union(&self, parts: &[&TriMesh]) -> Result<UnionOutput, KernelError> {
            let mut mesh = TriMesh::new();
            let mut sources = Vec::new();
            for (i, p) in parts.iter().enumerate() {
                mesh.merge(p);
                sources.extend(std::iter::repeat(i as u32).take(p.triangle_count()));
            }
            Ok(UnionOutput { mesh, sources })
        }
    }

    fn two_cubes() -> Vec<Fragment> {
        vec![
            Fragment::new(PartKind::Band, unit_cube()),
            Fragment::new(PartKind::Base, unit_cube().translated(&Vector3::new(0.0, 0.0, 1.0))),
        ]
    }

    fn casting() -> ProductionOptions {
        ProductionOptions {
            include_stone: false,
        }
    }

    #[test]
    fn designer_keeps_every_fragment() {
        let kernel = StitchKernel::default();
        let assembler = MeshAssembler::new(&kernel, ProductionOptions::default());
        let designer = assembler.designer(two_cubes());
        assert_eq!(designer.fragments.len(), 2);
        assert_eq!(designer.frame.name, "setting");
        let (mesh, parts) = designer.flatten();
        assert_eq!(mesh.triangle_count(), 24);
        assert_eq!(parts[1].start, 12);
        assert_eq!(parts[1].len(), 12);
    }

    #[test]
    fn stacked_parts_stitch_with_ranges() {
        // No prongs with the stone included: a genus-0 solid is expected.
        let kernel = StitchKernel::default();
        let assembler = MeshAssembler::new(&kernel, ProductionOptions::default());
        let production = assembler.production(&two_cubes()).unwrap();
        assert_eq!(production.genus(), Some(0));
        assert_eq!(production.mesh.triangle_count(), 20);
        let band = production.range(PartKind::Band).unwrap();
        let base = production.range(PartKind::Base).unwrap();
        assert_eq!((band.start, band.end), (0, 10));
        assert_eq!((base.start, base.end), (10, 20));
    }

    #[test]
    fn genus_mismatch_is_assembly_failure() {
        let kernel = StitchKernel::default();
        let assembler = MeshAssembler::new(&kernel, casting());
        let err = assembler.production(&two_cubes()).unwrap_err();
        assert!(matches!(err, GenerationError::AssemblyFailure { ref reason } if reason.contains("genus 0")));
    }

    #[test]
    fn disconnected_parts_fail() {
        let parts = vec![
            Fragment::new(PartKind::Band, unit_cube()),
            Fragment::new(PartKind::Base, unit_cube().translated(&Vector3::new(3.0, 0.0, 0.0))),
        ];
        let kernel = StitchKernel::default();
        let err = MeshAssembler::new(&kernel, ProductionOptions::default())
            .production(&parts)
            .unwrap_err();
        assert!(matches!(err, GenerationError::AssemblyFailure { ref reason } if reason.contains("disconnected")));
    }

    #[test]
    fn unstitched_contact_stays_disconnected() {
        let err = MeshAssembler::new(&ConcatKernel, ProductionOptions::default())
            .production(&two_cubes())
            .unwrap_err();
        assert!(matches!(err, GenerationError::AssemblyFailure { ref reason } if reason.contains("disconnected")));
    }

    #[test]
    fn kernel_error_becomes_assembly_failure() {
        let err = MeshAssembler::new(&FailingKernel, ProductionOptions::default())
            .assemble(two_cubes())
            .unwrap_err();
        assert!(matches!(err, GenerationError::AssemblyFailure { ref reason } if reason.contains("unsupported")));
    }

    #[test]
    fn casting_drops_the_stone() {
        let parts = vec![
            Fragment::new(PartKind::Band, unit_cube()),
            Fragment::new(PartKind::Stone, unit_cube().translated(&Vector3::new(0.0, 0.0, 1.0))),
        ];
        let kernel = StitchKernel::default();
        let err = MeshAssembler::new(&kernel, casting())
            .production(&parts)
            .unwrap_err();
        // A lone cube has genus 0, not the band's genus 1.
        assert!(matches!(err, GenerationError::AssemblyFailure { ref reason } if reason.contains("expected 1")));
    }
}
