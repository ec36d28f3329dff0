//! Prong solids: a lofted, tapering shaft from a foot seat to a girdle seat.

use mesh_kernel::sweep::loft_sections;
use mesh_kernel::{Aabb, TriMesh};
use nalgebra::{Point3, Vector3};
use setting_types::{ProngSpec, ProngStyle};
use tracing::{debug, instrument};

use crate::config::TessellationConfig;
use crate::error::GenerationError;
use crate::placement::PlacementTransform;
use crate::shapes::seat::SeatPatch;

/// Points per cross-section; every section has the shape of a seat loop.
pub const SECTION_LEN: usize = SeatPatch::LOOP.len();

/// Position of each seat-patch point on the section loop.
const LOOP_POSITION: [usize; 6] = [0, 1, 2, 5, 4, 3];

/// A closed prong.
#[derive(Debug, Clone)]
pub struct ProngMesh {
    pub index: u32,
    pub mesh: TriMesh,
    /// Loft sections, foot first. The last two form the tip stub.
    pub section_count: usize,
}

impl ProngMesh {
    /// Vertices of one section.
    pub fn section(&self, i: usize) -> &[Point3<f64>] {
        &self.mesh.positions[i * SECTION_LEN..(i + 1) * SECTION_LEN]
    }

    /// Vertices of the shaft, leaving out the tip stub that meets the stone.
    pub fn shaft_vertices(&self) -> &[Point3<f64>] {
        &self.mesh.positions[..(self.section_count - 2) * SECTION_LEN]
    }

    /// Bounds of the tip stub, where the prong holds the stone.
    pub fn stub_bounds(&self) -> Aabb {
        let start = self.section_count.saturating_sub(2) * SECTION_LEN;
        let end = (self.section_count * SECTION_LEN).min(self.mesh.positions.len());
        Aabb::from_points(&self.mesh.positions[start..end])
    }
}

/// Centreline point and taper weight at parameter `t ∈ [0, 1]`.
fn centreline(placement: &PlacementTransform, style: ProngStyle, t: f64) -> (Point3<f64>, f64) {
    let b = placement.base;
    let e = placement.tip;
    match style {
        ProngStyle::Straight => (b + (e - b) * t, t),
        ProngStyle::CurvedClaw { bow } => {
            let axis = placement.axis();
            let radial = placement.radial();
            let outward = (radial - axis * radial.dot(&axis)).normalize();
            let control = nalgebra::center(&b, &e) + outward * bow;
            let u = 1.0 - t;
            let p = b.coords * (u * u) + control.coords * (2.0 * u * t) + e.coords * (t * t);
            (Point3::from(p), t * t)
        }
    }
}

/// Build a prong capped with its placement's own analytic seats.
pub fn build(
    placement: &PlacementTransform,
    spec: &ProngSpec,
    tess: &TessellationConfig,
) -> Result<ProngMesh, GenerationError> {
    build_anchored(
        placement,
        spec,
        tess,
        &placement.base_seat,
        &placement.tip_seat,
    )
}

/// Build a prong whose end sections are copied from host seat patches.
///
/// The foot section and the last section are the patch boundaries exactly,
/// and the caps are the patch faces reversed, so the ends stitch onto the
/// hosts by cancellation.
#[instrument(skip_all, fields(index = placement.index))]
pub fn build_anchored(
    placement: &PlacementTransform,
    spec: &ProngSpec,
    tess: &TessellationConfig,
    base: &SeatPatch,
    tip: &SeatPatch,
) -> Result<ProngMesh, GenerationError> {
    let base_loop = base.loop_points();
    let tip_loop = tip.loop_points();
    let foot: Vec<Vector3<f64>> = base_loop.iter().map(|p| p - placement.base).collect();
    let head: Vec<Vector3<f64>> = tip_loop.iter().map(|p| p - placement.contact).collect();

    let steps = tess.prong_sections;
    let mut sections = Vec::with_capacity(steps + 2);
    sections.push(base_loop);
    for k in 1..=steps {
        let t = k as f64 / steps as f64;
        let (centre, w) = centreline(placement, spec.style, t);
        sections.push(
            foot.iter()
                .zip(&head)
                .map(|(f, h)| centre + f.lerp(h, w))
                .collect(),
        );
    }
    sections.push(tip_loop);

    let section_count = sections.len();
    let mut mesh = loft_sections(&sections)?;
    cap(&mut mesh, base, 0);
    cap(&mut mesh, tip, (section_count - 1) * SECTION_LEN);

    debug!(
        sections = section_count,
        triangles = mesh.triangle_count(),
        "prong built"
    );
    Ok(ProngMesh {
        index: placement.index,
        mesh,
        section_count,
    })
}

/// Close a loft end with the host patch faces, reversed.
fn cap(mesh: &mut TriMesh, patch: &SeatPatch, offset: usize) {
    let at = |i: usize| (offset + LOOP_POSITION[i]) as u32;
    for &[x, y, z] in &patch.faces {
        mesh.add_triangle(at(x), at(z), at(y));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::placement::solve;
    use crate::shapes::{BandMetrics, Silhouette, StoneProfile};
    use approx::assert_relative_eq;
    use mesh_kernel::analyze;
    use setting_types::{BandSpec, StoneSpec};

    fn placements(prong: &ProngSpec) -> Vec<PlacementTransform> {
        let stone = StoneSpec::round(6.5, 6.5, 4.0);
        solve(
            &Silhouette::from_spec(&stone),
            &StoneProfile::of(&stone),
            &BandMetrics::of(&BandSpec::flat(8.5, 1.0)),
            prong,
        )
        .unwrap()
    }

    #[test]
    fn loop_positions_follow_seat_loop() {
        for (slot, &i) in SeatPatch::LOOP.iter().enumerate() {
            assert_eq!(LOOP_POSITION[i], slot);
        }
    }

    #[test]
    fn straight_prong_is_closed_solid() {
        let spec = ProngSpec::new(4, 0.8, 0.5, 3.5);
        let tess = TessellationConfig::default();
        for pl in placements(&spec) {
            let prong = build(&pl, &spec, &tess).unwrap();
            let report = analyze(&prong.mesh);
            assert!(report.is_single_solid(), "{report:?}");
            assert_eq!(report.genus, Some(0));
            assert!(prong.mesh.signed_volume() > 0.0);
            assert_eq!(prong.section_count, tess.prong_sections + 2);
        }
    }

    #[test]
    fn curved_claw_is_closed_and_bows_outward() {
        let straight = ProngSpec::new(4, 0.8, 0.5, 3.5);
        let curved = straight
            .clone()
            .with_style(ProngStyle::CurvedClaw { bow: 0.6 });
        let tess = TessellationConfig::default();
        let pl = &placements(&curved)[0];
        let a = build(pl, &straight, &tess).unwrap();
        let b = build(pl, &curved, &tess).unwrap();
        assert!(analyze(&b.mesh).is_single_solid());
        assert!(b.mesh.signed_volume() > 0.0);

        let mid = tess.prong_sections / 2;
        let centre = |p: &ProngMesh| {
            let s = p.section(mid);
            s.iter().fold(Vector3::zeros(), |acc, q| acc + q.coords) / s.len() as f64
        };
        assert!(centre(&b).x > centre(&a).x);
    }

    #[test]
    fn ends_copy_seats_exactly() {
        let spec = ProngSpec::new(4, 0.8, 0.5, 3.5);
        let pl = &placements(&spec)[1];
        let prong = build(pl, &spec, &TessellationConfig::preview()).unwrap();
        assert_eq!(prong.section(0), pl.base_seat.loop_points().as_slice());
        assert_eq!(
            prong.section(prong.section_count - 1),
            pl.tip_seat.loop_points().as_slice()
        );
    }

    #[test]
    fn shaft_tapers_toward_tip() {
        let spec = ProngSpec::new(4, 0.8, 0.5, 3.5);
        let pl = &placements(&spec)[0];
        let prong = build(pl, &spec, &TessellationConfig::default()).unwrap();
        let width = |s: &[Point3<f64>]| (s[0] - s[2]).norm();
        let first = width(prong.section(1));
        let last = width(prong.section(prong.section_count - 2));
        assert!(first > last);
        assert_relative_eq!(
            prong.section(prong.section_count - 2)[1].x,
            pl.tip.x - (pl.contact.x - pl.tip_seat.points[1].x),
            epsilon = 1e-12
        );
        assert_eq!(
            prong.shaft_vertices().len(),
            (prong.section_count - 2) * SECTION_LEN
        );
    }

    #[test]
    fn stub_bounds_cover_the_tip_seat() {
        let spec = ProngSpec::new(4, 0.8, 0.5, 3.5);
        let pl = &placements(&spec)[0];
        let prong = build(pl, &spec, &TessellationConfig::default()).unwrap();
        let stub = prong.stub_bounds();
        for p in pl.tip_seat.loop_points() {
            assert!(stub.contains(&p));
        }
        assert!(!stub.contains(&pl.base));
    }
}
