//! Raised bases: shared bridges between prong pairs and the gallery rail.
//!
//! A base is an extrusion of part of the band's top face. Its floor is the
//! band patch reversed, so stitching cancels the two and the base grows out
//! of the band without a seam.

use std::collections::HashSet;

use mesh_kernel::TriMesh;
use nalgebra::Vector3;
use setting_types::{BaseStyle, ProngSpec};
use tracing::{debug, instrument};

use crate::error::GenerationError;
use crate::shapes::seat::SeatLoop;
use crate::shapes::BandMesh;

/// A raised base with one foot seat per prong on its top face.
#[derive(Debug, Clone)]
pub struct BaseMesh {
    pub style: BaseStyle,
    pub mesh: TriMesh,
    /// Indexed by prong.
    pub seats: Vec<SeatLoop>,
}

/// Station runs covered by the base, each listed in increasing azimuth.
fn station_runs(band: &BandMesh, style: BaseStyle) -> Vec<Vec<usize>> {
    let n = band.station_count();
    let walk = |from: usize, to: usize| {
        let mut run = vec![from];
        let mut j = from;
        while j != to {
            j = (j + 1) % n;
            run.push(j);
        }
        run
    };
    match style {
        BaseStyle::Individual => Vec::new(),
        BaseStyle::Gallery => vec![(0..=n).map(|j| j % n).collect()],
        BaseStyle::Shared => band
            .windows
            .chunks(2)
            .filter_map(|pair| match pair {
                [a, b] => Some(walk(a.left, b.right)),
                _ => None,
            })
            .collect(),
    }
}

/// Build the raised base for `spec.base_style`, or `None` for individual feet.
#[instrument(skip_all, fields(style = ?spec.base_style))]
pub fn build_base(band: &BandMesh, spec: &ProngSpec) -> Result<Option<BaseMesh>, GenerationError> {
    if !spec.base_style.is_raised() {
        return Ok(None);
    }
    let lift = Vector3::new(0.0, 0.0, spec.base_height);
    let rows = band.rows;

    let mut region = Vec::new();
    for run in station_runs(band, spec.base_style) {
        for i in rows.outer..rows.rail {
            for pair in run.windows(2) {
                region.extend(band.cell_triangles(i, pair[0]));
            }
        }
    }

    let mut mesh = TriMesh::new();
    let mut copies: Vec<Option<[u32; 2]>> = vec![None; band.mesh.vertex_count()];
    let mut copy = |mesh: &mut TriMesh, v: u32| -> [u32; 2] {
        *copies[v as usize].get_or_insert_with(|| {
            let p = band.mesh.positions[v as usize];
            [mesh.add_vertex(p), mesh.add_vertex(p + lift)]
        })
    };

    let mut top_faces = Vec::with_capacity(region.len());
    let mut edges = HashSet::new();
    for &t in &region {
        let [a, b, c] = band.mesh.triangles[t];
        let [ab, at] = copy(&mut mesh, a);
        let [bb, bt] = copy(&mut mesh, b);
        let [cb, ct] = copy(&mut mesh, c);
        mesh.add_triangle(ab, cb, bb);
        mesh.add_triangle(at, bt, ct);
        top_faces.push([at, bt, ct]);
        edges.extend([(a, b), (b, c), (c, a)]);
    }

    for &t in &region {
        let [a, b, c] = band.mesh.triangles[t];
        for (u, v) in [(a, b), (b, c), (c, a)] {
            if edges.contains(&(v, u)) {
                continue;
            }
            let [ub, ut] = copy(&mut mesh, u);
            let [vb, vt] = copy(&mut mesh, v);
            mesh.add_triangle(vt, ut, ub);
            mesh.add_triangle(vt, ub, vb);
        }
    }

    let lifted = |v: u32| copies[v as usize].map(|[_, top]| top);
    let mut seats = Vec::with_capacity(band.windows.len());
    for w in &band.windows {
        let row = |i: usize| -> Option<[u32; 3]> {
            Some([
                lifted(band.vertex(i, w.left))?,
                lifted(band.vertex(i, w.center))?,
                lifted(band.vertex(i, w.right))?,
            ])
        };
        let (Some(near), Some(far)) = (row(rows.seat), row(rows.outer)) else {
            return Err(GenerationError::AssemblyFailure {
                reason: format!(
                    "{:?} base does not cover the prong seat at station {}",
                    spec.base_style, w.center
                ),
            });
        };
        let faces = [w.left, w.center]
            .into_iter()
            .flat_map(|j| band.cell_triangles(rows.outer, j))
            .filter_map(|t| region.iter().position(|&r| r == t))
            .map(|k| top_faces[k])
            .collect();
        seats.push(SeatLoop { near, far, faces });
    }

    debug!(
        cells = region.len() / 2,
        triangles = mesh.triangle_count(),
        "base built"
    );
    Ok(Some(BaseMesh {
        style: spec.base_style,
        mesh,
        seats,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TessellationConfig;
    use crate::shapes::seat::SeatWindow;
    use crate::shapes::{build_band_seated, BandSeating};
    use approx::assert_relative_eq;
    use mesh_kernel::{analyze, StitchKernel, UnionKernel};
    use setting_types::BandSpec;
    use std::f64::consts::FRAC_PI_2;

    fn seated_band(spec: &ProngSpec) -> BandMesh {
        let seating = BandSeating {
            windows: (0..spec.count)
                .map(|k| SeatWindow {
                    azimuth: f64::from(k) * FRAC_PI_2,
                    half_angle: 0.05,
                })
                .collect(),
            seat_depth: spec.thickness_base,
            rail_width: spec.base_width,
        };
        build_band_seated(&BandSpec::flat(8.5, 1.5), &TessellationConfig::default(), &seating)
            .unwrap()
    }

    #[test]
    fn individual_has_no_base() {
        let spec = ProngSpec::default();
        assert!(build_base(&seated_band(&spec), &spec).unwrap().is_none());
    }

    #[test]
    fn gallery_rail_is_a_closed_ring() {
        let spec = ProngSpec::default().with_base_style(BaseStyle::Gallery);
        let band = seated_band(&spec);
        let base = build_base(&band, &spec).unwrap().unwrap();
        let report = analyze(&base.mesh);
        assert!(report.is_single_solid(), "{report:?}");
        assert_eq!(report.genus, Some(1));
        assert!(base.mesh.signed_volume() > 0.0);
        assert_relative_eq!(base.mesh.bounds().max.z, 2.0, epsilon = 1e-12);
    }

    #[test]
    fn shared_bridges_pair_the_prongs() {
        let spec = ProngSpec::default().with_base_style(BaseStyle::Shared);
        let band = seated_band(&spec);
        let base = build_base(&band, &spec).unwrap().unwrap();
        let report = analyze(&base.mesh);
        assert!(report.is_closed_manifold(), "{report:?}");
        assert_eq!(report.components, 2);
        assert!(base.mesh.signed_volume() > 0.0);
    }

    #[test]
    fn seats_on_lifted_top() {
        for style in [BaseStyle::Shared, BaseStyle::Gallery] {
            let spec = ProngSpec::default().with_base_style(style);
            let band = seated_band(&spec);
            let base = build_base(&band, &spec).unwrap().unwrap();
            assert_eq!(base.seats.len(), 4);
            for seat in &base.seats {
                let patch = seat.patch(&base.mesh).unwrap();
                assert_eq!(patch.faces.len(), 4);
                assert!(patch.area_normal().z > 0.0);
                for p in &patch.points {
                    assert_relative_eq!(p.z, 2.0, epsilon = 1e-12);
                }
            }
        }
    }

    #[test]
    fn base_stitches_onto_band() {
        for style in [BaseStyle::Shared, BaseStyle::Gallery] {
            let spec = ProngSpec::default().with_base_style(style);
            let band = seated_band(&spec);
            let base = build_base(&band, &spec).unwrap().unwrap();
            let out = StitchKernel::default()
                .union(&[&band.mesh, &base.mesh])
                .unwrap();
            let report = analyze(&out.mesh);
            assert!(report.is_single_solid(), "{style:?}: {report:?}");
            assert_eq!(report.genus, Some(1));
        }
    }
}
