use mesh_kernel::sweep::stack_rings;
use mesh_kernel::{Aabb, TriMesh};
use nalgebra::{Point3, Vector3};
use setting_types::{ParameterError, StoneSpec};
use tracing::{debug, instrument};

use super::seat::{merge_stations, SeatLoop, SeatWindow};
use super::silhouette::Silhouette;
use crate::error::GenerationError;

/// Heights of the cut, measured from the girdle centre.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StoneProfile {
    pub girdle: f64,
    pub crown: f64,
    pub pavilion: f64,
}

impl StoneProfile {
    pub fn of(spec: &StoneSpec) -> Self {
        let girdle = spec.girdle_height();
        let rest = spec.depth - girdle;
        let crown = spec.shape.proportions().crown * rest;
        Self {
            girdle,
            crown,
            pavilion: rest - crown,
        }
    }

    /// Table height above the girdle centre.
    pub fn top(&self) -> f64 {
        self.girdle / 2.0 + self.crown
    }

    /// Culet depth below the girdle centre (negative).
    pub fn bottom(&self) -> f64 {
        -self.girdle / 2.0 - self.pavilion
    }
}

/// A closed stone mesh with the girdle centre at its local origin.
#[derive(Debug, Clone)]
pub struct StoneMesh {
    pub mesh: TriMesh,
    pub silhouette: Silhouette,
    pub profile: StoneProfile,
    /// One seat per requested window, on the girdle.
    pub seats: Vec<SeatLoop>,
}

impl StoneMesh {
    pub fn bounds(&self) -> Aabb {
        self.mesh.bounds()
    }

    /// Move the stone, keeping seat indices valid.
    pub fn translate(&mut self, offset: &Vector3<f64>) {
        self.mesh.translate(offset);
    }
}

/// Build a stone with no seat windows.
pub fn build_stone(spec: &StoneSpec, segments: usize) -> Result<StoneMesh, GenerationError> {
    build_stone_seated(spec, segments, &[])
}

/// Build a stone whose girdle carries a seat patch in every window.
#[instrument(skip(spec, windows), fields(shape = ?spec.shape, windows = windows.len()))]
pub fn build_stone_seated(
    spec: &StoneSpec,
    segments: usize,
    windows: &[SeatWindow],
) -> Result<StoneMesh, GenerationError> {
    spec.validate()?;
    let silhouette = Silhouette::from_spec(spec);
    let profile = StoneProfile::of(spec);
    if profile.girdle <= 0.0 || profile.pavilion <= 0.0 {
        return Err(ParameterError::new(
            "stone.depth",
            spec.depth,
            "too shallow for a girdle, crown and pavilion",
        )
        .into());
    }

    let corners = silhouette.corner_azimuths();
    for w in windows {
        if let Some(corner) = w.straddled_corner(&corners) {
            return Err(ParameterError::new(
                "prong.count",
                windows.len() as f64,
                format!(
                    "prong at {:.2} deg straddles the stone corner at {:.2} deg",
                    w.azimuth.to_degrees(),
                    corner.to_degrees()
                ),
            )
            .into());
        }
    }
    let (stations, located) = merge_stations(&silhouette.base_stations(segments), windows)?;
    let outline: Vec<_> = stations.iter().map(|&phi| silhouette.point_at(phi)).collect();
    let ring = |scale: f64, z: f64| -> Vec<Point3<f64>> {
        outline
            .iter()
            .map(|p| Point3::new(p.x * scale, p.y * scale, z))
            .collect()
    };

    let cut = spec.shape.proportions();
    let half_girdle = profile.girdle / 2.0;
    let mut rings = Vec::with_capacity(6);
    if let Some(scale) = cut.pavilion_ring {
        rings.push(ring(scale, -half_girdle - profile.pavilion / 2.0));
    }
    let girdle_bottom = rings.len();
    rings.push(ring(1.0, -half_girdle));
    rings.push(ring(1.0, half_girdle));
    if let Some(scale) = cut.crown_break {
        rings.push(ring(scale, half_girdle + profile.crown / 2.0));
    }
    rings.push(ring(cut.table, profile.top()));

    let stack = stack_rings(
        &rings,
        Point3::new(0.0, 0.0, profile.bottom()),
        Point3::new(0.0, 0.0, profile.top()),
    )?;

    let seats = located
        .iter()
        .map(|w| {
            let row = |k: usize| {
                [
                    stack.vertex(k, w.left),
                    stack.vertex(k, w.center),
                    stack.vertex(k, w.right),
                ]
            };
            let faces = [w.left, w.center]
                .iter()
                .flat_map(|&j| stack.cell_triangles(girdle_bottom, j))
                .map(|t| stack.mesh.triangles[t])
                .collect();
            SeatLoop {
                near: row(girdle_bottom),
                far: row(girdle_bottom + 1),
                faces,
            }
        })
        .collect();

    debug!(
        stations = stations.len(),
        rings = rings.len(),
        triangles = stack.mesh.triangle_count(),
        "stone built"
    );
    Ok(StoneMesh {
        mesh: stack.mesh,
        silhouette,
        profile,
        seats,
    })
}
