use std::f64::consts::{FRAC_PI_2, PI};

use mesh_kernel::sweep::{revolve_profile, uniform_stations, RevolvedGrid};
use mesh_kernel::{Aabb, TriMesh};
use nalgebra::Point2;
use setting_types::{BandProfile, BandSpec, ParameterError};
use tracing::{debug, instrument};

use super::seat::{merge_stations, SeatLoop, SeatWindow, WindowStations};
use crate::config::TessellationConfig;
use crate::error::GenerationError;

/// Extents of a band derived from its spec alone.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BandMetrics {
    pub inner_radius: f64,
    pub outer_radius: f64,
    pub bottom_z: f64,
    /// Height of the band plane (the flat top face).
    pub top_z: f64,
    /// Radial span of the flat top face.
    pub top_inner: f64,
    pub top_outer: f64,
}

impl BandMetrics {
    pub fn of(spec: &BandSpec) -> Self {
        let inner = spec.inner_radius();
        let outer = spec.outer_radius;
        let (top_inner, top_outer) = match spec.profile {
            BandProfile::Flat | BandProfile::Tapered { .. } => (inner, outer),
            BandProfile::Domed { dome_height } => (inner, outer - dome_height),
            BandProfile::ComfortFit { corner_radius } => {
                (inner + corner_radius, outer - corner_radius)
            }
        };
        Self {
            inner_radius: inner,
            outer_radius: outer,
            bottom_z: -spec.width / 2.0,
            top_z: spec.width / 2.0,
            top_inner,
            top_outer,
        }
    }
}

/// Where prong feet (and an optional raised base) sit on the band top.
#[derive(Debug, Clone, PartialEq)]
pub struct BandSeating {
    pub windows: Vec<SeatWindow>,
    /// Radial depth of each seat, inward from the outer end of the top face.
    pub seat_depth: f64,
    /// Radial width of a raised base; equal to `seat_depth` when there is none.
    pub rail_width: f64,
}

/// Profile indices of the rows on the band top face, outermost first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TopRows {
    pub outer: usize,
    pub seat: usize,
    pub rail: usize,
}

/// A closed band mesh revolved around +Z.
#[derive(Debug, Clone)]
pub struct BandMesh {
    pub mesh: TriMesh,
    pub metrics: BandMetrics,
    pub profile: Vec<Point2<f64>>,
    pub stations: Vec<f64>,
    pub rows: TopRows,
    pub windows: Vec<WindowStations>,
    /// One seat per window, on the top face.
    pub seats: Vec<SeatLoop>,
    profile_len: usize,
}

impl BandMesh {
    pub fn bounds(&self) -> Aabb {
        self.mesh.bounds()
    }

    pub fn station_count(&self) -> usize {
        self.stations.len()
    }

    /// Vertex of profile point `i` at station `j`.
    pub fn vertex(&self, i: usize, j: usize) -> u32 {
        let n = self.stations.len();
        ((i % self.profile_len) * n + (j % n)) as u32
    }

    /// Triangle indices of the cell below profile edge `i → i+1`, stations `j → j+1`.
    pub fn cell_triangles(&self, i: usize, j: usize) -> [usize; 2] {
        let n = self.stations.len();
        let cell = (i % self.profile_len) * n + (j % n);
        [cell * 2, cell * 2 + 1]
    }

    /// Patch covering stations `left..=right` between top rows `outer` and `inner`.
    fn seat(&self, w: &WindowStations, inner: usize) -> SeatLoop {
        let row = |i: usize| {
            [
                self.vertex(i, w.left),
                self.vertex(i, w.center),
                self.vertex(i, w.right),
            ]
        };
        let faces = (self.rows.outer..inner)
            .flat_map(|i| [w.left, w.center].map(|j| self.cell_triangles(i, j)))
            .flatten()
            .map(|t| self.mesh.triangles[t])
            .collect();
        SeatLoop {
            near: row(inner),
            far: row(self.rows.outer),
            faces,
        }
    }
}

/// Closed (r, z) profile wound counter-clockwise, with `top_radii` inserted
/// on the top face. Returns the points and the index of the outer end of
/// the top face.
fn band_profile(
    spec: &BandSpec,
    metrics: &BandMetrics,
    tess: &TessellationConfig,
    top_radii: &[f64],
) -> (Vec<Point2<f64>>, usize) {
    let r_in = metrics.inner_radius;
    let r_out = metrics.outer_radius;
    let h = metrics.top_z;
    let mut pts = Vec::new();

    let arc = |pts: &mut Vec<Point2<f64>>, cx: f64, cz: f64, r: f64, from: f64, to: Point2<f64>| {
        let n = tess.corner_segments;
        for k in 1..n {
            let a = from + FRAC_PI_2 * k as f64 / n as f64;
            pts.push(Point2::new(cx + r * a.cos(), cz + r * a.sin()));
        }
        pts.push(to);
    };

    let outer_top = match spec.profile {
        BandProfile::Flat => {
            pts.push(Point2::new(r_in, -h));
            pts.push(Point2::new(r_out, -h));
            pts.push(Point2::new(r_out, h));
            pts.len() - 1
        }
        BandProfile::Tapered { taper_ratio } => {
            pts.push(Point2::new(r_in, -h));
            pts.push(Point2::new(r_in + spec.thickness * taper_ratio, -h));
            pts.push(Point2::new(r_out, h));
            pts.len() - 1
        }
        BandProfile::Domed { dome_height } => {
            let foot = r_out - dome_height;
            pts.push(Point2::new(r_in, -h));
            pts.push(Point2::new(foot, -h));
            let n = tess.dome_samples;
            for k in 1..=n {
                let t = k as f64 / (n + 1) as f64;
                let (w0, w1, w2) = ((1.0 - t).powi(2), 2.0 * t * (1.0 - t), t * t);
                pts.push(Point2::new(
                    w0 * foot + w1 * (r_out + dome_height) + w2 * foot,
                    w0 * -h + w2 * h,
                ));
            }
            pts.push(Point2::new(foot, h));
            pts.len() - 1
        }
        BandProfile::ComfortFit { corner_radius: c } => {
            pts.push(Point2::new(r_in, -h + c));
            arc(&mut pts, r_in + c, -h + c, c, PI, Point2::new(r_in + c, -h));
            pts.push(Point2::new(r_out - c, -h));
            arc(&mut pts, r_out - c, -h + c, c, -FRAC_PI_2, Point2::new(r_out, -h + c));
            pts.push(Point2::new(r_out, h - c));
            arc(&mut pts, r_out - c, h - c, c, 0.0, Point2::new(r_out - c, h));
            pts.len() - 1
        }
    };

    pts.extend(top_radii.iter().map(|&r| Point2::new(r, h)));

    match spec.profile {
        BandProfile::ComfortFit { corner_radius: c } => {
            pts.push(Point2::new(r_in + c, h));
            arc(&mut pts, r_in + c, h - c, c, FRAC_PI_2, Point2::new(r_in, h - c));
        }
        _ => pts.push(Point2::new(r_in, h)),
    }
    (pts, outer_top)
}

/// Build a plain band with no seat windows.
pub fn build_band(spec: &BandSpec, tess: &TessellationConfig) -> Result<BandMesh, GenerationError> {
    spec.validate()?;
    let metrics = BandMetrics::of(spec);
    build_band_inner(spec, tess, &metrics, &[], &[], false)
}

/// Build a band with a seat patch on the top face for every window.
#[instrument(skip_all, fields(windows = seating.windows.len()))]
pub fn build_band_seated(
    spec: &BandSpec,
    tess: &TessellationConfig,
    seating: &BandSeating,
) -> Result<BandMesh, GenerationError> {
    spec.validate()?;
    let metrics = BandMetrics::of(spec);
    let b = metrics.top_outer;
    let seat_r = b - seating.seat_depth;
    let rail_r = b - seating.rail_width.max(seating.seat_depth);
    if rail_r - metrics.top_inner < 1e-6 {
        let (field, value) = if seating.rail_width > seating.seat_depth {
            ("prong.base_width", seating.rail_width)
        } else {
            ("prong.thickness_base", seating.seat_depth)
        };
        return Err(ParameterError::new(
            field,
            value,
            format!(
                "does not fit on the band top face ({:.3} mm wide)",
                metrics.top_outer - metrics.top_inner
            ),
        )
        .into());
    }

    let mut radii = vec![seat_r];
    if seat_r - rail_r > 1e-9 {
        radii.push(rail_r);
    }
    build_band_inner(spec, tess, &metrics, &radii, &seating.windows, true)
}

fn build_band_inner(
    spec: &BandSpec,
    tess: &TessellationConfig,
    metrics: &BandMetrics,
    top_radii: &[f64],
    windows: &[SeatWindow],
    seated: bool,
) -> Result<BandMesh, GenerationError> {
    let (profile, outer) = band_profile(spec, metrics, tess, top_radii);
    let (stations, located) = merge_stations(&uniform_stations(tess.band_segments), windows)?;
    let RevolvedGrid {
        mesh, profile_len, ..
    } = revolve_profile(&profile, &stations)?;

    let rows = TopRows {
        outer,
        seat: outer + top_radii.len().min(1),
        rail: outer + top_radii.len(),
    };
    let mut band = BandMesh {
        mesh,
        metrics: *metrics,
        profile,
        stations,
        rows,
        windows: located,
        seats: Vec::new(),
        profile_len,
    };
    if seated {
        band.seats = band
            .windows
            .iter()
            .map(|w| band.seat(w, rows.seat))
            .collect();
    }

    debug!(
        profile = band.profile.len(),
        stations = band.stations.len(),
        triangles = band.mesh.triangle_count(),
        "band built"
    );
    Ok(band)
}
