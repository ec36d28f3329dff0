//! Seat windows: the exact patches where a prong end joins a host mesh.
//!
//! A window reserves three azimuth stations (left edge, centre, right edge)
//! on a host. Between two rows of the host this gives a patch of two quad
//! cells bounded by six vertices. The prong copies those six positions as
//! its end section and caps itself with the host's patch triangles
//! reversed, so stitching can weld the vertices and cancel the patch.

use mesh_kernel::{normalize_angle, KernelError, TriMesh};
use nalgebra::Point3;

/// Stations closer than this (radians) are treated as one.
pub const MIN_STATION_GAP: f64 = 1e-6;

/// A corner this close (radians) to a window centre counts as centred.
const CORNER_TOLERANCE: f64 = 1e-9;

/// Angular window reserved around one prong azimuth.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeatWindow {
    pub azimuth: f64,
    pub half_angle: f64,
}

impl SeatWindow {
    /// Left edge, centre and right edge, normalized into `[0, 2π)`.
    pub fn stations(&self) -> [f64; 3] {
        [
            normalize_angle(self.azimuth - self.half_angle),
            normalize_angle(self.azimuth),
            normalize_angle(self.azimuth + self.half_angle),
        ]
    }

    /// Angular distance from the window centre to `phi`.
    fn offset(&self, phi: f64) -> f64 {
        let d = normalize_angle(phi - self.azimuth);
        d.min(std::f64::consts::TAU - d)
    }

    /// Whether `phi` falls inside the window widened by `margin`.
    fn covers(&self, phi: f64, margin: f64) -> bool {
        self.offset(phi) < self.half_angle + margin
    }

    /// First of `corners` the window covers without being centred on it.
    ///
    /// Merging drops such a corner, and the seat patch then cuts across it.
    pub fn straddled_corner(&self, corners: &[f64]) -> Option<f64> {
        corners
            .iter()
            .copied()
            .find(|&phi| self.covers(phi, MIN_STATION_GAP) && self.offset(phi) > CORNER_TOLERANCE)
    }
}

/// Station indices of one window within a merged station list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowStations {
    pub left: usize,
    pub center: usize,
    pub right: usize,
}

/// Merge base stations with seat windows.
///
/// Base stations inside a window are dropped so each window's three
/// stations end up consecutive (cyclically).
pub fn merge_stations(
    base: &[f64],
    windows: &[SeatWindow],
) -> Result<(Vec<f64>, Vec<WindowStations>), KernelError> {
    let mut stations: Vec<f64> = base
        .iter()
        .copied()
        .filter(|&phi| !windows.iter().any(|w| w.covers(phi, MIN_STATION_GAP)))
        .collect();
    for w in windows {
        stations.extend_from_slice(&w.stations());
    }
    stations.sort_by(f64::total_cmp);

    for index in 1..stations.len() {
        if stations[index] - stations[index - 1] < MIN_STATION_GAP {
            return Err(KernelError::UnorderedStations {
                index,
                value: stations[index],
            });
        }
    }

    let n = stations.len();
    let locate = |phi: f64| stations.iter().position(|&s| s == phi);
    let mut located = Vec::with_capacity(windows.len());
    for w in windows {
        let [l, c, r] = w.stations();
        match (locate(l), locate(c), locate(r)) {
            (Some(left), Some(center), Some(right))
                if (left + 1) % n == center && (center + 1) % n == right =>
            {
                located.push(WindowStations {
                    left,
                    center,
                    right,
                })
            }
            _ => {
                return Err(KernelError::UnorderedStations {
                    index: 0,
                    value: w.azimuth,
                })
            }
        }
    }
    Ok((stations, located))
}

/// A seat patch on a host mesh, by host vertex index.
///
/// `near` is the row facing the stone axis (band) or the lower girdle ring
/// (stone); `far` is the other row. Both run in order of increasing azimuth.
/// `faces` are the host triangles covering the patch, in host winding.
#[derive(Debug, Clone, PartialEq)]
pub struct SeatLoop {
    pub near: [u32; 3],
    pub far: [u32; 3],
    pub faces: Vec<[u32; 3]>,
}

impl SeatLoop {
    /// Copy the patch out of its host.
    pub fn patch(&self, host: &TriMesh) -> Result<SeatPatch, KernelError> {
        let order = [
            self.near[0],
            self.near[1],
            self.near[2],
            self.far[0],
            self.far[1],
            self.far[2],
        ];
        let mut points = [Point3::origin(); 6];
        for (slot, &v) in points.iter_mut().zip(order.iter()) {
            *slot = *host
                .positions
                .get(v as usize)
                .ok_or(KernelError::IndexOutOfRange {
                    index: v,
                    vertex_count: host.vertex_count(),
                })?;
        }
        let local = |v: u32| order.iter().position(|&o| o == v);
        let mut faces = Vec::with_capacity(self.faces.len());
        for f in &self.faces {
            match (local(f[0]), local(f[1]), local(f[2])) {
                (Some(a), Some(b), Some(c)) => faces.push([a, b, c]),
                _ => {
                    return Err(KernelError::IndexOutOfRange {
                        index: f[0],
                        vertex_count: host.vertex_count(),
                    })
                }
            }
        }
        Ok(SeatPatch { points, faces })
    }
}

/// Free-standing copy of a seat patch.
///
/// `points` holds near[0..3] then far[0..3]; `faces` index into `points`
/// and keep the host's outward winding.
#[derive(Debug, Clone, PartialEq)]
pub struct SeatPatch {
    pub points: [Point3<f64>; 6],
    pub faces: Vec<[usize; 3]>,
}

impl SeatPatch {
    /// Patch on a band-like top face: far row outside, normal up.
    pub fn band_top(near: [Point3<f64>; 3], far: [Point3<f64>; 3]) -> Self {
        Self {
            points: [near[0], near[1], near[2], far[0], far[1], far[2]],
            faces: vec![[3, 4, 1], [3, 1, 0], [4, 5, 2], [4, 2, 1]],
        }
    }

    /// Patch on a girdle wall: far row above, normal outward.
    pub fn girdle(near: [Point3<f64>; 3], far: [Point3<f64>; 3]) -> Self {
        Self {
            points: [near[0], near[1], near[2], far[0], far[1], far[2]],
            faces: vec![[0, 1, 4], [0, 4, 3], [1, 2, 5], [1, 5, 4]],
        }
    }

    /// Point indices walking the patch boundary: along `near`, back along `far`.
    pub const LOOP: [usize; 6] = [0, 1, 2, 5, 4, 3];

    /// Boundary points in loop order.
    pub fn loop_points(&self) -> Vec<Point3<f64>> {
        Self::LOOP.iter().map(|&i| self.points[i]).collect()
    }

    pub fn centroid(&self) -> Point3<f64> {
        let sum = self
            .points
            .iter()
            .fold(nalgebra::Vector3::zeros(), |acc, p| acc + p.coords);
        Point3::from(sum / 6.0)
    }

    /// Summed area vector of the patch faces (direction = host outward normal).
    pub fn area_normal(&self) -> nalgebra::Vector3<f64> {
        self.faces
            .iter()
            .map(|f| {
                let [a, b, c] = f.map(|i| self.points[i]);
                (b - a).cross(&(c - a)) * 0.5
            })
            .fold(nalgebra::Vector3::zeros(), |acc, n| acc + n)
    }
}
