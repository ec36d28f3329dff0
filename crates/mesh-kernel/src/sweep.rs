//! Structured mesh builders: full revolutions, stacked rings and lofts.
//!
//! All builders emit quads as two triangles split along the same diagonal,
//! and expose lookups from (row, station) to vertex and triangle indices so
//! callers can locate specific cells after construction.

use nalgebra::{Point2, Point3};
use tracing::debug;

use crate::error::KernelError;
use crate::mesh::TriMesh;

/// Check that azimuth stations increase strictly within `[0, 2π)`.
pub fn validate_stations(stations: &[f64]) -> Result<(), KernelError> {
    if stations.len() < 3 {
        return Err(KernelError::InsufficientStations {
            required: 3,
            provided: stations.len(),
        });
    }
    for (index, &value) in stations.iter().enumerate() {
        let ordered = index == 0 || value > stations[index - 1];
        if !(0.0..std::f64::consts::TAU).contains(&value) || !ordered {
            return Err(KernelError::UnorderedStations { index, value });
        }
    }
    Ok(())
}

/// Signed area of a closed 2D polygon (positive when counter-clockwise).
pub fn polygon_area(profile: &[Point2<f64>]) -> f64 {
    let n = profile.len();
    (0..n)
        .map(|i| {
            let a = profile[i];
            let b = profile[(i + 1) % n];
            a.x * b.y - b.x * a.y
        })
        .sum::<f64>()
        * 0.5
}

/// Point at radius `r`, azimuth `phi`, height `z`.
pub fn polar_point(r: f64, phi: f64, z: f64) -> Point3<f64> {
    let (s, c) = phi.sin_cos();
    Point3::new(r * c, r * s, z)
}

/// Closed surface of revolution around +Z.
///
/// Vertex `(i, j)` is profile point `i` at station `j`.
#[derive(Debug, Clone)]
pub struct RevolvedGrid {
    pub mesh: TriMesh,
    pub profile_len: usize,
    pub station_count: usize,
}

impl RevolvedGrid {
    pub fn vertex(&self, i: usize, j: usize) -> u32 {
        ((i % self.profile_len) * self.station_count + (j % self.station_count)) as u32
    }

    /// The two triangle indices of the cell spanning profile edge `i → i+1`
    /// and stations `j → j+1`.
    pub fn cell_triangles(&self, i: usize, j: usize) -> [usize; 2] {
        let cell = (i % self.profile_len) * self.station_count + (j % self.station_count);
        [cell * 2, cell * 2 + 1]
    }
}

/// Revolve a closed profile in the (r, z) half-plane a full turn around +Z.
///
/// The profile must be wound counter-clockwise with `r > 0` everywhere; the
/// resulting mesh is then closed with outward-facing triangles.
pub fn revolve_profile(
    profile: &[Point2<f64>],
    stations: &[f64],
) -> Result<RevolvedGrid, KernelError> {
    if profile.len() < 3 {
        return Err(KernelError::InsufficientProfile {
            required: 3,
            provided: profile.len(),
        });
    }
    validate_stations(stations)?;
    if let Some(p) = profile.iter().find(|p| p.x <= 0.0) {
        return Err(KernelError::InvalidDimension {
            parameter: "profile radius",
            value: p.x,
        });
    }
    let area = polygon_area(profile);
    if area <= 0.0 {
        return Err(KernelError::ProfileOrientation { area });
    }

    let m = profile.len();
    let n = stations.len();
    let mut mesh = TriMesh::with_capacity(m * n, 2 * m * n);
    let trig: Vec<(f64, f64)> = stations.iter().map(|phi| phi.sin_cos()).collect();
    for p in profile {
        for &(s, c) in &trig {
            mesh.add_vertex(Point3::new(p.x * c, p.x * s, p.y));
        }
    }

    let grid_index = |i: usize, j: usize| ((i % m) * n + (j % n)) as u32;
    for i in 0..m {
        for j in 0..n {
            mesh.add_quad(
                grid_index(i, j),
                grid_index(i, j + 1),
                grid_index(i + 1, j + 1),
                grid_index(i + 1, j),
            );
        }
    }

    debug!(
        profile = m,
        stations = n,
        triangles = mesh.triangle_count(),
        "revolved profile"
    );
    Ok(RevolvedGrid {
        mesh,
        profile_len: m,
        station_count: n,
    })
}

/// Rings of equal station count stacked bottom to top, closed by apex fans.
///
/// Vertex `(k, j)` is station `j` of ring `k`.
#[derive(Debug, Clone)]
pub struct RingStack {
    pub mesh: TriMesh,
    pub ring_count: usize,
    pub station_count: usize,
    pub bottom_apex: u32,
    pub top_apex: u32,
}

impl RingStack {
    pub fn vertex(&self, k: usize, j: usize) -> u32 {
        (k * self.station_count + (j % self.station_count)) as u32
    }

    /// The two triangle indices of the wall cell between rings `k` and
    /// `k + 1`, stations `j → j+1`.
    pub fn cell_triangles(&self, k: usize, j: usize) -> [usize; 2] {
        let cell = k * self.station_count + (j % self.station_count);
        [cell * 2, cell * 2 + 1]
    }
}

/// Stack rings into a closed solid.
///
/// Each ring lists its points in order of increasing azimuth around +Z.
/// Rings go from bottom to top; `bottom` and `top` close the ends.
pub fn stack_rings(
    rings: &[Vec<Point3<f64>>],
    bottom: Point3<f64>,
    top: Point3<f64>,
) -> Result<RingStack, KernelError> {
    let Some(first) = rings.first() else {
        return Err(KernelError::InsufficientProfile {
            required: 1,
            provided: 0,
        });
    };
    let n = first.len();
    if n < 3 {
        return Err(KernelError::InsufficientStations {
            required: 3,
            provided: n,
        });
    }
    for (index, ring) in rings.iter().enumerate() {
        if ring.len() != n {
            return Err(KernelError::SectionMismatch {
                index,
                expected: n,
                found: ring.len(),
            });
        }
    }

    let count = rings.len();
    let mut mesh = TriMesh::with_capacity(count * n + 2, 2 * count * n);
    for ring in rings {
        for p in ring {
            mesh.add_vertex(*p);
        }
    }
    let bottom_apex = mesh.add_vertex(bottom);
    let top_apex = mesh.add_vertex(top);

    let v = |k: usize, j: usize| (k * n + (j % n)) as u32;
    for k in 0..count - 1 {
        for j in 0..n {
            mesh.add_quad(v(k, j), v(k, j + 1), v(k + 1, j + 1), v(k + 1, j));
        }
    }
    for j in 0..n {
        mesh.add_triangle(bottom_apex, v(0, j + 1), v(0, j));
        mesh.add_triangle(top_apex, v(count - 1, j), v(count - 1, j + 1));
    }

    Ok(RingStack {
        mesh,
        ring_count: count,
        station_count: n,
        bottom_apex,
        top_apex,
    })
}

/// Side walls of a loft through closed sections of equal length.
///
/// Vertex `(i, k)` is point `k` of section `i`, at index `i * len + k`.
/// Sections wound counter-clockwise when viewed along the sweep direction
/// give outward-facing walls. The ends are left open for the caller to cap.
pub fn loft_sections(sections: &[Vec<Point3<f64>>]) -> Result<TriMesh, KernelError> {
    if sections.len() < 2 {
        return Err(KernelError::InsufficientProfile {
            required: 2,
            provided: sections.len(),
        });
    }
    let m = sections[0].len();
    if m < 3 {
        return Err(KernelError::InsufficientProfile {
            required: 3,
            provided: m,
        });
    }
    for (index, s) in sections.iter().enumerate() {
        if s.len() != m {
            return Err(KernelError::SectionMismatch {
                index,
                expected: m,
                found: s.len(),
            });
        }
    }

    let mut mesh = TriMesh::with_capacity(sections.len() * m, 2 * (sections.len() - 1) * m);
    for s in sections {
        for p in s {
            mesh.add_vertex(*p);
        }
    }
    let v = |i: usize, k: usize| (i * m + (k % m)) as u32;
    for i in 0..sections.len() - 1 {
        for k in 0..m {
            mesh.add_quad(v(i, k), v(i + 1, k), v(i + 1, k + 1), v(i, k + 1));
        }
    }
    Ok(mesh)
}

/// `n` evenly spaced stations starting at azimuth zero.
pub fn uniform_stations(n: usize) -> Vec<f64> {
    (0..n)
        .map(|j| std::f64::consts::TAU * j as f64 / n as f64)
        .collect()
}
