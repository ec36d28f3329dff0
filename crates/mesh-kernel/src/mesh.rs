use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};

use crate::bounds::Aabb;
use crate::error::KernelError;

/// A named right-handed frame that output meshes are expressed in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoordinateFrame {
    pub name: String,
    pub origin: Point3<f64>,
    /// Vertical axis.
    pub up: Vector3<f64>,
    /// Horizontal reference axis (azimuth zero).
    pub reference: Vector3<f64>,
}

impl CoordinateFrame {
    /// Frame centred at the origin with +Z up and +X as azimuth zero.
    pub fn world(name: &str) -> Self {
        Self {
            name: name.to_string(),
            origin: Point3::origin(),
            up: Vector3::z(),
            reference: Vector3::x(),
        }
    }
}

/// Indexed triangle mesh with counter-clockwise (outward) winding.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TriMesh {
    pub positions: Vec<Point3<f64>>,
    pub triangles: Vec<[u32; 3]>,
}

impl TriMesh {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(vertices: usize, triangles: usize) -> Self {
        Self {
            positions: Vec::with_capacity(vertices),
            triangles: Vec::with_capacity(triangles),
        }
    }

    /// Add a vertex and return its index.
    pub fn add_vertex(&mut self, p: Point3<f64>) -> u32 {
        let idx = self.positions.len() as u32;
        self.positions.push(p);
        idx
    }

    pub fn add_triangle(&mut self, a: u32, b: u32, c: u32) {
        self.triangles.push([a, b, c]);
    }

    /// Add the quad `a b c d` as triangles `(a, b, c)` and `(a, c, d)`.
    pub fn add_quad(&mut self, a: u32, b: u32, c: u32, d: u32) {
        self.triangles.push([a, b, c]);
        self.triangles.push([a, c, d]);
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    /// Append another mesh, returning the index offset applied to its vertices.
    pub fn merge(&mut self, other: &TriMesh) -> u32 {
        let offset = self.positions.len() as u32;
        self.positions.extend_from_slice(&other.positions);
        self.triangles.extend(
            other
                .triangles
                .iter()
                .map(|t| [t[0] + offset, t[1] + offset, t[2] + offset]),
        );
        offset
    }

    /// Corner positions of triangle `i`.
    pub fn triangle(&self, i: usize) -> [Point3<f64>; 3] {
        let [a, b, c] = self.triangles[i];
        [
            self.positions[a as usize],
            self.positions[b as usize],
            self.positions[c as usize],
        ]
    }

    pub fn triangles_iter(&self) -> impl Iterator<Item = [Point3<f64>; 3]> + '_ {
        (0..self.triangles.len()).map(move |i| self.triangle(i))
    }

    /// Unnormalized face normal of triangle `i` (length = 2 × area).
    pub fn face_normal(&self, i: usize) -> Vector3<f64> {
        let [a, b, c] = self.triangle(i);
        (b - a).cross(&(c - a))
    }

    pub fn translate(&mut self, offset: &Vector3<f64>) {
        for p in &mut self.positions {
            *p += offset;
        }
    }

    pub fn translated(mut self, offset: &Vector3<f64>) -> Self {
        self.translate(offset);
        self
    }

    /// Reverse the winding of every triangle.
    pub fn flip(&mut self) {
        for t in &mut self.triangles {
            t.swap(1, 2);
        }
    }

    pub fn bounds(&self) -> Aabb {
        Aabb::from_points(&self.positions)
    }

    /// Signed enclosed volume via the divergence theorem.
    ///
    /// Positive for a closed mesh with outward-facing triangles.
    pub fn signed_volume(&self) -> f64 {
        self.triangles_iter()
            .map(|[a, b, c]| a.coords.dot(&b.coords.cross(&c.coords)))
            .sum::<f64>()
            / 6.0
    }

    pub fn surface_area(&self) -> f64 {
        (0..self.triangles.len())
            .map(|i| self.face_normal(i).norm() * 0.5)
            .sum()
    }

    /// Check that every triangle references an existing vertex.
    pub fn validate_indices(&self) -> Result<(), KernelError> {
        let vertex_count = self.positions.len();
        for t in &self.triangles {
            for &index in t {
                if index as usize >= vertex_count {
                    return Err(KernelError::IndexOutOfRange {
                        index,
                        vertex_count,
                    });
                }
            }
        }
        Ok(())
    }

    /// Flattened `f32` positions, three per vertex.
    pub fn positions_f32(&self) -> Vec<f32> {
        self.positions
            .iter()
            .flat_map(|p| [p.x as f32, p.y as f32, p.z as f32])
            .collect()
    }

    /// Flattened triangle indices, three per triangle.
    pub fn indices_flat(&self) -> Vec<u32> {
        self.triangles.iter().flatten().copied().collect()
    }
}

/// Axis-aligned unit cube `[0,1]³` with outward winding.
pub fn unit_cube() -> TriMesh {
    let mut mesh = TriMesh::with_capacity(8, 12);
    for &(x, y, z) in &[
        (0.0, 0.0, 0.0),
        (1.0, 0.0, 0.0),
        (1.0, 1.0, 0.0),
        (0.0, 1.0, 0.0),
        (0.0, 0.0, 1.0),
        (1.0, 0.0, 1.0),
        (1.0, 1.0, 1.0),
        (0.0, 1.0, 1.0),
    ] {
        mesh.add_vertex(Point3::new(x, y, z));
    }
    mesh.add_quad(0, 3, 2, 1); // bottom
    mesh.add_quad(4, 5, 6, 7); // top
    mesh.add_quad(0, 1, 5, 4); // front
    mesh.add_quad(2, 3, 7, 6); // back
    mesh.add_quad(0, 4, 7, 3); // left
    mesh.add_quad(1, 2, 6, 5); // right
    mesh
}
