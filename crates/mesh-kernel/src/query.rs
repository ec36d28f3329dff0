//! Point-to-mesh distance and inside/outside queries.

use nalgebra::{Point3, Vector3};

use crate::bounds::Aabb;
use crate::mesh::TriMesh;

/// Closest point on triangle `abc` to `p` (Voronoi-region method).
#[allow(clippy::many_single_char_names)]
pub fn closest_point_on_triangle(
    p: &Point3<f64>,
    a: &Point3<f64>,
    b: &Point3<f64>,
    c: &Point3<f64>,
) -> Point3<f64> {
    let ab = b - a;
    let ac = c - a;
    let ap = p - a;

    let d1 = ab.dot(&ap);
    let d2 = ac.dot(&ap);
    if d1 <= 0.0 && d2 <= 0.0 {
        return *a;
    }

    let bp = p - b;
    let d3 = ab.dot(&bp);
    let d4 = ac.dot(&bp);
    if d3 >= 0.0 && d4 <= d3 {
        return *b;
    }

    let vc = d1 * d4 - d3 * d2;
    if vc <= 0.0 && d1 >= 0.0 && d3 <= 0.0 {
        let v = d1 / (d1 - d3);
        return a + ab * v;
    }

    let cp = p - c;
    let d5 = ab.dot(&cp);
    let d6 = ac.dot(&cp);
    if d6 >= 0.0 && d5 <= d6 {
        return *c;
    }

    let vb = d5 * d2 - d1 * d6;
    if vb <= 0.0 && d2 >= 0.0 && d6 <= 0.0 {
        let w = d2 / (d2 - d6);
        return a + ac * w;
    }

    let va = d3 * d6 - d5 * d4;
    if va <= 0.0 && (d4 - d3) >= 0.0 && (d5 - d6) >= 0.0 {
        let w = (d4 - d3) / ((d4 - d3) + (d5 - d6));
        return b + (c - b) * w;
    }

    let denom = 1.0 / (va + vb + vc);
    let v = vb * denom;
    let w = vc * denom;
    a + ab * v + ac * w
}

/// Unsigned distance from `p` to the nearest triangle of `mesh`.
///
/// Returns `f64::INFINITY` for an empty mesh.
pub fn distance_to_mesh(mesh: &TriMesh, p: &Point3<f64>) -> f64 {
    let mut best_sq = f64::INFINITY;
    for [a, b, c] in mesh.triangles_iter() {
        let q = closest_point_on_triangle(p, &a, &b, &c);
        let d = (q - p).norm_squared();
        if d < best_sq {
            best_sq = d;
        }
    }
    best_sq.sqrt()
}

/// Ray direction chosen to avoid grazing axis-aligned and revolved features.
fn ray_direction() -> Vector3<f64> {
    Vector3::new(0.5773, 0.5774, 0.5771).normalize()
}

/// Möller–Trumbore ray/triangle intersection; returns the ray parameter.
fn ray_hits_triangle(
    origin: &Point3<f64>,
    dir: &Vector3<f64>,
    a: &Point3<f64>,
    b: &Point3<f64>,
    c: &Point3<f64>,
) -> Option<f64> {
    let e1 = b - a;
    let e2 = c - a;
    let h = dir.cross(&e2);
    let det = e1.dot(&h);
    if det.abs() < 1e-14 {
        return None;
    }
    let inv = 1.0 / det;
    let s = origin - a;
    let u = inv * s.dot(&h);
    if !(0.0..=1.0).contains(&u) {
        return None;
    }
    let q = s.cross(&e1);
    let v = inv * dir.dot(&q);
    if v < 0.0 || u + v > 1.0 {
        return None;
    }
    let t = inv * e2.dot(&q);
    (t > 1e-12).then_some(t)
}

/// Whether `p` lies inside the closed mesh, by ray-crossing parity.
pub fn contains_point(mesh: &TriMesh, bounds: &Aabb, p: &Point3<f64>) -> bool {
    if !bounds.contains(p) {
        return false;
    }
    let dir = ray_direction();
    let crossings = mesh
        .triangles_iter()
        .filter(|[a, b, c]| ray_hits_triangle(p, &dir, a, b, c).is_some())
        .count();
    crossings % 2 == 1
}

/// Distance from `p` to the surface of a closed mesh, negated when `p` is inside.
pub fn signed_distance(mesh: &TriMesh, bounds: &Aabb, p: &Point3<f64>) -> f64 {
    let d = distance_to_mesh(mesh, p);
    if contains_point(mesh, bounds, p) {
        -d
    } else {
        d
    }
}
