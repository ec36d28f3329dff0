//! Vertex welding and contact-face cancellation.
//!
//! These are the building blocks of stitching closed meshes that were
//! built to share exact contact patches: weld the shared vertices, then
//! drop each pair of coincident triangles facing opposite ways.

use std::collections::HashMap;

use nalgebra::Point3;

use crate::mesh::TriMesh;

type GridKey = (i64, i64, i64);

fn grid_key(p: &Point3<f64>, resolution: f64) -> GridKey {
    (
        (p.x / resolution).round() as i64,
        (p.y / resolution).round() as i64,
        (p.z / resolution).round() as i64,
    )
}

/// Merge vertices falling in the same cell of a grid with spacing
/// `resolution`. The first vertex in each cell is kept. Returns the number
/// of vertices removed.
pub fn weld_vertices(mesh: &mut TriMesh, resolution: f64) -> usize {
    let mut cells: HashMap<GridKey, u32> = HashMap::with_capacity(mesh.vertex_count());
    let mut remap = Vec::with_capacity(mesh.vertex_count());
    let mut positions = Vec::with_capacity(mesh.vertex_count());

    for p in &mesh.positions {
        let next = positions.len() as u32;
        let idx = *cells.entry(grid_key(p, resolution)).or_insert_with(|| {
            positions.push(*p);
            next
        });
        remap.push(idx);
    }

    let removed = mesh.positions.len() - positions.len();
    for t in &mut mesh.triangles {
        for v in t.iter_mut() {
            *v = remap[*v as usize];
        }
    }
    mesh.positions = positions;
    removed
}

/// Rotate a triangle so its smallest index comes first, keeping winding.
fn canonical(t: &[u32; 3]) -> [u32; 3] {
    let m = if t[0] <= t[1] && t[0] <= t[2] {
        0
    } else if t[1] <= t[2] {
        1
    } else {
        2
    };
    [t[m], t[(m + 1) % 3], t[(m + 2) % 3]]
}

/// Remove pairs of triangles over the same three vertices with opposite
/// winding. `labels` runs parallel to the triangle list and is filtered the
/// same way. Returns the number of triangles removed.
pub fn cancel_opposing_faces(mesh: &mut TriMesh, labels: &mut Vec<u32>) -> usize {
    debug_assert_eq!(labels.len(), mesh.triangles.len());

    // Unmatched triangles keyed by their canonical form.
    let mut open: HashMap<[u32; 3], Vec<usize>> = HashMap::new();
    let mut removed = vec![false; mesh.triangles.len()];

    for (i, t) in mesh.triangles.iter().enumerate() {
        let c = canonical(t);
        let opposite = [c[0], c[2], c[1]];
        if let Some(partners) = open.get_mut(&opposite) {
            if let Some(j) = partners.pop() {
                removed[i] = true;
                removed[j] = true;
                continue;
            }
        }
        open.entry(c).or_default().push(i);
    }

    let before = mesh.triangles.len();
    let mut keep = removed.iter().map(|r| !r);
    mesh.triangles.retain(|_| keep.next().unwrap_or(true));
    let mut keep = removed.iter().map(|r| !r);
    labels.retain(|_| keep.next().unwrap_or(true));
    before - mesh.triangles.len()
}

/// Drop vertices no triangle references. Returns the number dropped.
pub fn remove_unreferenced(mesh: &mut TriMesh) -> usize {
    let mut used = vec![false; mesh.vertex_count()];
    for t in &mesh.triangles {
        for &v in t {
            used[v as usize] = true;
        }
    }
    let mut remap = vec![u32::MAX; mesh.vertex_count()];
    let mut positions = Vec::with_capacity(mesh.vertex_count());
    for (i, p) in mesh.positions.iter().enumerate() {
        if used[i] {
            remap[i] = positions.len() as u32;
            positions.push(*p);
        }
    }
    let dropped = mesh.positions.len() - positions.len();
    for t in &mut mesh.triangles {
        for v in t.iter_mut() {
            *v = remap[*v as usize];
        }
    }
    mesh.positions = positions;
    dropped
}
