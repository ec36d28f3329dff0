//! Edge-incidence analysis for closure and manifold checks.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::mesh::TriMesh;

/// Counts describing how well a mesh bounds a solid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopologyReport {
    /// Vertices referenced by at least one triangle.
    pub vertex_count: usize,
    pub edge_count: usize,
    pub face_count: usize,
    /// Edges used by exactly one triangle.
    pub boundary_edges: usize,
    /// Edges used by more than two triangles.
    pub non_manifold_edges: usize,
    /// Edges whose two triangles traverse them in the same direction.
    pub inconsistent_edges: usize,
    /// Triangles with a repeated vertex index.
    pub degenerate_triangles: usize,
    /// Connected components over shared vertices.
    pub components: usize,
    pub euler_characteristic: i64,
    /// Genus of a single closed orientable surface, when that is what the mesh is.
    pub genus: Option<i64>,
}

impl TopologyReport {
    /// Every edge is shared by exactly two consistently oriented triangles.
    pub fn is_closed_manifold(&self) -> bool {
        self.boundary_edges == 0
            && self.non_manifold_edges == 0
            && self.inconsistent_edges == 0
            && self.degenerate_triangles == 0
            && self.face_count > 0
    }

    /// Closed manifold with one component and a valid genus.
    pub fn is_single_solid(&self) -> bool {
        self.is_closed_manifold() && self.components == 1 && self.genus.is_some()
    }
}

struct EdgeUse {
    forward: u32,
    backward: u32,
}

/// Union-find over vertex indices.
struct DisjointSet {
    parent: Vec<usize>,
}

impl DisjointSet {
    fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
        }
    }

    fn find(&mut self, mut x: usize) -> usize {
        while self.parent[x] != x {
            self.parent[x] = self.parent[self.parent[x]];
            x = self.parent[x];
        }
        x
    }

    fn union(&mut self, a: usize, b: usize) {
        let ra = self.find(a);
        let rb = self.find(b);
        if ra != rb {
            self.parent[ra] = rb;
        }
    }
}

/// Analyze edge incidence, orientation and connectivity of a mesh.
#[instrument(skip(mesh), fields(triangles = mesh.triangle_count()))]
pub fn analyze(mesh: &TriMesh) -> TopologyReport {
    let mut edges: HashMap<(u32, u32), EdgeUse> = HashMap::new();
    let mut referenced = vec![false; mesh.vertex_count()];
    let mut sets = DisjointSet::new(mesh.vertex_count());
    let mut degenerate_triangles = 0;

    for t in &mesh.triangles {
        if t[0] == t[1] || t[1] == t[2] || t[2] == t[0] {
            degenerate_triangles += 1;
        }
        for k in 0..3 {
            let a = t[k];
            let b = t[(k + 1) % 3];
            referenced[a as usize] = true;
            sets.union(a as usize, b as usize);
            let key = (a.min(b), a.max(b));
            let entry = edges.entry(key).or_insert(EdgeUse {
                forward: 0,
                backward: 0,
            });
            if a < b {
                entry.forward += 1;
            } else {
                entry.backward += 1;
            }
        }
    }

    let mut boundary_edges = 0;
    let mut non_manifold_edges = 0;
    let mut inconsistent_edges = 0;
    for e in edges.values() {
        match e.forward + e.backward {
            1 => boundary_edges += 1,
            2 => {
                if e.forward != 1 {
                    inconsistent_edges += 1;
                }
            }
            _ => non_manifold_edges += 1,
        }
    }

    let vertex_count = referenced.iter().filter(|&&r| r).count();
    let mut roots: Vec<usize> = (0..mesh.vertex_count())
        .filter(|&v| referenced[v])
        .map(|v| sets.find(v))
        .collect();
    roots.sort_unstable();
    roots.dedup();
    let components = roots.len();

    let edge_count = edges.len();
    let face_count = mesh.triangle_count();
    let euler_characteristic = vertex_count as i64 - edge_count as i64 + face_count as i64;

    let closed = boundary_edges == 0 && non_manifold_edges == 0 && inconsistent_edges == 0;
    let genus = if closed
        && components == 1
        && euler_characteristic <= 2
        && euler_characteristic % 2 == 0
    {
        Some((2 - euler_characteristic) / 2)
    } else {
        None
    };

    debug!(
        vertex_count,
        edge_count, face_count, boundary_edges, non_manifold_edges, components, "topology analyzed"
    );

    TopologyReport {
        vertex_count,
        edge_count,
        face_count,
        boundary_edges,
        non_manifold_edges,
        inconsistent_edges,
        degenerate_triangles,
        components,
        euler_characteristic,
        genus,
    }
}
