//! Minimum-gap checks between parts that must not touch.

use std::fmt;

use mesh_kernel::query::signed_distance;
use mesh_kernel::{Aabb, TriMesh};
use nalgebra::Point3;
use serde::{Deserialize, Serialize};
use setting_types::ParameterError;
use tracing::{debug, instrument};

use crate::prong::ProngMesh;

/// Whether clearance failures stop generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClearanceMode {
    #[default]
    Enforce,
    /// Measure nothing; for callers that accept colliding parts.
    Skip,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClearancePolicy {
    /// Smallest allowed separation in millimetres.
    pub min_gap: f64,
    pub mode: ClearanceMode,
}

impl Default for ClearancePolicy {
    fn default() -> Self {
        Self {
            min_gap: 0.01,
            mode: ClearanceMode::Enforce,
        }
    }
}

impl ClearancePolicy {
    pub fn skip() -> Self {
        Self {
            mode: ClearanceMode::Skip,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), ParameterError> {
        if !(self.min_gap.is_finite() && self.min_gap >= 0.0) {
            return Err(ParameterError::new(
                "clearance.min_gap",
                self.min_gap,
                "must be a non-negative finite length",
            ));
        }
        Ok(())
    }
}

/// Two parts whose separation is checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClearancePair {
    StoneBand,
    /// Neighbouring prongs.
    ProngProng { a: u32, b: u32 },
    /// A prong against the stone, away from its tip stub.
    ProngStone { prong: u32 },
    BaseStone,
}

impl fmt::Display for ClearancePair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClearancePair::StoneBand => write!(f, "stone and band"),
            ClearancePair::ProngProng { a, b } => write!(f, "prongs {a} and {b}"),
            ClearancePair::ProngStone { prong } => write!(f, "prong {prong} and stone"),
            ClearancePair::BaseStone => write!(f, "base and stone"),
        }
    }
}

/// Measured separation of one pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PairClearance {
    pub pair: ClearancePair,
    /// Bounding-box gap, or the refined mesh distance when `refined`.
    pub distance: f64,
    pub refined: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClearanceReport {
    pub pairs: Vec<PairClearance>,
    pub skipped: bool,
}

impl ClearanceReport {
    pub fn min_distance(&self) -> Option<f64> {
        self.pairs.iter().map(|p| p.distance).min_by(f64::total_cmp)
    }

    pub fn get(&self, pair: ClearancePair) -> Option<&PairClearance> {
        self.pairs.iter().find(|p| p.pair == pair)
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{pair} are {distance:.4} mm apart, minimum is {min_gap} mm")]
pub struct ClearanceViolation {
    pub pair: ClearancePair,
    pub distance: f64,
    pub min_gap: f64,
}

/// The positioned parts of one setting.
#[derive(Debug, Clone, Copy)]
pub struct ClearanceScene<'a> {
    pub stone: &'a TriMesh,
    pub band: &'a TriMesh,
    pub base: Option<&'a TriMesh>,
    pub prongs: &'a [ProngMesh],
}

/// A mesh with its bounds, and the vertices that stand in for it.
struct Sampled<'a> {
    mesh: &'a TriMesh,
    bounds: Aabb,
    samples: &'a [Point3<f64>],
}

impl<'a> Sampled<'a> {
    fn whole(mesh: &'a TriMesh) -> Self {
        Self::with_samples(mesh, &mesh.positions)
    }

    fn with_samples(mesh: &'a TriMesh, samples: &'a [Point3<f64>]) -> Self {
        Self {
            mesh,
            bounds: mesh.bounds(),
            samples,
        }
    }

    /// Smallest signed distance from `self`'s samples to `other`'s surface.
    fn distance_to(&self, other: &Sampled<'_>, best: f64) -> f64 {
        let mut best = best;
        for p in self.samples {
            if other.bounds.distance_to_point(p) >= best {
                continue;
            }
            best = best.min(signed_distance(other.mesh, &other.bounds, p));
        }
        best
    }
}

fn measure(
    pair: ClearancePair,
    a: &Sampled<'_>,
    b: &Sampled<'_>,
    both_ways: bool,
    min_gap: f64,
) -> PairClearance {
    let gap = a.bounds.distance_to(&b.bounds);
    if gap >= min_gap {
        return PairClearance {
            pair,
            distance: gap,
            refined: false,
        };
    }
    let mut distance = a.distance_to(b, f64::INFINITY);
    if both_ways {
        distance = b.distance_to(a, distance);
    }
    PairClearance {
        pair,
        distance,
        refined: true,
    }
}

/// Check every pair of the scene against the policy.
///
/// Pairs are measured by bounding-box gap first; only pairs closer than
/// `min_gap` are refined with vertex-to-surface distances.
///
/// A prong and the stone are measured both ways. Shaft vertices stand in
/// for the prong, and stone vertices inside the tip stub's box are left
/// out since the stub holds the stone there.
#[instrument(skip_all, fields(prongs = scene.prongs.len(), min_gap = policy.min_gap))]
pub fn check(
    scene: &ClearanceScene<'_>,
    policy: &ClearancePolicy,
) -> Result<ClearanceReport, ClearanceViolation> {
    if policy.mode == ClearanceMode::Skip {
        return Ok(ClearanceReport {
            pairs: Vec::new(),
            skipped: true,
        });
    }
    let min_gap = policy.min_gap;
    let stone = Sampled::whole(scene.stone);
    let band = Sampled::whole(scene.band);
    let prongs: Vec<Sampled<'_>> = scene.prongs.iter().map(|p| Sampled::whole(&p.mesh)).collect();

    let mut pairs = vec![measure(ClearancePair::StoneBand, &stone, &band, true, min_gap)];

    let n = scene.prongs.len();
    let neighbours = match n {
        0 | 1 => 0,
        2 => 1,
        _ => n,
    };
    for i in 0..neighbours {
        let j = (i + 1) % n;
        let pair = ClearancePair::ProngProng {
            a: scene.prongs[i].index,
            b: scene.prongs[j].index,
        };
        pairs.push(measure(pair, &prongs[i], &prongs[j], true, min_gap));
    }

    for prong in scene.prongs {
        let shaft = Sampled::with_samples(&prong.mesh, prong.shaft_vertices());
        let embrace = prong.stub_bounds().expanded(min_gap);
        let outside: Vec<Point3<f64>> = scene
            .stone
            .positions
            .iter()
            .filter(|p| !embrace.contains(p))
            .copied()
            .collect();
        let stone_side = Sampled::with_samples(scene.stone, &outside);
        let pair = ClearancePair::ProngStone { prong: prong.index };
        pairs.push(measure(pair, &shaft, &stone_side, true, min_gap));
    }

    if let Some(base) = scene.base {
        let base = Sampled::whole(base);
        pairs.push(measure(ClearancePair::BaseStone, &base, &stone, true, min_gap));
    }

    let refined = pairs.iter().filter(|p| p.refined).count();
    debug!(pairs = pairs.len(), refined, "clearance measured");

    if let Some(worst) = pairs
        .iter()
        .filter(|p| p.distance < min_gap)
        .min_by(|a, b| a.distance.total_cmp(&b.distance))
    {
        return Err(ClearanceViolation {
            pair: worst.pair,
            distance: worst.distance,
            min_gap,
        });
    }
    Ok(ClearanceReport {
        pairs,
        skipped: false,
    })
}
