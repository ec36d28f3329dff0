//! Verification oracles: pure functions returning pass/fail verdicts.
//!
//! Each oracle returns an `OracleVerdict` with diagnostic detail, not panics,
//! so one run can collect every failure of a generated setting.

use std::f64::consts::TAU;

use mesh_kernel::{analyze, Aabb, Point3, TopologyReport, TriMesh};
use setting_ops::shapes::{BandMetrics, StoneProfile};
use setting_ops::{PartKind, PlacementTransform, ProductionMesh, SettingOutput, SettingRequest};

use crate::fixtures::HarnessError;

/// The result of a single oracle check.
#[derive(Debug, Clone)]
pub struct OracleVerdict {
    pub oracle_name: String,
    pub passed: bool,
    pub detail: String,
    pub value: Option<f64>,
}

impl OracleVerdict {
    fn pass(name: &str, detail: String) -> Self {
        Self {
            oracle_name: name.to_string(),
            passed: true,
            detail,
            value: None,
        }
    }

    fn pass_val(name: &str, detail: String, value: f64) -> Self {
        Self {
            oracle_name: name.to_string(),
            passed: true,
            detail,
            value: Some(value),
        }
    }

    fn fail(name: &str, detail: String) -> Self {
        Self {
            oracle_name: name.to_string(),
            passed: false,
            detail,
            value: None,
        }
    }

    fn fail_val(name: &str, detail: String, value: f64) -> Self {
        Self {
            oracle_name: name.to_string(),
            passed: false,
            detail,
            value: Some(value),
        }
    }
}

// ── Topology Oracles ────────────────────────────────────────────────────────

/// Every edge is shared by exactly two triangles: no holes, no flaps.
pub fn check_watertight(report: &TopologyReport) -> OracleVerdict {
    if report.boundary_edges == 0 && report.face_count > 0 {
        OracleVerdict::pass(
            "watertight",
            format!("0 boundary edges over {} faces", report.face_count),
        )
    } else {
        OracleVerdict::fail_val(
            "watertight",
            format!(
                "{} boundary edges over {} faces",
                report.boundary_edges, report.face_count
            ),
            report.boundary_edges as f64,
        )
    }
}

/// Consistent orientation, no edge shared by three or more faces, no
/// degenerate triangles.
pub fn check_manifold(report: &TopologyReport) -> OracleVerdict {
    let bad = report.non_manifold_edges + report.inconsistent_edges + report.degenerate_triangles;
    if bad == 0 {
        OracleVerdict::pass(
            "manifold",
            format!("all {} edges manifold and consistently oriented", report.edge_count),
        )
    } else {
        OracleVerdict::fail_val(
            "manifold",
            format!(
                "{} non-manifold, {} inconsistent edges, {} degenerate triangles",
                report.non_manifold_edges, report.inconsistent_edges, report.degenerate_triangles
            ),
            bad as f64,
        )
    }
}

/// One closed piece with V - E + F = 2 - 2g for the expected genus.
pub fn check_euler_genus(report: &TopologyReport, expected_genus: i64) -> OracleVerdict {
    let (v, e, f) = (report.vertex_count, report.edge_count, report.face_count);
    let chi = report.euler_characteristic;
    let expected_chi = 2 - 2 * expected_genus;
    if report.components == 1 && chi == expected_chi && report.genus == Some(expected_genus) {
        OracleVerdict::pass_val(
            "euler_genus",
            format!("V({v}) - E({e}) + F({f}) = {chi}, genus {expected_genus}"),
            chi as f64,
        )
    } else {
        OracleVerdict::fail_val(
            "euler_genus",
            format!(
                "V({v}) - E({e}) + F({f}) = {chi} over {} components (expected {expected_chi}, genus {expected_genus})",
                report.components
            ),
            chi as f64,
        )
    }
}

/// Enclosed volume is positive, so faces wind outward.
pub fn check_positive_volume(mesh: &TriMesh) -> OracleVerdict {
    let volume = mesh.signed_volume();
    if volume > 0.0 {
        OracleVerdict::pass_val("positive_volume", format!("volume {volume:.3} mm^3"), volume)
    } else {
        OracleVerdict::fail_val(
            "positive_volume",
            format!("volume {volume:.3} mm^3 (inside out or open)"),
            volume,
        )
    }
}

// ── Placement Oracles ───────────────────────────────────────────────────────

/// Consecutive prongs are 360/N degrees apart.
pub fn check_azimuth_spacing(placements: &[PlacementTransform], tol: f64) -> OracleVerdict {
    let n = placements.len();
    if n < 2 {
        return OracleVerdict::fail("azimuth_spacing", format!("{n} placements"));
    }
    let step = TAU / n as f64;
    let mut worst: f64 = 0.0;
    for i in 0..n {
        let a = placements[i].azimuth;
        let b = placements[(i + 1) % n].azimuth;
        let gap = (b - a).rem_euclid(TAU);
        worst = worst.max((gap - step).abs());
    }
    if worst <= tol {
        OracleVerdict::pass_val(
            "azimuth_spacing",
            format!("{n} prongs, {:.3} deg apart (max error {worst:.2e})", step.to_degrees()),
            worst,
        )
    } else {
        OracleVerdict::fail_val(
            "azimuth_spacing",
            format!("max spacing error {worst:.2e} rad exceeds {tol:.0e}"),
            worst,
        )
    }
}

/// Tips sit at the girdle height in increasing prong order.
pub fn check_tip_height(output: &SettingOutput, tol: f64) -> OracleVerdict {
    let girdle = output.frame.girdle_z;
    let worst = output
        .placements
        .iter()
        .map(|p| (p.tip.z - girdle).abs())
        .fold(0.0, f64::max);
    if worst <= tol {
        OracleVerdict::pass_val("tip_height", format!("tips at z = {girdle:.3}"), worst)
    } else {
        OracleVerdict::fail_val(
            "tip_height",
            format!("tip off the girdle plane z = {girdle:.3} by {worst:.2e}"),
            worst,
        )
    }
}

// ── Output Oracles ──────────────────────────────────────────────────────────

/// Bounding box the inputs imply: band radius across, band bottom to table top.
pub fn expected_bounds(request: &SettingRequest, girdle_z: f64) -> Aabb {
    let band = BandMetrics::of(&request.band);
    let r = band.outer_radius;
    let top = girdle_z + StoneProfile::of(&request.stone).top();
    Aabb::from_points(&[
        Point3::new(-r, -r, band.bottom_z),
        Point3::new(r, r, top.max(band.top_z)),
    ])
}

/// The production bounds match those implied by the inputs within `tol`.
pub fn check_bounds_round_trip(
    output: &SettingOutput,
    request: &SettingRequest,
    tol: f64,
) -> OracleVerdict {
    let actual = output.production.mesh.bounds();
    let expected = expected_bounds(request, output.frame.girdle_z);
    let worst = (actual.min - expected.min)
        .abs()
        .max()
        .max((actual.max - expected.max).abs().max());
    let detail = format!(
        "({:.3}, {:.3}, {:.3}) -> ({:.3}, {:.3}, {:.3}), expected ({:.3}, {:.3}, {:.3}) -> ({:.3}, {:.3}, {:.3})",
        actual.min.x, actual.min.y, actual.min.z, actual.max.x, actual.max.y, actual.max.z,
        expected.min.x, expected.min.y, expected.min.z, expected.max.x, expected.max.y, expected.max.z,
    );
    if worst <= tol {
        OracleVerdict::pass_val("bounds_round_trip", detail, worst)
    } else {
        OracleVerdict::fail_val("bounds_round_trip", detail, worst)
    }
}

/// Part ranges tile the production triangles without gaps or overlaps.
pub fn check_part_ranges(production: &ProductionMesh) -> OracleVerdict {
    let mut next = 0;
    for range in &production.parts {
        if range.start != next || range.is_empty() {
            return OracleVerdict::fail(
                "part_ranges",
                format!("{} spans {}..{}, expected to start at {next}", range.part, range.start, range.end),
            );
        }
        next = range.end;
    }
    let total = production.mesh.triangle_count();
    if next != total {
        return OracleVerdict::fail(
            "part_ranges",
            format!("ranges end at {next} of {total} triangles"),
        );
    }
    if production.range(PartKind::Band).is_none() {
        return OracleVerdict::fail("part_ranges", "no band triangles survived".to_string());
    }
    OracleVerdict::pass(
        "part_ranges",
        format!("{} parts over {total} triangles", production.parts.len()),
    )
}

/// Every measured pair is at least `min_gap` apart.
pub fn check_clearance(output: &SettingOutput, min_gap: f64) -> OracleVerdict {
    let report = &output.clearance;
    if report.skipped {
        return OracleVerdict::fail("clearance", "clearance was not measured".to_string());
    }
    match report.min_distance() {
        Some(d) if d >= min_gap => OracleVerdict::pass_val(
            "clearance",
            format!("{} pairs, closest {d:.4} mm", report.pairs.len()),
            d,
        ),
        Some(d) => OracleVerdict::fail_val(
            "clearance",
            format!("closest pair {d:.4} mm is under {min_gap} mm"),
            d,
        ),
        None => OracleVerdict::fail("clearance", "no pairs measured".to_string()),
    }
}

// ── Batch Runners ───────────────────────────────────────────────────────────

/// Topology checks for a closed part or assembly of known genus.
pub fn run_mesh_checks(mesh: &TriMesh, expected_genus: i64) -> Vec<OracleVerdict> {
    let report = analyze(mesh);
    vec![
        check_watertight(&report),
        check_manifold(&report),
        check_euler_genus(&report, expected_genus),
        check_positive_volume(mesh),
    ]
}

/// The stone's part range in the production mesh spans the requested
/// width along x and length along y.
pub fn check_stone_round_trip(
    output: &SettingOutput,
    request: &SettingRequest,
    tol: f64,
) -> OracleVerdict {
    let name = "stone_round_trip";
    let Some(range) = output.production.range(PartKind::Stone) else {
        return OracleVerdict::fail(name, "production mesh has no stone".to_string());
    };
    let mesh = &output.production.mesh;
    let points: Vec<Point3<f64>> = mesh.triangles[range.start..range.end]
        .iter()
        .flatten()
        .map(|&v| mesh.positions[v as usize])
        .collect();
    if points.is_empty() {
        return OracleVerdict::fail(name, "stone range is empty".to_string());
    }
    let extents = Aabb::from_points(&points).extents();
    let worst = (extents.x - request.stone.width)
        .abs()
        .max((extents.y - request.stone.length).abs());
    let detail = format!(
        "stone {:.3} x {:.3}, expected {:.3} x {:.3}",
        extents.x, extents.y, request.stone.width, request.stone.length
    );
    if worst <= tol {
        OracleVerdict::pass_val(name, detail, worst)
    } else {
        OracleVerdict::fail_val(name, detail, worst)
    }
}

/// Every oracle that applies to a full setting with the stone included.
pub fn run_setting_checks(output: &SettingOutput, request: &SettingRequest) -> Vec<OracleVerdict> {
    let mut verdicts = run_mesh_checks(&output.production.mesh, i64::from(request.prong.count));
    verdicts.extend([
        check_azimuth_spacing(&output.placements, 1e-9),
        check_tip_height(output, 1e-9),
        check_bounds_round_trip(output, request, 0.01),
        check_stone_round_trip(output, request, 0.01),
        check_part_ranges(&output.production),
        check_clearance(output, 0.01),
    ]);
    verdicts
}

/// Fail with every failing verdict listed.
pub fn require_all(verdicts: &[OracleVerdict], ctx: &str) -> Result<(), HarnessError> {
    let failures: Vec<String> = verdicts
        .iter()
        .filter(|v| !v.passed)
        .map(|v| format!("{}: {}", v.oracle_name, v.detail))
        .collect();
    if failures.is_empty() {
        Ok(())
    } else {
        Err(HarnessError::OracleFailure {
            oracle: ctx.to_string(),
            detail: failures.join("; "),
        })
    }
}
