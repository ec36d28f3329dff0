//! Full-pipeline scenarios checked with the oracle suite.

use approx::assert_relative_eq;
use mesh_kernel::{analyze, KernelError, TriMesh, UnionKernel, UnionOutput};
use setting_ops::{
    generate, ClearancePair, ClearancePolicy, GenerationError, Generator, GeneratorConfig,
    PartKind, ProductionOptions,
};
use setting_types::{BaseStyle, ProngSpec, ProngStyle, StoneSpec};
use test_harness::fixtures::{generate_preview, preview_generator, princess_six, solitaire};
use test_harness::oracle::*;
use test_harness::SettingReport;

// ── Scenario 1: Four-prong solitaire ────────────────────────────────────

#[test]
fn solitaire_is_one_closed_solid() {
    let request = solitaire();
    let out = generate_preview("solitaire", &request).unwrap();

    let report = &out.production.topology;
    assert!(report.is_single_solid(), "{report:?}");
    assert_eq!(report.boundary_edges, 0);
    assert_eq!(out.production.genus(), Some(4));

    assert_eq!(out.designer.prong_count(), 4);
    assert!(out.designer.fragment(PartKind::Stone).is_some());
    assert!(out.designer.fragment(PartKind::Band).is_some());
    assert!(out.designer.fragment(PartKind::Base).is_none());
    assert_eq!(out.designer.fragments.len(), 6);

    let verdicts = run_setting_checks(&out, &request);
    require_all(&verdicts, "solitaire").unwrap();
}

#[test]
fn solitaire_prongs_quarter_turn_apart() {
    let out = generate_preview("solitaire", &solitaire()).unwrap();
    let az: Vec<f64> = out.placements.iter().map(|p| p.azimuth.to_degrees()).collect();
    for pair in az.windows(2) {
        assert_relative_eq!(pair[1] - pair[0], 90.0, epsilon = 1e-9);
    }
}

#[test]
fn solitaire_bounds_match_inputs() {
    let request = solitaire();
    let out = generate_preview("solitaire", &request).unwrap();
    let b = out.production.mesh.bounds();
    assert_relative_eq!(b.max.x, 8.5, epsilon = 0.01);
    assert_relative_eq!(b.min.y, -8.5, epsilon = 0.01);
    assert_relative_eq!(b.min.z, -1.0, epsilon = 0.01);
    assert!(check_bounds_round_trip(&out, &request, 0.01).passed);
}

#[test]
fn stone_footprint_matches_inputs() {
    let cases = [
        StoneSpec::round(6.5, 6.5, 4.0),
        StoneSpec::princess(5.5, 4.0),
        StoneSpec::radiant(4.0, 3.0).with_length(6.0),
        StoneSpec::round(5.0, 7.0, 3.5),
    ];
    for stone in cases {
        let mut request = solitaire();
        request.stone = stone;
        let out = generate_preview("footprint", &request).unwrap();
        let verdict = check_stone_round_trip(&out, &request, 0.01);
        assert!(verdict.passed, "{:?}: {}", request.stone.shape, verdict.detail);
    }
}

#[test]
fn solitaire_through_free_function() {
    let request = solitaire();
    let out = generate(
        request.stone.clone(),
        request.band.clone(),
        request.prong.clone(),
        BaseStyle::Individual,
        ClearancePolicy::default(),
    )
    .unwrap();
    require_all(&run_setting_checks(&out, &request), "solitaire/default").unwrap();
}

#[test]
fn stone_band_gap_exceeds_epsilon() {
    let out = generate_preview("solitaire", &solitaire()).unwrap();
    let sb = out.clearance.get(ClearancePair::StoneBand).unwrap();
    assert!(sb.distance >= 0.01, "{sb:?}");
}

// ── Scenario 2: Six prongs on a princess ────────────────────────────────

#[test]
fn princess_six_prongs_keep_apart() {
    let request = princess_six();
    let out = generate_preview("princess_six", &request).unwrap();
    assert_eq!(out.placements.len(), 6);
    for pair in &out.clearance.pairs {
        if let ClearancePair::ProngProng { .. } = pair.pair {
            assert!(pair.distance >= 0.01, "{pair:?}");
        }
    }
    let report = SettingReport::of(&out, &request);
    assert!(report.all_passed(), "{report}");
}

// ── Scenario 3: Raised bases ────────────────────────────────────────────

#[test]
fn gallery_lifts_the_stone() {
    let mut request = princess_six();
    let flat = generate_preview("individual", &request).unwrap();
    request.prong.base_style = BaseStyle::Gallery;
    let gallery = generate_preview("gallery", &request).unwrap();

    assert_relative_eq!(
        gallery.frame.girdle_z - flat.frame.girdle_z,
        request.prong.base_height,
        epsilon = 1e-12
    );
    assert!(gallery.designer.fragment(PartKind::Base).is_some());
    assert_eq!(gallery.production.genus(), Some(6));
}

#[test]
fn shared_bridges_keep_genus() {
    let mut request = princess_six();
    request.prong.base_style = BaseStyle::Shared;
    let out = generate_preview("shared", &request).unwrap();
    require_all(&run_setting_checks(&out, &request), "shared").unwrap();
}

// ── Scenario 4: Casting mode ────────────────────────────────────────────

#[test]
fn casting_mesh_is_metal_only() {
    let config = GeneratorConfig {
        production: ProductionOptions {
            include_stone: false,
        },
        ..GeneratorConfig::preview()
    };
    let out = Generator::new(config).generate(&solitaire()).unwrap();
    assert!(out.production.range(PartKind::Stone).is_none());
    assert!(out.designer.fragment(PartKind::Stone).is_some());
    require_all(&run_mesh_checks(&out.production.mesh, 1), "casting").unwrap();
    assert!(!check_stone_round_trip(&out, &solitaire(), 0.01).passed);
}

// ── Scenario 5: Failures ────────────────────────────────────────────────

struct RefusingKernel;

impl UnionKernel for RefusingKernel {
    fn name(&self) -> &'static str {
        "refusing"
    }

    fn union(&self, _parts: &[&TriMesh]) -> Result<UnionOutput, KernelError> {
        Err(KernelError::UnionFailed {
            reason: "contact patches not recognised".to_string(),
        })
    }
}

/// Panics if any mesh reaches it.
struct UnreachableKernel;

impl UnionKernel for UnreachableKernel {
    fn name(&self) -> &'static str {
        "unreachable"
    }

    fn union(&self, _parts: &[&TriMesh]) -> Result<UnionOutput, KernelError> {
        panic!("union called for a request that should have been rejected");
    }
}

#[test]
fn kernel_refusal_is_assembly_failure() {
    let generator = preview_generator().with_kernel(Box::new(RefusingKernel));
    let err = generator.generate(&solitaire()).unwrap_err();
    match err {
        GenerationError::AssemblyFailure { reason } => assert!(reason.contains("refusing")),
        other => panic!("expected AssemblyFailure, got {other:?}"),
    }
}

#[test]
fn bad_thickness_rejected_before_meshing() {
    let generator = preview_generator().with_kernel(Box::new(UnreachableKernel));
    for top in [-0.1, 0.9] {
        let mut request = solitaire();
        request.prong.thickness_top = top;
        let err = generator.generate(&request).unwrap_err();
        assert!(matches!(err, GenerationError::InvalidParameter(_)), "{err:?}");
        assert_eq!(err.field(), Some("prong.thickness_top"));
    }
}

#[test]
fn odd_prong_count_rejected() {
    let mut request = solitaire();
    request.prong.count = 5;
    let err = preview_generator().generate(&request).unwrap_err();
    assert_eq!(err.field(), Some("prong.count"));
}

#[test]
fn clearance_gate_blocks_generation() {
    let config = GeneratorConfig {
        clearance: ClearancePolicy {
            min_gap: 5.0,
            ..ClearancePolicy::default()
        },
        ..GeneratorConfig::preview()
    };
    let err = Generator::new(config).generate(&solitaire()).unwrap_err();
    assert!(matches!(err, GenerationError::GeometryInfeasible { .. }), "{err:?}");
}

// ── Scenario 6: Parameter sweeps ────────────────────────────────────────

#[test]
fn taller_setting_raises_stone() {
    let mut last = f64::NEG_INFINITY;
    for height in [2.5, 3.0, 3.5, 4.0, 5.0] {
        let mut request = solitaire();
        request.prong.height = height;
        let out = generate_preview("height sweep", &request).unwrap();
        let stone = out.designer.fragment(PartKind::Stone).unwrap();
        let bottom = stone.mesh.bounds().min.z;
        assert!(bottom > last, "height {height}: culet at {bottom}, previous {last}");
        last = bottom;
    }
}

#[test]
fn every_even_count_spaced_evenly() {
    for count in [2, 4, 6, 8] {
        let mut request = solitaire();
        request.prong = ProngSpec::new(count, 0.8, 0.5, 3.5);
        let out = generate_preview("count sweep", &request).unwrap();
        let verdict = check_azimuth_spacing(&out.placements, 1e-9);
        assert!(verdict.passed, "{count} prongs: {}", verdict.detail);
        assert_eq!(out.production.genus(), Some(i64::from(count)));
    }
}

#[test]
fn claws_seat_like_straight_prongs() {
    let mut request = solitaire();
    request.prong.style = ProngStyle::CurvedClaw { bow: 0.4 };
    let out = generate_preview("claws", &request).unwrap();
    require_all(&run_setting_checks(&out, &request), "claws").unwrap();

    let straight = generate_preview("straight", &solitaire()).unwrap();
    for (c, s) in out.placements.iter().zip(&straight.placements) {
        assert_relative_eq!(c.tip.x, s.tip.x, epsilon = 1e-12);
        assert_relative_eq!(c.base.y, s.base.y, epsilon = 1e-12);
    }
    let designer = analyze(&out.designer.fragment(PartKind::Prong(0)).unwrap().mesh);
    assert!(designer.is_closed_manifold());
}
