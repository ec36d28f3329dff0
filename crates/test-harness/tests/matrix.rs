//! Every stone, band profile, prong style and base style combination.

use mesh_export::{BinaryStl, MeshWriter};
use test_harness::fixtures::{combination_matrix, generate_preview};
use test_harness::oracle::{require_all, run_setting_checks};

#[test]
fn every_combination_is_watertight() {
    let mut failures = Vec::new();
    for (label, request) in combination_matrix() {
        let result = generate_preview(&label, &request)
            .map_err(|e| e.to_string())
            .and_then(|out| {
                require_all(&run_setting_checks(&out, &request), &label).map_err(|e| e.to_string())
            });
        if let Err(e) = result {
            failures.push(e);
        }
    }
    assert!(failures.is_empty(), "{} failures:\n{}", failures.len(), failures.join("\n"));
}

#[test]
fn binary_stl_is_84_plus_50_per_triangle() {
    for (label, request) in combination_matrix().into_iter().step_by(7) {
        let out = generate_preview(&label, &request).unwrap();
        let mesh = &out.production.mesh;
        let mut bytes = Vec::new();
        BinaryStl.write_mesh(mesh, &label, &mut bytes).unwrap();
        assert_eq!(bytes.len(), 84 + 50 * mesh.triangle_count(), "{label}");
    }
}
