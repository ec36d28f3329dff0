//! Plain-text setting reports for reading test failures.

use std::fmt;

use setting_ops::{SettingOutput, SettingRequest};

use crate::oracle::{run_setting_checks, OracleVerdict};

/// Triangle and vertex counts of one designer fragment.
pub struct PartSummary {
    pub name: String,
    pub triangle_count: usize,
    pub vertex_count: usize,
}

/// One prong's solved placement.
pub struct PlacementSummary {
    pub index: u32,
    pub azimuth_deg: f64,
    pub tilt_deg: f64,
    pub horizontal_offset: f64,
}

/// A complete setting report.
pub struct SettingReport {
    pub parts: Vec<PartSummary>,
    pub placements: Vec<PlacementSummary>,
    pub girdle_z: f64,
    pub production_triangles: usize,
    pub genus: Option<i64>,
    pub bounding_box: ([f64; 3], [f64; 3]),
    pub min_clearance: Option<f64>,
    pub oracle_results: Vec<OracleVerdict>,
}

impl SettingReport {
    /// Summarize `output` and run every setting oracle against it.
    pub fn of(output: &SettingOutput, request: &SettingRequest) -> Self {
        let parts = output
            .designer
            .fragments
            .iter()
            .map(|f| PartSummary {
                name: f.part.to_string(),
                triangle_count: f.mesh.triangle_count(),
                vertex_count: f.mesh.vertex_count(),
            })
            .collect();
        let placements = output
            .placements
            .iter()
            .map(|p| PlacementSummary {
                index: p.index,
                azimuth_deg: p.azimuth.to_degrees(),
                tilt_deg: p.tilt.to_degrees(),
                horizontal_offset: p.horizontal_offset,
            })
            .collect();
        let b = output.production.mesh.bounds();
        Self {
            parts,
            placements,
            girdle_z: output.frame.girdle_z,
            production_triangles: output.production.mesh.triangle_count(),
            genus: output.production.genus(),
            bounding_box: ([b.min.x, b.min.y, b.min.z], [b.max.x, b.max.y, b.max.z]),
            min_clearance: output.clearance.min_distance(),
            oracle_results: run_setting_checks(output, request),
        }
    }

    pub fn all_passed(&self) -> bool {
        self.oracle_results.iter().all(|v| v.passed)
    }

    /// Format the report as text.
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        out.push_str("=== Prong Setting Report ===\n\n");

        out.push_str(&format!("Designer Parts ({}):\n", self.parts.len()));
        for p in &self.parts {
            out.push_str(&format!(
                "  {}: {} triangles, {} vertices\n",
                p.name, p.triangle_count, p.vertex_count
            ));
        }

        out.push_str(&format!(
            "\nPlacements (girdle at z = {:.3}):\n",
            self.girdle_z
        ));
        for p in &self.placements {
            out.push_str(&format!(
                "  [{}] azimuth {:.2} deg, tilt {:.2} deg, offset {:.3}\n",
                p.index, p.azimuth_deg, p.tilt_deg, p.horizontal_offset
            ));
        }

        let genus = self
            .genus
            .map_or_else(|| "undefined".to_string(), |g| g.to_string());
        out.push_str(&format!(
            "\nProduction: {} triangles, genus {}\n",
            self.production_triangles, genus
        ));
        let (min, max) = self.bounding_box;
        out.push_str(&format!(
            "Bounding Box: ({:.3}, {:.3}, {:.3}) -> ({:.3}, {:.3}, {:.3})\n",
            min[0], min[1], min[2], max[0], max[1], max[2],
        ));
        match self.min_clearance {
            Some(d) => out.push_str(&format!("Closest Pair: {d:.4} mm\n")),
            None => out.push_str("Closest Pair: not measured\n"),
        }

        out.push_str(&format!(
            "\nOracle Results ({} checks):\n",
            self.oracle_results.len()
        ));
        for v in &self.oracle_results {
            let status = if v.passed { "PASS" } else { "FAIL" };
            out.push_str(&format!("  [{}] {}: {}\n", status, v.oracle_name, v.detail));
        }
        out
    }
}

impl fmt::Display for SettingReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_text())
    }
}
