//! Canonical parameter sets and the error type shared by harness checks.

use mesh_export::ExportError;
use setting_ops::{GenerationError, Generator, GeneratorConfig, SettingOutput, SettingRequest};
use setting_types::{BandProfile, BandSpec, BaseStyle, ProngSpec, ProngStyle, StoneSpec};

// ── Error Type ──────────────────────────────────────────────────────────────

/// Unified error type for the test harness.
#[derive(Debug, thiserror::Error)]
pub enum HarnessError {
    #[error("generation failed for {label}: {source}")]
    Generation {
        label: String,
        #[source]
        source: GenerationError,
    },

    #[error("export failed: {0}")]
    Export(#[from] ExportError),

    #[error("oracle failure ({oracle}): {detail}")]
    OracleFailure { oracle: String, detail: String },
}

// ── Canonical Requests ──────────────────────────────────────────────────────

/// Round 6.5 x 6.5 x 4.0 stone on a flat band (outer 8.5, tube 1.0) with
/// four 0.8/0.5 prongs and a 3.5 setting height.
pub fn solitaire() -> SettingRequest {
    SettingRequest::new(
        StoneSpec::round(6.5, 6.5, 4.0),
        BandSpec::flat(8.5, 1.0),
        ProngSpec::new(4, 0.8, 0.5, 3.5),
    )
}

/// Six prongs around a princess cut.
pub fn princess_six() -> SettingRequest {
    SettingRequest::new(
        StoneSpec::princess(5.5, 4.0),
        BandSpec::flat(8.5, 1.5),
        ProngSpec::new(6, 0.7, 0.45, 3.0),
    )
}

pub fn stones() -> Vec<StoneSpec> {
    vec![
        StoneSpec::round(6.5, 6.5, 4.0),
        StoneSpec::princess(5.5, 4.0),
        StoneSpec::radiant(6.0, 4.2),
    ]
}

pub fn profiles() -> Vec<BandProfile> {
    vec![
        BandProfile::Flat,
        BandProfile::Tapered { taper_ratio: 0.8 },
        BandProfile::Domed { dome_height: 0.3 },
        BandProfile::ComfortFit { corner_radius: 0.3 },
    ]
}

pub fn prong_styles() -> Vec<ProngStyle> {
    vec![ProngStyle::Straight, ProngStyle::CurvedClaw { bow: 0.3 }]
}

pub fn base_styles() -> Vec<BaseStyle> {
    vec![BaseStyle::Individual, BaseStyle::Shared, BaseStyle::Gallery]
}

/// Every stone shape, band profile, prong style and base style, labelled.
///
/// The band is thick enough to carry a gallery rail under every profile.
pub fn combination_matrix() -> Vec<(String, SettingRequest)> {
    let mut out = Vec::new();
    for stone in stones() {
        for profile in profiles() {
            for style in prong_styles() {
                for base in base_styles() {
                    let label = format!("{:?}/{:?}/{:?}/{:?}", stone.shape, profile, style, base);
                    let prong = ProngSpec::default().with_style(style).with_base_style(base);
                    let band = BandSpec::new(8.5, 2.0, profile);
                    out.push((label, SettingRequest::new(stone.clone(), band, prong)));
                }
            }
        }
    }
    out
}

// ── Generation ──────────────────────────────────────────────────────────────

/// Generator at preview resolution, for fast scenario runs.
pub fn preview_generator() -> Generator {
    Generator::new(GeneratorConfig::preview())
}

/// Generate at preview resolution, labelling any failure.
pub fn generate_preview(label: &str, request: &SettingRequest) -> Result<SettingOutput, HarnessError> {
    preview_generator()
        .generate(request)
        .map_err(|source| HarnessError::Generation {
            label: label.to_string(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixtures_validate() {
        assert!(solitaire().validate().is_ok());
        assert!(princess_six().validate().is_ok());
        for (label, request) in combination_matrix() {
            assert!(request.validate().is_ok(), "{label}");
        }
    }

    #[test]
    fn matrix_covers_every_combination() {
        assert_eq!(combination_matrix().len(), 3 * 4 * 2 * 3);
    }
}
