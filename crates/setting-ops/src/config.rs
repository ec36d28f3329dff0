//! Generator configuration: mesh resolution, tolerances and output options.

use mesh_kernel::Tolerance;
use serde::{Deserialize, Serialize};
use setting_types::ParameterError;

use crate::clearance::ClearancePolicy;

/// Fixed mesh resolution used for every shape.
///
/// All curved surfaces are approximated by chords between stations; extreme
/// points (band radii, stone girdle axes, band faces) always land on a station.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TessellationConfig {
    /// Azimuth stations around the band, before seat windows are inserted.
    pub band_segments: usize,
    /// Azimuth stations around a round stone.
    pub stone_segments: usize,
    /// Points per quarter arc on comfort-fit corners.
    pub corner_segments: usize,
    /// Interior samples on a domed outer wall; odd so the crest is sampled.
    pub dome_samples: usize,
    /// Loft sections between a prong's foot and its tip.
    pub prong_sections: usize,
}

impl Default for TessellationConfig {
    fn default() -> Self {
        Self {
            band_segments: 96,
            stone_segments: 48,
            corner_segments: 6,
            dome_samples: 9,
            prong_sections: 12,
        }
    }
}

impl TessellationConfig {
    /// Coarse meshes for quick previews and tests.
    pub fn preview() -> Self {
        Self {
            band_segments: 48,
            stone_segments: 24,
            corner_segments: 3,
            dome_samples: 5,
            prong_sections: 6,
        }
    }

    pub fn validate(&self) -> Result<(), ParameterError> {
        for (field, n) in [
            ("tessellation.band_segments", self.band_segments),
            ("tessellation.stone_segments", self.stone_segments),
        ] {
            if n < 8 || n % 4 != 0 {
                return Err(ParameterError::new(
                    field,
                    n as f64,
                    "must be a multiple of 4, at least 8",
                ));
            }
        }
        if self.corner_segments < 1 {
            return Err(ParameterError::new(
                "tessellation.corner_segments",
                self.corner_segments as f64,
                "must be at least 1",
            ));
        }
        if self.dome_samples % 2 == 0 {
            return Err(ParameterError::new(
                "tessellation.dome_samples",
                self.dome_samples as f64,
                "must be odd so the dome crest is sampled",
            ));
        }
        if self.prong_sections < 2 {
            return Err(ParameterError::new(
                "tessellation.prong_sections",
                self.prong_sections as f64,
                "must be at least 2",
            ));
        }
        Ok(())
    }
}

/// What goes into the production solid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProductionOptions {
    /// Union the stone with the metal. When false the solid is metal only
    /// and prong tips stay capped.
    pub include_stone: bool,
}

impl Default for ProductionOptions {
    fn default() -> Self {
        Self {
            include_stone: true,
        }
    }
}

/// Top-level configuration for a [`Generator`](crate::Generator).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub tessellation: TessellationConfig,
    pub tolerance: Tolerance,
    /// Grid spacing for welding coincident vertices (millimetres).
    pub weld_resolution: f64,
    pub clearance: ClearancePolicy,
    pub production: ProductionOptions,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            tessellation: TessellationConfig::default(),
            tolerance: Tolerance::default(),
            weld_resolution: 1e-6,
            clearance: ClearancePolicy::default(),
            production: ProductionOptions::default(),
        }
    }
}

impl GeneratorConfig {
    /// Coarse tessellation, otherwise default.
    pub fn preview() -> Self {
        Self {
            tessellation: TessellationConfig::preview(),
            ..Self::default()
        }
    }

    /// Metal-only production output for casting.
    pub fn casting() -> Self {
        Self {
            production: ProductionOptions {
                include_stone: false,
            },
            ..Self::default()
        }
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn validate(&self) -> Result<(), ParameterError> {
        self.tessellation.validate()?;
        if !(self.weld_resolution > 0.0 && self.weld_resolution < 1e-3) {
            return Err(ParameterError::new(
                "weld_resolution",
                self.weld_resolution,
                "must lie in (0, 0.001) mm",
            ));
        }
        self.clearance.validate()
    }
}
