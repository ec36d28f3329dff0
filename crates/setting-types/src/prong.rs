use serde::{Deserialize, Serialize};

use crate::error::{positive, ParameterError};

/// How prong feet meet the band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BaseStyle {
    /// Each prong stands on its own foot on the band.
    Individual,
    /// Adjacent pairs of prongs share a raised bridge.
    Shared,
    /// All prongs stand on one continuous raised rail.
    Gallery,
}

impl BaseStyle {
    /// Whether prongs stand on a raised base rather than the band itself.
    pub fn is_raised(self) -> bool {
        !matches!(self, BaseStyle::Individual)
    }
}

/// Shape of the prong between foot and tip.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProngStyle {
    /// Straight centreline, cross-section narrowing linearly.
    Straight,
    /// Centreline bowed outward by `bow` at mid-length; the taper is
    /// held near the foot and tightens toward the tip.
    CurvedClaw { bow: f64 },
}

pub const DEFAULT_THICKNESS_BASE: f64 = 0.8;
pub const DEFAULT_THICKNESS_TOP: f64 = 0.5;
pub const DEFAULT_SETTING_HEIGHT: f64 = 3.5;
pub const DEFAULT_EMBRACE_DEPTH: f64 = 0.1;
pub const DEFAULT_BASE_WIDTH: f64 = 1.2;
pub const DEFAULT_BASE_HEIGHT: f64 = 1.0;

/// The prong array holding the stone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProngSpec {
    /// Number of prongs; even, from 2 to 8.
    pub count: u32,
    /// Cross-section side at the foot.
    pub thickness_base: f64,
    /// Cross-section width at the tip.
    pub thickness_top: f64,
    /// Setting height: vertical rise from the prong seat to the stone girdle.
    pub height: f64,
    pub base_style: BaseStyle,
    pub style: ProngStyle,
    /// Radial length of the tip stub that closes onto the girdle.
    pub embrace_depth: f64,
    /// Radial width of a shared bridge or gallery rail.
    pub base_width: f64,
    /// Height of a shared bridge or gallery rail above the band.
    pub base_height: f64,
}

impl Default for ProngSpec {
    fn default() -> Self {
        Self {
            count: 4,
            thickness_base: DEFAULT_THICKNESS_BASE,
            thickness_top: DEFAULT_THICKNESS_TOP,
            height: DEFAULT_SETTING_HEIGHT,
            base_style: BaseStyle::Individual,
            style: ProngStyle::Straight,
            embrace_depth: DEFAULT_EMBRACE_DEPTH,
            base_width: DEFAULT_BASE_WIDTH,
            base_height: DEFAULT_BASE_HEIGHT,
        }
    }
}

impl ProngSpec {
    pub fn new(count: u32, thickness_base: f64, thickness_top: f64, height: f64) -> Self {
        Self {
            count,
            thickness_base,
            thickness_top,
            height,
            ..Self::default()
        }
    }

    pub fn with_base_style(mut self, base_style: BaseStyle) -> Self {
        self.base_style = base_style;
        self
    }

    pub fn with_style(mut self, style: ProngStyle) -> Self {
        self.style = style;
        self
    }

    /// Height of the seat plane above the band top.
    pub fn base_elevation(&self) -> f64 {
        if self.base_style.is_raised() {
            self.base_height
        } else {
            0.0
        }
    }

    pub fn validate(&self) -> Result<(), ParameterError> {
        if self.count < 2 || self.count > 8 || self.count % 2 != 0 {
            return Err(ParameterError::new(
                "prong.count",
                f64::from(self.count),
                "must be an even number from 2 to 8",
            ));
        }
        positive("prong.thickness_base", self.thickness_base)?;
        positive("prong.thickness_top", self.thickness_top)?;
        if self.thickness_top > self.thickness_base {
            return Err(ParameterError::new(
                "prong.thickness_top",
                self.thickness_top,
                format!(
                    "must not exceed thickness_base {} (prongs narrow upward)",
                    self.thickness_base
                ),
            ));
        }
        positive("prong.height", self.height)?;
        positive("prong.embrace_depth", self.embrace_depth)?;
        if let ProngStyle::CurvedClaw { bow } = self.style {
            if !(bow.is_finite() && bow >= 0.0) {
                return Err(ParameterError::new(
                    "prong.bow",
                    bow,
                    "must be a non-negative finite length",
                ));
            }
        }
        if self.base_style.is_raised() {
            positive("prong.base_height", self.base_height)?;
            positive("prong.base_width", self.base_width)?;
            if self.base_width < self.thickness_base {
                return Err(ParameterError::new(
                    "prong.base_width",
                    self.base_width,
                    format!(
                        "must be at least thickness_base {} to carry the prong feet",
                        self.thickness_base
                    ),
                ));
            }
        }
        Ok(())
    }
}
