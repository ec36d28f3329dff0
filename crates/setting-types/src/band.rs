use serde::{Deserialize, Serialize};

use crate::error::{positive, ParameterError};

/// Axial width used when a band is built from radii alone.
pub const DEFAULT_BAND_WIDTH: f64 = 2.0;

/// Cross-section of the band before it is revolved.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BandProfile {
    /// Rectangle.
    Flat,
    /// Trapezoid. `taper_ratio` is bottom-face thickness over top-face thickness.
    Tapered { taper_ratio: f64 },
    /// Outer wall bulged by a quadratic Bezier; the bulge peaks at `outer_radius`.
    Domed { dome_height: f64 },
    /// Rounded rectangle.
    ComfortFit { corner_radius: f64 },
}

/// US ring sizes and their inner diameters in millimetres.
pub const US_RING_SIZES: [(f64, f64); 7] = [
    (7.0, 17.35),
    (7.5, 17.75),
    (8.0, 18.19),
    (8.5, 18.53),
    (9.0, 19.03),
    (9.5, 19.41),
    (10.0, 19.84),
];

/// A ring band revolved around the vertical axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BandSpec {
    pub outer_radius: f64,
    /// Derived as `outer_radius - thickness` when absent.
    #[serde(default)]
    pub inner_radius: Option<f64>,
    /// Radial thickness.
    pub thickness: f64,
    /// Axial width.
    #[serde(default = "default_band_width")]
    pub width: f64,
    pub profile: BandProfile,
}

fn default_band_width() -> f64 {
    DEFAULT_BAND_WIDTH
}

impl BandSpec {
    pub fn new(outer_radius: f64, thickness: f64, profile: BandProfile) -> Self {
        Self {
            outer_radius,
            inner_radius: None,
            thickness,
            width: DEFAULT_BAND_WIDTH,
            profile,
        }
    }

    pub fn flat(outer_radius: f64, thickness: f64) -> Self {
        Self::new(outer_radius, thickness, BandProfile::Flat)
    }

    pub fn with_width(mut self, width: f64) -> Self {
        self.width = width;
        self
    }

    /// Band whose inner diameter matches a US ring size.
    pub fn from_us_size(
        size: f64,
        thickness: f64,
        width: f64,
        profile: BandProfile,
    ) -> Result<Self, ParameterError> {
        let Some(&(_, diameter)) = US_RING_SIZES
            .iter()
            .find(|(s, _)| (s - size).abs() < 1e-9)
        else {
            return Err(ParameterError::new(
                "band.size",
                size,
                "not a supported US ring size (7 to 10 in half sizes)",
            ));
        };
        let inner = diameter / 2.0;
        Ok(Self {
            outer_radius: inner + thickness,
            inner_radius: Some(inner),
            thickness,
            width,
            profile,
        })
    }

    pub fn inner_radius(&self) -> f64 {
        self.inner_radius
            .unwrap_or(self.outer_radius - self.thickness)
    }

    pub fn validate(&self) -> Result<(), ParameterError> {
        positive("band.outer_radius", self.outer_radius)?;
        positive("band.thickness", self.thickness)?;
        positive("band.width", self.width)?;

        let inner = self.inner_radius();
        if let Some(given) = self.inner_radius {
            if (self.outer_radius - given - self.thickness).abs() > 1e-9 {
                return Err(ParameterError::new(
                    "band.inner_radius",
                    given,
                    format!(
                        "inconsistent with outer_radius {} and thickness {}",
                        self.outer_radius, self.thickness
                    ),
                ));
            }
        }
        if !(inner > 0.0 && inner < self.outer_radius) {
            return Err(ParameterError::new(
                "band.inner_radius",
                inner,
                "must lie strictly between zero and outer_radius",
            ));
        }

        match self.profile {
            BandProfile::Flat => {}
            BandProfile::Tapered { taper_ratio } => {
                if !(taper_ratio > 0.0 && taper_ratio <= 1.0) {
                    return Err(ParameterError::new(
                        "band.taper_ratio",
                        taper_ratio,
                        "must lie in (0, 1]",
                    ));
                }
            }
            BandProfile::Domed { dome_height } => {
                positive("band.dome_height", dome_height)?;
                if dome_height >= self.thickness {
                    return Err(ParameterError::new(
                        "band.dome_height",
                        dome_height,
                        format!("must be less than thickness {}", self.thickness),
                    ));
                }
            }
            BandProfile::ComfortFit { corner_radius } => {
                positive("band.corner_radius", corner_radius)?;
                let limit = self.thickness.min(self.width) / 2.0;
                if corner_radius >= limit {
                    return Err(ParameterError::new(
                        "band.corner_radius",
                        corner_radius,
                        format!("must be less than {limit} or the profile self-intersects"),
                    ));
                }
            }
        }
        Ok(())
    }
}
