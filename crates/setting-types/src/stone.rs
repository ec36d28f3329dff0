use serde::{Deserialize, Serialize};

use crate::error::{positive, ParameterError};

/// Supported stone cuts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoneShape {
    /// Brilliant cut with a circular or oval girdle.
    Round,
    /// Square (or rectangular) cut with sharp corners.
    Princess,
    /// Square cut with bevelled corners.
    Radiant,
}

/// Proportions of a cut, as fractions of the stone's size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CutProportions {
    /// Table outline scale relative to the girdle.
    pub table: f64,
    /// Share of the non-girdle depth above the girdle.
    pub crown: f64,
    /// Outline scale of the crown-break ring halfway up the crown.
    pub crown_break: Option<f64>,
    /// Outline scale of the ring halfway down the pavilion.
    pub pavilion_ring: Option<f64>,
    /// Corner bevel as a fraction of the smaller footprint dimension.
    pub corner_cut: f64,
}

impl StoneShape {
    pub fn proportions(self) -> CutProportions {
        match self {
            StoneShape::Round => CutProportions {
                table: 0.53,
                crown: 0.35,
                crown_break: Some(0.85),
                pavilion_ring: Some(0.5),
                corner_cut: 0.0,
            },
            StoneShape::Princess => CutProportions {
                table: 0.65,
                crown: 0.30,
                crown_break: None,
                pavilion_ring: Some(0.6),
                corner_cut: 0.0,
            },
            StoneShape::Radiant => CutProportions {
                table: 0.65,
                crown: 0.32,
                crown_break: None,
                pavilion_ring: None,
                corner_cut: 0.15,
            },
        }
    }

    /// Whether the girdle outline is a polygon rather than an ellipse.
    pub fn is_faceted_outline(self) -> bool {
        !matches!(self, StoneShape::Round)
    }
}

/// Girdle band height as a fraction of the smaller footprint dimension.
pub const GIRDLE_FRACTION: f64 = 0.03;
/// Upper bound on girdle height as a fraction of total depth.
pub const GIRDLE_MAX_DEPTH_FRACTION: f64 = 0.1;

/// A gemstone: footprint along x (`width`) and y (`length`), total `depth` along z.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoneSpec {
    pub shape: StoneShape,
    pub width: f64,
    pub length: f64,
    pub depth: f64,
    /// Allow a non-square footprint for princess and radiant cuts.
    #[serde(default)]
    pub rectangular: bool,
}

impl StoneSpec {
    pub fn round(width: f64, length: f64, depth: f64) -> Self {
        Self {
            shape: StoneShape::Round,
            width,
            length,
            depth,
            rectangular: false,
        }
    }

    pub fn princess(size: f64, depth: f64) -> Self {
        Self {
            shape: StoneShape::Princess,
            width: size,
            length: size,
            depth,
            rectangular: false,
        }
    }

    pub fn radiant(size: f64, depth: f64) -> Self {
        Self {
            shape: StoneShape::Radiant,
            width: size,
            length: size,
            depth,
            rectangular: false,
        }
    }

    /// Same shape with an independent length, allowed to be non-square.
    pub fn with_length(mut self, length: f64) -> Self {
        self.length = length;
        self.rectangular = true;
        self
    }

    /// Height of the vertical girdle band.
    pub fn girdle_height(&self) -> f64 {
        (GIRDLE_FRACTION * self.width.min(self.length)).min(GIRDLE_MAX_DEPTH_FRACTION * self.depth)
    }

    pub fn validate(&self) -> Result<(), ParameterError> {
        positive("stone.width", self.width)?;
        positive("stone.length", self.length)?;
        positive("stone.depth", self.depth)?;
        if self.shape.is_faceted_outline()
            && !self.rectangular
            && (self.width - self.length).abs() > 1e-9
        {
            return Err(ParameterError::new(
                "stone.length",
                self.length,
                format!(
                    "{:?} cut needs a square footprint (width {}) unless marked rectangular",
                    self.shape, self.width
                ),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_stone_is_valid() {
        assert!(StoneSpec::round(6.5, 6.5, 4.0).validate().is_ok());
        assert!(StoneSpec::round(6.5, 8.0, 4.0).validate().is_ok());
    }

    #[test]
    fn non_positive_dimensions_rejected() {
        let e = StoneSpec::round(0.0, 6.5, 4.0).validate().unwrap_err();
        assert_eq!(e.field, "stone.width");
        let e = StoneSpec::princess(5.0, -1.0).validate().unwrap_err();
        assert_eq!(e.field, "stone.depth");
    }

    #[test]
    fn princess_must_be_square_unless_rectangular() {
        let mut s = StoneSpec::princess(5.0, 3.5);
        s.length = 6.0;
        let e = s.validate().unwrap_err();
        assert_eq!(e.field, "stone.length");
        assert_eq!(e.value, 6.0);

        let rect = StoneSpec::princess(5.0, 3.5).with_length(6.0);
        assert!(rect.validate().is_ok());
    }

    #[test]
    fn girdle_is_capped_by_depth() {
        let s = StoneSpec::round(6.5, 6.5, 4.0);
        assert!((s.girdle_height() - 0.195).abs() < 1e-12);
        let shallow = StoneSpec::round(10.0, 10.0, 1.0);
        assert!((shallow.girdle_height() - 0.1).abs() < 1e-12);
    }

    #[test]
    fn proportions_sum_below_one() {
        for shape in [StoneShape::Round, StoneShape::Princess, StoneShape::Radiant] {
            let p = shape.proportions();
            assert!(p.crown > 0.0 && p.crown < 1.0);
            assert!(p.table > 0.0 && p.table < 1.0);
        }
    }

    #[test]
    fn shape_serializes_snake_case() {
        let json = serde_json::to_string(&StoneShape::Princess).unwrap();
        assert_eq!(json, "\"princess\"");
    }
}
