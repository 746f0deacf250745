//! Shared types for heightmark: point names, image-space coordinates,
//! frame geometry, and the crate error type.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Default calibration value attached to the Axis tick.
pub const DEFAULT_AXIS_VALUE: f64 = 100.0;

/// Largest accepted calibration magnitude, in either direction.
pub const AXIS_VALUE_LIMIT: f64 = 1e9;

/// One of the five fixed reference points a user can place.
///
/// The set is closed: every name that can reach the registry is one of
/// these variants. String input is parsed with [`FromStr`], which rejects
/// anything else with [`AnnotateError::InvalidName`].
///
/// Variant order is the display order used by overlays and exports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PointName {
    /// Reference zero-height line (usually the chart's x axis).
    Baseline,
    /// Control group bar or marker top.
    Control,
    /// Group A bar or marker top.
    A,
    /// Group B bar or marker top.
    B,
    /// Optional calibration tick on the y axis (e.g. the 100% line).
    Axis,
}

impl PointName {
    /// Every point name, in display order.
    pub const ALL: [Self; 5] = [Self::Baseline, Self::Control, Self::A, Self::B, Self::Axis];

    /// Canonical name, identical to the serialized form.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Baseline => "Baseline",
            Self::Control => "Control",
            Self::A => "A",
            Self::B => "B",
            Self::Axis => "Axis",
        }
    }

    /// Position of this name within [`Self::ALL`].
    pub(crate) const fn index(self) -> usize {
        match self {
            Self::Baseline => 0,
            Self::Control => 1,
            Self::A => 2,
            Self::B => 3,
            Self::Axis => 4,
        }
    }
}

impl fmt::Display for PointName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PointName {
    type Err = AnnotateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|name| name.as_str() == s)
            .ok_or_else(|| AnnotateError::InvalidName(s.to_string()))
    }
}

/// An integer coordinate in image space.
///
/// Image space is the pixel grid of the current working image (full
/// capture or cropped region), with `y` growing downwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ImagePoint {
    /// Horizontal position (pixels from left edge).
    pub x: i32,
    /// Vertical position (pixels from top edge).
    pub y: i32,
}

impl ImagePoint {
    /// Create a new point.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for ImagePoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Image dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Dimensions {
    /// Clamp a point into `[0, width - 1] x [0, height - 1]`.
    ///
    /// A zero-sized axis clamps to 0.
    #[must_use]
    pub fn clamp(self, point: ImagePoint) -> ImagePoint {
        let max_x = i32::try_from(self.width.saturating_sub(1)).unwrap_or(i32::MAX);
        let max_y = i32::try_from(self.height.saturating_sub(1)).unwrap_or(i32::MAX);
        ImagePoint::new(point.x.clamp(0, max_x), point.y.clamp(0, max_y))
    }
}

/// A rectangular region of a frame, in image space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    /// Left edge (inclusive).
    pub x: u32,
    /// Top edge (inclusive).
    pub y: u32,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Region {
    /// Size of the region as frame dimensions.
    #[must_use]
    pub const fn dimensions(self) -> Dimensions {
        Dimensions {
            width: self.width,
            height: self.height,
        }
    }

    /// Check that the region is non-empty and lies inside `frame`.
    ///
    /// # Errors
    ///
    /// Returns [`AnnotateError::InvalidRegion`] describing the violation.
    pub fn validate(self, frame: Dimensions) -> Result<(), AnnotateError> {
        if self.width == 0 || self.height == 0 {
            return Err(AnnotateError::InvalidRegion(format!(
                "region {}x{} is empty",
                self.width, self.height
            )));
        }
        let right = u64::from(self.x) + u64::from(self.width);
        let bottom = u64::from(self.y) + u64::from(self.height);
        if right > u64::from(frame.width) || bottom > u64::from(frame.height) {
            return Err(AnnotateError::InvalidRegion(format!(
                "region {}x{}+{}+{} exceeds frame {}x{}",
                self.width, self.height, self.x, self.y, frame.width, frame.height
            )));
        }
        Ok(())
    }
}

/// Check that a calibration value is finite and within
/// [`AXIS_VALUE_LIMIT`] in magnitude.
///
/// # Errors
///
/// Returns [`AnnotateError::AxisValueOutOfRange`] otherwise.
pub fn validate_axis_value(value: f64) -> Result<f64, AnnotateError> {
    if value.is_finite() && value.abs() <= AXIS_VALUE_LIMIT {
        Ok(value)
    } else {
        Err(AnnotateError::AxisValueOutOfRange(value))
    }
}

/// Errors raised at the annotation boundary.
///
/// Numerical indeterminacy (missing points, zero divisors) is never an
/// error; it surfaces as `None` in [`Metrics`](crate::Metrics).
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AnnotateError {
    /// A point name outside the fixed set was referenced.
    #[error("invalid point name '{0}' (expected one of Baseline, Control, A, B, Axis)")]
    InvalidName(String),

    /// The calibration value is not finite or exceeds the accepted range.
    #[error("axis value {0} is outside the accepted range of +/-1e9")]
    AxisValueOutOfRange(f64),

    /// An operation needs a working image but none is loaded.
    #[error("no image is loaded")]
    NoFrame,

    /// A click arrived while no placement mode was active.
    #[error("no point placement is in progress")]
    NoActiveMode,

    /// A crop region is empty or outside the frame.
    #[error("invalid region: {0}")]
    InvalidRegion(String),
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn point_name_parses_every_canonical_name() {
        for name in PointName::ALL {
            assert_eq!(name.as_str().parse::<PointName>().unwrap(), name);
        }
    }

    #[test]
    fn point_name_rejects_unknown() {
        let err = "Treatment".parse::<PointName>().unwrap_err();
        assert_eq!(err, AnnotateError::InvalidName("Treatment".to_string()));
    }

    #[test]
    fn point_name_is_case_sensitive() {
        assert!("baseline".parse::<PointName>().is_err());
        assert!("a".parse::<PointName>().is_err());
    }

    #[test]
    fn point_name_index_matches_all() {
        for (i, name) in PointName::ALL.into_iter().enumerate() {
            assert_eq!(name.index(), i);
        }
    }

    #[test]
    fn point_name_serializes_as_canonical_string() {
        let json = serde_json::to_string(&PointName::Control).unwrap();
        assert_eq!(json, "\"Control\"");
        let back: PointName = serde_json::from_str("\"Axis\"").unwrap();
        assert_eq!(back, PointName::Axis);
    }

    #[test]
    fn image_point_display() {
        assert_eq!(ImagePoint::new(12, -3).to_string(), "(12, -3)");
    }

    #[test]
    fn clamp_keeps_inside_points() {
        let dims = Dimensions {
            width: 100,
            height: 50,
        };
        assert_eq!(dims.clamp(ImagePoint::new(10, 20)), ImagePoint::new(10, 20));
    }

    #[test]
    fn clamp_pulls_outside_points_to_edges() {
        let dims = Dimensions {
            width: 100,
            height: 50,
        };
        assert_eq!(dims.clamp(ImagePoint::new(-5, 80)), ImagePoint::new(0, 49));
        assert_eq!(dims.clamp(ImagePoint::new(200, -1)), ImagePoint::new(99, 0));
    }

    #[test]
    fn region_inside_frame_is_valid() {
        let frame = Dimensions {
            width: 100,
            height: 100,
        };
        let region = Region {
            x: 10,
            y: 20,
            width: 90,
            height: 80,
        };
        assert!(region.validate(frame).is_ok());
    }

    #[test]
    fn empty_region_is_rejected() {
        let frame = Dimensions {
            width: 100,
            height: 100,
        };
        let region = Region {
            x: 0,
            y: 0,
            width: 0,
            height: 10,
        };
        assert!(matches!(
            region.validate(frame),
            Err(AnnotateError::InvalidRegion(_))
        ));
    }

    #[test]
    fn region_past_frame_edge_is_rejected() {
        let frame = Dimensions {
            width: 100,
            height: 100,
        };
        let region = Region {
            x: 50,
            y: 0,
            width: 51,
            height: 10,
        };
        assert!(matches!(
            region.validate(frame),
            Err(AnnotateError::InvalidRegion(_))
        ));
    }

    #[test]
    fn axis_value_range() {
        assert_eq!(validate_axis_value(100.0), Ok(100.0));
        assert_eq!(validate_axis_value(-1e9), Ok(-1e9));
        assert!(validate_axis_value(1e9 + 1.0).is_err());
        assert!(validate_axis_value(f64::NAN).is_err());
        assert!(validate_axis_value(f64::INFINITY).is_err());
    }

    #[test]
    fn error_display() {
        assert_eq!(AnnotateError::NoFrame.to_string(), "no image is loaded");
        assert_eq!(
            AnnotateError::InvalidName("Q".to_string()).to_string(),
            "invalid point name 'Q' (expected one of Baseline, Control, A, B, Axis)",
        );
    }
}
