//! Serializable annotation configuration.
//!
//! An [`AnnotationConfig`] captures everything the metrics engine needs
//! (placed points and the calibration value) in a form that round-trips
//! through JSON, so a set of placements can be saved and re-applied.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::registry::PointRegistry;
use crate::types::{AnnotateError, DEFAULT_AXIS_VALUE, ImagePoint, PointName, validate_axis_value};

/// Point placements plus the calibration value.
///
/// Missing fields take their defaults when deserializing, so `{}` is a
/// valid (empty) configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnnotationConfig {
    /// Value represented by the Axis tick.
    pub axis_value: f64,

    /// Placed points keyed by name. Unknown names fail deserialization.
    pub points: BTreeMap<PointName, ImagePoint>,
}

impl Default for AnnotationConfig {
    fn default() -> Self {
        Self {
            axis_value: DEFAULT_AXIS_VALUE,
            points: BTreeMap::new(),
        }
    }
}

impl AnnotationConfig {
    /// Check the calibration value range.
    ///
    /// # Errors
    ///
    /// Returns [`AnnotateError::AxisValueOutOfRange`] when `axis_value` is
    /// not finite or exceeds +/-1e9.
    pub fn validate(&self) -> Result<(), AnnotateError> {
        validate_axis_value(self.axis_value).map(|_| ())
    }

    /// Build a registry holding exactly the configured points.
    #[must_use]
    pub fn to_registry(&self) -> PointRegistry {
        let mut registry = PointRegistry::new();
        for (&name, &xy) in &self.points {
            registry.set(name, xy);
        }
        registry
    }

    /// Capture the placements of `registry`.
    #[must_use]
    pub fn from_registry(registry: &PointRegistry, axis_value: f64) -> Self {
        Self {
            axis_value,
            points: registry.placed().collect(),
        }
    }
}
