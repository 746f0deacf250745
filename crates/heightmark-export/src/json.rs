//! JSON export of the metrics dictionary.
//!
//! Every metric key is always present; undefined values are `null`.

use std::collections::BTreeMap;

use heightmark_core::{MetricKey, Metrics};
use serde::Serialize;

use crate::error::ExportError;

#[derive(Serialize)]
struct MetricsDocument {
    #[serde(flatten)]
    values: BTreeMap<MetricKey, Option<f64>>,
    axis_auto_used: bool,
}

/// Serialize `metrics` as a pretty-printed JSON object.
///
/// # Errors
///
/// Returns [`ExportError::Json`] if serialization fails.
pub fn metrics_to_json(metrics: &Metrics) -> Result<String, ExportError> {
    let doc = MetricsDocument {
        values: metrics.to_map(),
        axis_auto_used: metrics.scale().auto,
    };
    Ok(serde_json::to_string_pretty(&doc)?)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use heightmark_core::{ImagePoint, PointName, PointRegistry, compute};
    use serde_json::Value;

    use super::*;

    #[test]
    fn every_key_is_present() {
        let m = compute(&PointRegistry::new(), 100.0);
        let json = metrics_to_json(&m).unwrap();
        let value: Value = serde_json::from_str(&json).unwrap();
        let obj = value.as_object().unwrap();
        assert_eq!(obj.len(), MetricKey::ALL.len() + 1);
        assert_eq!(obj["A_as_pct_of_B"], Value::Null);
        assert_eq!(obj["height_Axis_px"], Value::from(1.0));
        assert_eq!(obj["axis_auto_used"], Value::Bool(true));
    }

    #[test]
    fn defined_values_are_numbers() {
        let mut reg = PointRegistry::new();
        reg.set(PointName::Baseline, ImagePoint::new(0, 500));
        reg.set(PointName::A, ImagePoint::new(0, 300));
        reg.set(PointName::Axis, ImagePoint::new(0, 450));
        let m = compute(&reg, 100.0);
        let value: Value = serde_json::from_str(&metrics_to_json(&m).unwrap()).unwrap();
        assert_eq!(value["height_A_px"], Value::from(200.0));
        assert_eq!(value["axis_span_px"], Value::from(50.0));
        assert_eq!(value["BaseNorm_A"], Value::from(400.0));
        assert_eq!(value["height_B_px"], Value::Null);
        assert_eq!(value["axis_auto_used"], Value::Bool(false));
    }
}
