//! Metrics engine: heights, calibration scale, and pairwise comparisons.
//!
//! [`compute`] is a pure function of the registry contents and the
//! calibration value. Every derived quantity is an `Option<f64>`; a value
//! that cannot be computed from the current placements (missing point,
//! zero divisor) is `None` rather than an error, a sentinel, or a
//! non-finite float.
//!
//! # Scale selection
//!
//! Calibrated ("baseline-normalized") values divide a height by a scale
//! divisor and multiply by the calibration value. The divisor is:
//!
//! 1. the Axis span (`Baseline.y - Axis.y`) when both points are placed
//!    and the span is nonzero;
//! 2. otherwise the largest absolute height among Control, A and B;
//! 3. otherwise `1.0`.
//!
//! Cases 2 and 3 set [`Scale::auto`] so the display can flag that the
//! scale came from the data rather than a placed tick.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::registry::PointRegistry;
use crate::types::PointName;

/// Divisor used when no Axis span and no nonzero height is available.
pub const FALLBACK_DIVISOR: f64 = 1.0;

/// A measured point whose height is compared against the others.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Subject {
    /// The Control point.
    Control,
    /// Marker A.
    A,
    /// Marker B.
    B,
}

impl Subject {
    /// All subjects in display order.
    pub const ALL: [Self; 3] = [Self::Control, Self::A, Self::B];

    /// The registry point this subject reads.
    #[must_use]
    pub const fn point(self) -> PointName {
        match self {
            Self::Control => PointName::Control,
            Self::A => PointName::A,
            Self::B => PointName::B,
        }
    }

    /// Canonical name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        self.point().as_str()
    }

    const fn index(self) -> usize {
        match self {
            Self::Control => 0,
            Self::A => 1,
            Self::B => 2,
        }
    }
}

/// Ordered `(X, Y)` pairs for which directional comparisons are computed,
/// grouped by unordered pair: {A, B}, {A, Control}, {B, Control}.
pub const ORDERED_PAIRS: [(Subject, Subject); 6] = [
    (Subject::A, Subject::B),
    (Subject::B, Subject::A),
    (Subject::A, Subject::Control),
    (Subject::Control, Subject::A),
    (Subject::B, Subject::Control),
    (Subject::Control, Subject::B),
];

/// The divisor applied to heights for calibrated values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Scale {
    /// Pixel divisor. Never zero.
    pub divisor: f64,
    /// `true` when the divisor did not come from a placed Axis tick.
    pub auto: bool,
}

/// Directional comparison of subject X against subject Y.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Comparison {
    /// `100 * h(X) / h(Y)`.
    pub as_pct: Option<f64>,
    /// `100 * (h(X) - h(Y)) / h(Y)`. Positive means X is higher.
    pub delta_pct: Option<f64>,
}

/// Every named scalar in a [`Metrics`] result.
///
/// Serialized names match the keys consumers of the metrics dictionary
/// expect (`height_A_px`, `A_as_pct_of_B`, `BaseNorm_A`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum MetricKey {
    #[serde(rename = "height_Baseline_y")]
    BaselineY,
    #[serde(rename = "height_Control_px")]
    HeightControl,
    #[serde(rename = "height_A_px")]
    HeightA,
    #[serde(rename = "height_B_px")]
    HeightB,
    /// Raw Baseline-to-Axis span; `None` when unplaced or zero.
    #[serde(rename = "axis_span_px")]
    AxisSpan,
    /// Divisor actually used for calibrated values (span or fallback).
    #[serde(rename = "height_Axis_px")]
    ScaleDivisor,
    #[serde(rename = "A_as_pct_of_B")]
    AAsPctOfB,
    #[serde(rename = "B_as_pct_of_A")]
    BAsPctOfA,
    #[serde(rename = "delta_A_vs_B_pct")]
    DeltaAVsB,
    #[serde(rename = "delta_B_vs_A_pct")]
    DeltaBVsA,
    #[serde(rename = "A_as_pct_of_Control")]
    AAsPctOfControl,
    #[serde(rename = "Control_as_pct_of_A")]
    ControlAsPctOfA,
    #[serde(rename = "delta_A_vs_Control_pct")]
    DeltaAVsControl,
    #[serde(rename = "delta_Control_vs_A_pct")]
    DeltaControlVsA,
    #[serde(rename = "B_as_pct_of_Control")]
    BAsPctOfControl,
    #[serde(rename = "Control_as_pct_of_B")]
    ControlAsPctOfB,
    #[serde(rename = "delta_B_vs_Control_pct")]
    DeltaBVsControl,
    #[serde(rename = "delta_Control_vs_B_pct")]
    DeltaControlVsB,
    #[serde(rename = "BaseNorm_Control")]
    BaseNormControl,
    #[serde(rename = "BaseNorm_A")]
    BaseNormA,
    #[serde(rename = "BaseNorm_B")]
    BaseNormB,
    #[serde(rename = "Axis_Value")]
    AxisValue,
}

impl MetricKey {
    /// Every key, in dictionary order.
    pub const ALL: [Self; 22] = [
        Self::BaselineY,
        Self::HeightControl,
        Self::HeightA,
        Self::HeightB,
        Self::AxisSpan,
        Self::ScaleDivisor,
        Self::AAsPctOfB,
        Self::BAsPctOfA,
        Self::DeltaAVsB,
        Self::DeltaBVsA,
        Self::AAsPctOfControl,
        Self::ControlAsPctOfA,
        Self::DeltaAVsControl,
        Self::DeltaControlVsA,
        Self::BAsPctOfControl,
        Self::ControlAsPctOfB,
        Self::DeltaBVsControl,
        Self::DeltaControlVsB,
        Self::BaseNormControl,
        Self::BaseNormA,
        Self::BaseNormB,
        Self::AxisValue,
    ];

    /// Key for the height of `subject`.
    #[must_use]
    pub const fn height(subject: Subject) -> Self {
        match subject {
            Subject::Control => Self::HeightControl,
            Subject::A => Self::HeightA,
            Subject::B => Self::HeightB,
        }
    }

    /// Key for the calibrated value of `subject`.
    #[must_use]
    pub const fn base_norm(subject: Subject) -> Self {
        match subject {
            Subject::Control => Self::BaseNormControl,
            Subject::A => Self::BaseNormA,
            Subject::B => Self::BaseNormB,
        }
    }

    /// Keys for `X_as_pct_of_Y` and `delta_X_vs_Y_pct`, or `None` when
    /// `x == y`.
    #[must_use]
    pub const fn comparison(x: Subject, y: Subject) -> Option<(Self, Self)> {
        match (x, y) {
            (Subject::A, Subject::B) => Some((Self::AAsPctOfB, Self::DeltaAVsB)),
            (Subject::B, Subject::A) => Some((Self::BAsPctOfA, Self::DeltaBVsA)),
            (Subject::A, Subject::Control) => Some((Self::AAsPctOfControl, Self::DeltaAVsControl)),
            (Subject::Control, Subject::A) => Some((Self::ControlAsPctOfA, Self::DeltaControlVsA)),
            (Subject::B, Subject::Control) => Some((Self::BAsPctOfControl, Self::DeltaBVsControl)),
            (Subject::Control, Subject::B) => Some((Self::ControlAsPctOfB, Self::DeltaControlVsB)),
            _ => None,
        }
    }
}

/// Result of [`compute`]: every derived measurement for one registry state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    baseline_y: Option<f64>,
    heights: [Option<f64>; 3],
    axis_span: Option<f64>,
    scale: Scale,
    base_norm: [Option<f64>; 3],
    comparisons: [Comparison; 6],
    axis_value: f64,
}

impl Metrics {
    /// Baseline y coordinate, if placed.
    #[must_use]
    pub const fn baseline_y(&self) -> Option<f64> {
        self.baseline_y
    }

    /// Height of `subject` above Baseline, in pixels.
    #[must_use]
    pub const fn height(&self, subject: Subject) -> Option<f64> {
        self.heights[subject.index()]
    }

    /// Baseline-to-Axis span in pixels; `None` when either point is
    /// missing or the span is exactly zero.
    #[must_use]
    pub const fn axis_span(&self) -> Option<f64> {
        self.axis_span
    }

    /// The divisor used for calibrated values and whether it was automatic.
    #[must_use]
    pub const fn scale(&self) -> Scale {
        self.scale
    }

    /// `height / divisor * axis_value` for `subject`.
    #[must_use]
    pub const fn base_norm(&self, subject: Subject) -> Option<f64> {
        self.base_norm[subject.index()]
    }

    /// The calibration value this result was computed with.
    #[must_use]
    pub const fn axis_value(&self) -> f64 {
        self.axis_value
    }

    /// Directional comparison of `x` against `y`.
    ///
    /// Comparing a subject with itself yields an empty comparison.
    #[must_use]
    pub fn comparison(&self, x: Subject, y: Subject) -> Comparison {
        ORDERED_PAIRS
            .iter()
            .position(|&pair| pair == (x, y))
            .map(|i| self.comparisons[i])
            .unwrap_or_default()
    }

    /// Look up a single named metric.
    #[must_use]
    pub fn get(&self, key: MetricKey) -> Option<f64> {
        match key {
            MetricKey::BaselineY => self.baseline_y,
            MetricKey::AxisSpan => self.axis_span,
            MetricKey::ScaleDivisor => Some(self.scale.divisor),
            MetricKey::AxisValue => Some(self.axis_value),
            _ => Subject::ALL
                .into_iter()
                .find_map(|s| {
                    if key == MetricKey::height(s) {
                        Some(self.height(s))
                    } else if key == MetricKey::base_norm(s) {
                        Some(self.base_norm(s))
                    } else {
                        None
                    }
                })
                .or_else(|| {
                    ORDERED_PAIRS.iter().find_map(|&(x, y)| {
                        let (pct_key, delta_key) = MetricKey::comparison(x, y)?;
                        let c = self.comparison(x, y);
                        if key == pct_key {
                            Some(c.as_pct)
                        } else if key == delta_key {
                            Some(c.delta_pct)
                        } else {
                            None
                        }
                    })
                })
                .flatten(),
        }
    }

    /// The full metrics dictionary.
    #[must_use]
    pub fn to_map(&self) -> BTreeMap<MetricKey, Option<f64>> {
        MetricKey::ALL
            .into_iter()
            .map(|key| (key, self.get(key)))
            .collect()
    }
}

/// `100 * numerator / denominator`, or `None` if either operand is
/// missing, the denominator is zero, or the result is not finite.
#[must_use]
pub fn percent(numerator: Option<f64>, denominator: Option<f64>) -> Option<f64> {
    let (n, d) = (numerator?, denominator?);
    if d == 0.0 {
        return None;
    }
    finite(100.0 * n / d)
}

fn finite(value: f64) -> Option<f64> {
    value.is_finite().then_some(value)
}

/// Choose the calibration divisor from the Axis span and the heights.
fn select_scale(axis_span: Option<f64>, heights: &[Option<f64>; 3]) -> Scale {
    if let Some(span) = axis_span {
        return Scale {
            divisor: span,
            auto: false,
        };
    }
    let largest = heights.iter().flatten().map(|h| h.abs()).reduce(f64::max);
    let divisor = match largest {
        Some(h) if h != 0.0 => h,
        _ => FALLBACK_DIVISOR,
    };
    Scale {
        divisor,
        auto: true,
    }
}

/// Compute every metric for the current placements.
///
/// Pure and deterministic: identical inputs give bit-identical results.
#[must_use]
pub fn compute(registry: &PointRegistry, axis_value: f64) -> Metrics {
    let baseline_y = registry.get(PointName::Baseline).map(|p| f64::from(p.y));

    let height_of = |name: PointName| -> Option<f64> {
        let base = baseline_y?;
        let top = registry.get(name)?;
        Some(base - f64::from(top.y))
    };

    let heights = Subject::ALL.map(|s| height_of(s.point()));
    let axis_span = height_of(PointName::Axis).filter(|&span| span != 0.0);
    let scale = select_scale(axis_span, &heights);

    let base_norm = heights.map(|h| finite(h? / scale.divisor * axis_value));

    let comparisons = ORDERED_PAIRS.map(|(x, y)| {
        let hx = heights[x.index()];
        let hy = heights[y.index()];
        let diff = hx.zip(hy).map(|(a, b)| a - b);
        Comparison {
            as_pct: percent(hx, hy),
            delta_pct: percent(diff, hy),
        }
    });

    Metrics {
        baseline_y,
        heights,
        axis_span,
        scale,
        base_norm,
        comparisons,
        axis_value,
    }
}
