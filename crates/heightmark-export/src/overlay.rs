//! Overlay text: the metrics panel shown next to an annotated image.
//!
//! Defined values are printed with two decimals and undefined ones as
//! `NA`, so the panel can be shown from the first click onwards and
//! fills in as more points are placed.

use heightmark_core::{ImagePoint, Metrics, PointName, Subject};

/// Window title used when no calibrated value is available.
pub const APP_TITLE: &str = "Baseline + Control + A + B Annotator";

/// Placeholder printed for an undefined value.
pub const NOT_AVAILABLE: &str = "NA";

/// Unordered pairs shown as comparison sections, in panel order.
const SECTIONS: [(Subject, Subject); 3] = [
    (Subject::A, Subject::B),
    (Subject::A, Subject::Control),
    (Subject::B, Subject::Control),
];

/// Format a metric value for display: `NA` or two decimals.
#[must_use]
pub fn format_value(value: Option<f64>) -> String {
    value.map_or_else(|| NOT_AVAILABLE.to_string(), |v| format!("{v:.2}"))
}

/// Format a number with six significant digits and no trailing zeros,
/// switching to exponent notation for very large or small magnitudes
/// (`100`, `12.5`, `0.3`, `1e+09`, `1.5e-05`).
#[must_use]
pub fn format_general(value: f64) -> String {
    if !value.is_finite() {
        return if value.is_nan() {
            "nan".to_string()
        } else if value < 0.0 {
            "-inf".to_string()
        } else {
            "inf".to_string()
        };
    }
    if value == 0.0 {
        return if value.is_sign_negative() { "-0" } else { "0" }.to_string();
    }

    // Rounding to the target precision can carry into the next power of
    // ten, so the exponent is read back from the rounded form.
    let scientific = format!("{value:.5e}");
    let Some((mantissa, exponent)) = scientific.split_once('e') else {
        return scientific;
    };
    let exponent: i32 = exponent.parse().unwrap_or(0);

    if (-4..6).contains(&exponent) {
        let decimals = usize::try_from(5 - exponent).unwrap_or(0);
        trim_fraction(&format!("{value:.decimals$}")).to_string()
    } else {
        let sign = if exponent < 0 { '-' } else { '+' };
        format!("{}e{sign}{:02}", trim_fraction(mantissa), exponent.abs())
    }
}

/// Drop trailing zeros after a decimal point, and the point itself.
fn trim_fraction(s: &str) -> &str {
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.')
    } else {
        s
    }
}

/// Build the overlay panel, one entry per line.
#[must_use]
pub fn overlay_lines(metrics: &Metrics) -> Vec<String> {
    let scale = metrics.scale();
    let auto_note = if scale.auto { " (auto)" } else { "" };

    let mut lines = vec!["Heights (pixels) relative to Baseline:".to_string()];
    for subject in Subject::ALL {
        lines.push(format!(
            "  {} height: {} px",
            subject.as_str(),
            format_value(metrics.height(subject)),
        ));
    }
    lines.push(format!(
        "  Axis span (Baseline->Tick){auto_note}: {} px",
        format_value(Some(scale.divisor)),
    ));

    lines.push("Baseline-normalized percentages:".to_string());
    for subject in Subject::ALL {
        lines.push(format!(
            "  {} vs Baseline: {}",
            subject.as_str(),
            format_value(metrics.base_norm(subject)),
        ));
    }
    lines.push(format!(
        "  Axis tick value: {}",
        format_value(Some(metrics.axis_value())),
    ));

    for (x, y) in SECTIONS {
        let (xs, ys) = (x.as_str(), y.as_str());
        let forward = metrics.comparison(x, y);
        let backward = metrics.comparison(y, x);
        lines.push(format!("{xs} <-> {ys} comparisons:"));
        lines.push(format!(
            "  {xs} as percent of {ys}: {} %",
            format_value(forward.as_pct)
        ));
        lines.push(format!(
            "  {ys} as percent of {xs}: {} %",
            format_value(backward.as_pct)
        ));
        lines.push(format!(
            "  {xs} vs {ys}: {} %   (positive means {xs} is higher than {ys})",
            format_value(forward.delta_pct)
        ));
        lines.push(format!(
            "  {ys} vs {xs}: {} %   (positive means {ys} is higher than {xs})",
            format_value(backward.delta_pct)
        ));
    }

    lines
}

/// The overlay panel as a single newline-separated string.
#[must_use]
pub fn to_overlay_text(metrics: &Metrics) -> String {
    overlay_lines(metrics).join("\n")
}

/// Short summary of the calibrated values, e.g. `A 100.0 | B 75.0`.
///
/// Falls back to [`APP_TITLE`] when none are defined.
#[must_use]
pub fn title_summary(metrics: &Metrics) -> String {
    let bits: Vec<String> = [Subject::A, Subject::B, Subject::Control]
        .into_iter()
        .filter_map(|s| {
            metrics
                .base_norm(s)
                .map(|v| format!("{} {v:.1}", s.as_str()))
        })
        .collect();
    if bits.is_empty() {
        APP_TITLE.to_string()
    } else {
        bits.join(" | ")
    }
}

/// Label drawn next to a placed point, e.g. `A (12, 300)`.
///
/// The Axis label includes the calibration value, formatted with
/// [`format_general`]: `Axis 100 (5, 40)`.
#[must_use]
pub fn point_label(name: PointName, xy: ImagePoint, axis_value: f64) -> String {
    match name {
        PointName::Axis => format!("Axis {} {xy}", format_general(axis_value)),
        _ => format!("{name} {xy}"),
    }
}
