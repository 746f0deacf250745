//! Integration test: annotate a synthetic bar chart end to end and export
//! the overlay, the metrics JSON, and an annotated PNG.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]

use heightmark_core::{Dimensions, ImagePoint, PointName, Region, Session, Subject};
use image::{Rgba, RgbaImage};

/// White canvas with three black bars standing on a baseline at y=180.
///
/// Bar tops: Control at y=130, A at y=80, B at y=105.
fn bar_chart_png() -> Vec<u8> {
    let bars = [(20..40, 130), (60..80, 80), (100..120, 105)];
    let img = RgbaImage::from_fn(140, 200, |x, y| {
        let in_bar = bars
            .iter()
            .any(|(xs, top)| xs.contains(&x) && y >= *top && y < 180);
        if in_bar || y == 180 {
            Rgba([0, 0, 0, 255])
        } else {
            Rgba([255, 255, 255, 255])
        }
    });
    heightmark_export::encode_png(&img).unwrap()
}

#[test]
fn bar_chart_annotation_round_trip() {
    let png = bar_chart_png();
    let source = heightmark_export::decode_image(&png).expect("synthetic PNG should decode");
    let (width, height) = source.dimensions();

    let mut session = Session::new();
    session.load_frame(Dimensions { width, height });

    for (name, xy) in [
        (PointName::Baseline, ImagePoint::new(5, 180)),
        (PointName::Control, ImagePoint::new(30, 130)),
        (PointName::A, ImagePoint::new(70, 80)),
        (PointName::B, ImagePoint::new(110, 105)),
    ] {
        session.begin_placement(name);
        assert_eq!(session.click(xy).unwrap(), name);
    }

    let metrics = session.metrics();
    assert_eq!(metrics.height(Subject::Control), Some(50.0));
    assert_eq!(metrics.height(Subject::A), Some(100.0));
    assert_eq!(metrics.height(Subject::B), Some(75.0));
    assert!(metrics.scale().auto);

    let overlay = heightmark_export::to_overlay_text(&metrics);
    assert!(overlay.contains("  A vs Baseline: 100.00"));
    assert!(overlay.contains("  Control vs Baseline: 50.00"));
    assert!(overlay.contains("(auto)"));
    eprintln!("{overlay}");

    // Calibrate: the top of A is the 100% tick.
    session.begin_axis_placement(100.0).unwrap();
    session.click(ImagePoint::new(130, 80)).unwrap();
    let metrics = session.metrics();
    assert_eq!(metrics.axis_span(), Some(100.0));
    assert!(!metrics.scale().auto);
    assert_eq!(
        heightmark_export::title_summary(&metrics),
        "A 100.0 | B 75.0 | Control 50.0"
    );

    let json = heightmark_export::metrics_to_json(&metrics).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["BaseNorm_B"], serde_json::Value::from(75.0));

    let guides_only = heightmark_export::RenderStyle {
        labels: false,
        panel: false,
        ..heightmark_export::RenderStyle::default()
    };
    let guides =
        heightmark_export::render_annotated(&source, session.registry(), 100.0, &guides_only)
            .unwrap();
    // The Axis guide crosses white background left of the bars.
    assert_ne!(guides.get_pixel(2, 80), source.get_pixel(2, 80));

    let annotated = heightmark_export::render_annotated(
        &source,
        session.registry(),
        session.axis_value(),
        &heightmark_export::RenderStyle::default(),
    )
    .unwrap();
    assert_eq!(annotated.dimensions(), (width, height));
    // The metrics panel covers the top of this narrow chart.
    assert_ne!(annotated.get_pixel(70, 20), source.get_pixel(70, 20));
    assert_ne!(annotated, guides);

    let out_png = heightmark_export::encode_png(&annotated).unwrap();
    let reloaded = heightmark_export::decode_image(&out_png).unwrap();
    assert_eq!(reloaded, annotated);

    // Cropping invalidates every placement.
    session
        .crop(Region {
            x: 0,
            y: 50,
            width: 140,
            height: 140,
        })
        .unwrap();
    assert!(session.registry().is_empty());
    assert_eq!(session.metrics().height(Subject::A), None);

    // Resetting undoes the crop.
    assert_eq!(
        session.reset_to_full_frame().unwrap(),
        Dimensions { width, height }
    );
    assert!(session.registry().is_empty());
}
