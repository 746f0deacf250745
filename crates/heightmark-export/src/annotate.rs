//! Annotated PNG export.
//!
//! Draws a dashed horizontal guide across the full image width at each
//! placed point's y coordinate, a small hollow marker at the point
//! itself, and a label beside it, then the metrics panel in the upper
//! right corner. Guides and markers use `tiny-skia` for anti-aliased
//! strokes; text uses `imageproc` with a bundled DejaVu Sans Mono face;
//! encoding uses `image`.
//!
//! Everything here is bytes in, bytes out. Reading and writing files is
//! the caller's job.

use ab_glyph::{Font, FontRef, PxScale, ScaleFont};
use heightmark_core::{ImagePoint, PointName, PointRegistry, compute};
use image::{ImageEncoder, Rgba, RgbaImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_hollow_rect_mut, draw_text_mut, text_size};
use imageproc::rect::Rect;
use serde::{Deserialize, Serialize};
use tiny_skia::{Paint, PathBuilder, Pixmap, Stroke, StrokeDash, Transform};

use crate::error::ExportError;
use crate::overlay::{overlay_lines, point_label};

const FONT_BYTES: &[u8] = include_bytes!("../assets/DejaVuSansMono.ttf");

/// Label offset from its point: right of the marker, above the guide.
const LABEL_OFFSET: (i32, i32) = (8, -10);

/// Distance from the panel text to the image's top and right edges.
const PANEL_MARGIN: i32 = 10;
/// Padding between the panel text and its border.
const PANEL_PAD: i32 = 8;

const PANEL_FILL: Rgba<u8> = Rgba([0x11, 0x11, 0x11, 0xFF]);
const PANEL_BORDER: Rgba<u8> = Rgba([0x66, 0x66, 0x66, 0xFF]);
const PANEL_TEXT: Rgba<u8> = Rgba([0xEA, 0xF2, 0xF8, 0xFF]);

/// Per-point guide colors as RGB triples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Palette {
    /// Baseline guide, grey.
    pub baseline: [u8; 3],
    /// Control bar top, green.
    pub control: [u8; 3],
    /// Marker A top, red.
    pub a: [u8; 3],
    /// Marker B top, blue.
    pub b: [u8; 3],
    /// Axis calibration tick, amber.
    pub axis: [u8; 3],
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            baseline: [0xA0, 0xA0, 0xA0],
            control: [0x00, 0xC8, 0x53],
            a: [0xFF, 0x52, 0x52],
            b: [0x29, 0x79, 0xFF],
            axis: [0xFF, 0xD6, 0x00],
        }
    }
}

impl Palette {
    /// Color assigned to `name`.
    #[must_use]
    pub const fn color(&self, name: PointName) -> [u8; 3] {
        match name {
            PointName::Baseline => self.baseline,
            PointName::Control => self.control,
            PointName::A => self.a,
            PointName::B => self.b,
            PointName::Axis => self.axis,
        }
    }
}

/// Stroke geometry, text, and colors for annotations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderStyle {
    /// Guide and marker stroke width in pixels.
    pub line_width: f32,
    /// Dash pattern `[on, off]` in pixels.
    pub dash: [f32; 2],
    /// Radius of the point marker in pixels.
    pub dot_radius: f32,
    /// Label and panel text height in pixels.
    pub text_size: f32,
    /// Draw a label beside each placed point.
    pub labels: bool,
    /// Draw the metrics panel in the upper right corner.
    pub panel: bool,
    /// Per-point colors.
    pub palette: Palette,
}

impl Default for RenderStyle {
    fn default() -> Self {
        Self {
            line_width: 2.0,
            dash: [6.0, 4.0],
            dot_radius: 4.0,
            text_size: 13.0,
            labels: true,
            panel: true,
            palette: Palette::default(),
        }
    }
}

/// Decode image bytes (PNG, JPEG, BMP, WebP) into RGBA.
///
/// # Errors
///
/// Returns [`ExportError::EmptyCanvas`] for empty input and
/// [`ExportError::Encode`] if the bytes cannot be decoded.
pub fn decode_image(bytes: &[u8]) -> Result<RgbaImage, ExportError> {
    if bytes.is_empty() {
        return Err(ExportError::EmptyCanvas);
    }
    Ok(image::load_from_memory(bytes)?.to_rgba8())
}

/// Encode an RGBA image as PNG bytes.
///
/// # Errors
///
/// Returns [`ExportError::Encode`] if PNG encoding fails.
pub fn encode_png(image: &RgbaImage) -> Result<Vec<u8>, ExportError> {
    let mut png_bytes = Vec::new();
    let encoder = image::codecs::png::PngEncoder::new(&mut png_bytes);
    encoder.write_image(
        image.as_raw(),
        image.width(),
        image.height(),
        image::ExtendedColorType::Rgba8,
    )?;
    Ok(png_bytes)
}

/// Pixel-centre coordinate for an integer image position.
#[allow(clippy::cast_precision_loss)]
fn centre(v: i32) -> f32 {
    v as f32 + 0.5
}

/// Stroke one point's guide and marker into `pixmap`.
#[allow(clippy::cast_precision_loss)]
fn draw_point(pixmap: &mut Pixmap, xy: ImagePoint, color: [u8; 3], style: &RenderStyle) {
    let mut paint = Paint::default();
    paint.set_color_rgba8(color[0], color[1], color[2], 255);
    paint.anti_alias = true;

    let y = centre(xy.y);
    let mut pb = PathBuilder::new();
    pb.move_to(0.0, y);
    pb.line_to(pixmap.width() as f32, y);
    if let Some(guide) = pb.finish() {
        let stroke = Stroke {
            width: style.line_width,
            dash: StrokeDash::new(style.dash.to_vec(), 0.0),
            ..Stroke::default()
        };
        pixmap.stroke_path(&guide, &paint, &stroke, Transform::identity(), None);
    }

    if let Some(dot) = PathBuilder::from_circle(centre(xy.x), y, style.dot_radius) {
        let stroke = Stroke {
            width: style.line_width,
            ..Stroke::default()
        };
        pixmap.stroke_path(&dot, &paint, &stroke, Transform::identity(), None);
    }
}

fn load_font() -> Result<FontRef<'static>, ExportError> {
    Ok(FontRef::try_from_slice(FONT_BYTES)?)
}

fn to_i32(v: u32) -> i32 {
    i32::try_from(v).unwrap_or(i32::MAX)
}

/// Distance between successive panel text baselines.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn line_height(font: &FontRef<'_>, scale: PxScale) -> u32 {
    let scaled = font.as_scaled(scale);
    (scaled.height() + scaled.line_gap()).ceil().max(1.0) as u32
}

/// Draw `text` left-anchored and vertically centred on the label
/// position of `xy`.
fn draw_label(
    image: &mut RgbaImage,
    font: &FontRef<'_>,
    scale: PxScale,
    xy: ImagePoint,
    text: &str,
    color: [u8; 3],
) {
    let (_, height) = text_size(scale, font, text);
    let x = xy.x.saturating_add(LABEL_OFFSET.0);
    let y = xy
        .y
        .saturating_add(LABEL_OFFSET.1)
        .saturating_sub(to_i32(height / 2));
    let color = Rgba([color[0], color[1], color[2], 0xFF]);
    draw_text_mut(image, color, x, y, scale, font, text);
}

/// Draw `lines` on a bordered dark panel whose text block is anchored
/// to the upper right corner. Panels wider than the image are clipped
/// on the left.
fn draw_panel(image: &mut RgbaImage, font: &FontRef<'_>, scale: PxScale, lines: &[String]) {
    let line_height = line_height(font, scale);
    let text_width = lines
        .iter()
        .map(|line| text_size(scale, font, line).0)
        .max()
        .unwrap_or(0);
    let text_height = line_height.saturating_mul(u32::try_from(lines.len()).unwrap_or(u32::MAX));

    let left = to_i32(image.width()) - PANEL_MARGIN - to_i32(text_width);
    let pad = PANEL_PAD.unsigned_abs();
    let rect = Rect::at(left - PANEL_PAD, PANEL_MARGIN - PANEL_PAD)
        .of_size(text_width + 2 * pad, text_height + 2 * pad);
    draw_filled_rect_mut(image, rect, PANEL_FILL);
    draw_hollow_rect_mut(image, rect, PANEL_BORDER);

    let mut y = PANEL_MARGIN;
    for line in lines {
        draw_text_mut(image, PANEL_TEXT, left, y, scale, font, line);
        y = y.saturating_add(to_i32(line_height));
    }
}

/// Draw guides, markers, labels, and the metrics panel for every placed
/// point over `source`.
///
/// `axis_value` is the calibration value shown in the Axis label and
/// used for the panel's metrics. The output has the same dimensions as
/// `source`. Anything falling outside the image is clipped.
///
/// # Errors
///
/// Returns [`ExportError::EmptyCanvas`] if `source` has a zero dimension
/// and [`ExportError::Font`] if the bundled font cannot be parsed.
pub fn render_annotated(
    source: &RgbaImage,
    registry: &PointRegistry,
    axis_value: f64,
    style: &RenderStyle,
) -> Result<RgbaImage, ExportError> {
    let (width, height) = source.dimensions();
    let mut pixmap = Pixmap::new(width, height).ok_or(ExportError::EmptyCanvas)?;

    for (name, xy) in registry.placed() {
        draw_point(&mut pixmap, xy, style.palette.color(name), style);
    }

    // tiny-skia stores premultiplied RGBA; `image` blends straight RGBA.
    let mut layer = RgbaImage::new(width, height);
    for (pixel, src) in layer.pixels_mut().zip(pixmap.pixels()) {
        let c = src.demultiply();
        *pixel = Rgba([c.red(), c.green(), c.blue(), c.alpha()]);
    }

    let mut output = source.clone();
    image::imageops::overlay(&mut output, &layer, 0, 0);

    if !style.labels && !style.panel {
        return Ok(output);
    }

    let font = load_font()?;
    let scale = PxScale::from(style.text_size);

    if style.labels {
        for (name, xy) in registry.placed() {
            let text = point_label(name, xy, axis_value);
            draw_label(&mut output, &font, scale, xy, &text, style.palette.color(name));
        }
    }

    if style.panel {
        let lines = overlay_lines(&compute(registry, axis_value));
        draw_panel(&mut output, &font, scale, &lines);
    }

    Ok(output)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);

    fn white(width: u32, height: u32) -> RgbaImage {
        RgbaImage::from_pixel(width, height, WHITE)
    }

    fn guides_only() -> RenderStyle {
        RenderStyle {
            labels: false,
            panel: false,
            ..RenderStyle::default()
        }
    }

    fn render(src: &RgbaImage, reg: &PointRegistry, style: &RenderStyle) -> RgbaImage {
        render_annotated(src, reg, 100.0, style).unwrap()
    }

    #[test]
    fn no_points_leaves_image_unchanged() {
        let src = white(20, 10);
        let out = render(&src, &PointRegistry::new(), &guides_only());
        assert_eq!(out, src);
    }

    #[test]
    fn guide_is_drawn_on_point_row() {
        let src = white(40, 30);
        let mut reg = PointRegistry::new();
        reg.set(PointName::A, ImagePoint::new(30, 15));
        let out = render(&src, &reg, &guides_only());
        assert_eq!(out.dimensions(), (40, 30));

        // First dash covers x in [0, 6).
        let px = out.get_pixel(2, 15);
        assert_ne!(*px, WHITE);
        assert!(px[0] > px[2], "A guide should be red-dominant, got {px:?}");

        // Rows far from the guide are untouched.
        assert_eq!(*out.get_pixel(2, 2), WHITE);
    }

    #[test]
    fn dash_gaps_are_left_clear() {
        let src = white(40, 30);
        let mut reg = PointRegistry::new();
        reg.set(PointName::Baseline, ImagePoint::new(0, 20));
        let out = render(&src, &reg, &guides_only());
        // Gap after the first dash spans x in [6, 10).
        assert_eq!(*out.get_pixel(8, 20), WHITE);
    }

    #[test]
    fn points_outside_image_are_clipped() {
        let src = white(10, 10);
        let mut reg = PointRegistry::new();
        reg.set(PointName::B, ImagePoint::new(-50, 500));
        let out = render(&src, &reg, &RenderStyle {
            panel: false,
            ..RenderStyle::default()
        });
        assert_eq!(out, src);
    }

    #[test]
    fn label_is_drawn_above_and_right_of_point() {
        let src = white(200, 100);
        let mut reg = PointRegistry::new();
        reg.set(PointName::A, ImagePoint::new(20, 60));
        let style = RenderStyle {
            panel: false,
            ..RenderStyle::default()
        };
        let out = render(&src, &reg, &style);

        // The label sits around y = 50; the guide occupies rows 59..=61.
        let label_pixels: Vec<Rgba<u8>> = (28..150)
            .flat_map(|x| (40..56).map(move |y| (x, y)))
            .map(|(x, y)| *out.get_pixel(x, y))
            .filter(|px| *px != WHITE)
            .collect();
        assert!(!label_pixels.is_empty(), "no label text drawn");
        assert!(
            label_pixels.iter().any(|px| px[0] > px[2]),
            "label should use the A color"
        );

        // Left of the marker nothing but the guide is drawn.
        assert_eq!(*out.get_pixel(2, 45), WHITE);
    }

    #[test]
    fn panel_is_drawn_in_upper_right_corner() {
        let src = white(800, 450);
        let out = render(&src, &PointRegistry::new(), &RenderStyle::default());

        // The border sits 2 px in from the right edge; between it and
        // the first text line is plain fill.
        assert_eq!(*out.get_pixel(788, 5), PANEL_FILL);
        assert_eq!(*out.get_pixel(795, 5), WHITE);
        // The far left of a wide image stays clear.
        assert_eq!(*out.get_pixel(5, 5), WHITE);
        // Panel text is light on dark.
        let has_text = (0..800)
            .flat_map(|x| (10..30).map(move |y| (x, y)))
            .map(|(x, y)| *out.get_pixel(x, y))
            .any(|px| px != WHITE && px[0] > 0x80);
        assert!(has_text, "no panel text drawn");
    }

    #[test]
    fn panel_wider_than_image_is_clipped() {
        let src = white(60, 40);
        let out = render(&src, &PointRegistry::new(), &RenderStyle::default());
        assert_eq!(out.dimensions(), (60, 40));
        assert_ne!(*out.get_pixel(30, 20), WHITE);
    }

    #[test]
    fn bundled_font_parses() {
        assert!(load_font().is_ok());
    }

    #[test]
    fn empty_source_is_rejected() {
        let src = RgbaImage::new(0, 5);
        let err = render_annotated(&src, &PointRegistry::new(), 100.0, &RenderStyle::default());
        assert!(matches!(err, Err(ExportError::EmptyCanvas)));
    }

    #[test]
    fn palette_defaults() {
        let palette = Palette::default();
        assert_eq!(palette.color(PointName::Baseline), [0xA0, 0xA0, 0xA0]);
        assert_eq!(palette.color(PointName::Axis), [0xFF, 0xD6, 0x00]);
    }

    #[test]
    fn png_encode_then_decode_preserves_pixels() {
        let img = RgbaImage::from_fn(3, 2, |x, y| {
            let v = u8::try_from(x * 40 + y * 7).unwrap();
            Rgba([v, 255 - v, 9, 255])
        });
        let png = encode_png(&img).unwrap();
        assert_eq!(&png[1..4], b"PNG");
        assert_eq!(decode_image(&png).unwrap(), img);
    }

    #[test]
    fn decode_rejects_empty_and_corrupt_input() {
        assert!(matches!(decode_image(&[]), Err(ExportError::EmptyCanvas)));
        assert!(matches!(
            decode_image(&[0xFF, 0x00, 0x12]),
            Err(ExportError::Encode(_))
        ));
    }
}
