//! heightmark-export: Pure output serializers (sans-IO)
//!
//! Turns metrics and placements into things a person can look at:
//! overlay text, a JSON metrics dictionary, and an annotated PNG.

pub mod annotate;
pub mod error;
pub mod json;
pub mod overlay;

pub use annotate::{Palette, RenderStyle, decode_image, encode_png, render_annotated};
pub use error::ExportError;
pub use json::metrics_to_json;
pub use overlay::{format_general, format_value, overlay_lines, point_label, title_summary, to_overlay_text};
