//! Errors raised by the export serializers.

/// Errors that can occur while decoding, rendering, or encoding output.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    /// Image decoding or PNG encoding failed.
    #[error("image codec error: {0}")]
    Encode(#[from] image::ImageError),

    /// JSON serialization failed.
    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    /// The bundled label font could not be parsed.
    #[error("failed to load font: {0}")]
    Font(#[from] ab_glyph::InvalidFont),

    /// The input image has no pixels (empty bytes or a zero dimension).
    #[error("image is empty")]
    EmptyCanvas,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_canvas_display() {
        assert_eq!(ExportError::EmptyCanvas.to_string(), "image is empty");
    }
}
