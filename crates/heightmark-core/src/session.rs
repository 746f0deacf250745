//! Annotation session: the working frame, the active placement mode,
//! and the calibration value around a [`PointRegistry`].
//!
//! A session is what an interactive front end drives. Clicks only place
//! points while a placement mode is active, and anything that changes
//! the coordinate frame (loading an image, cropping) clears every point.

use crate::metrics::{Metrics, compute};
use crate::registry::PointRegistry;
use crate::types::{
    AnnotateError, DEFAULT_AXIS_VALUE, Dimensions, ImagePoint, PointName, Region,
    validate_axis_value,
};

/// Interactive annotation state.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    frame: Option<Dimensions>,
    full_frame: Option<Dimensions>,
    mode: Option<PointName>,
    axis_value: f64,
    registry: PointRegistry,
}

impl Default for Session {
    fn default() -> Self {
        Self {
            frame: None,
            full_frame: None,
            mode: None,
            axis_value: DEFAULT_AXIS_VALUE,
            registry: PointRegistry::new(),
        }
    }
}

impl Session {
    /// Create a session with no frame, no points, and the default
    /// calibration value.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current working frame, if any.
    #[must_use]
    pub const fn frame(&self) -> Option<Dimensions> {
        self.frame
    }

    /// Frame as last loaded, before any crop.
    #[must_use]
    pub const fn full_frame(&self) -> Option<Dimensions> {
        self.full_frame
    }

    /// Point the next click will place, if any.
    #[must_use]
    pub const fn mode(&self) -> Option<PointName> {
        self.mode
    }

    /// Calibration value for the Axis tick.
    #[must_use]
    pub const fn axis_value(&self) -> f64 {
        self.axis_value
    }

    /// Current placements.
    #[must_use]
    pub const fn registry(&self) -> &PointRegistry {
        &self.registry
    }

    /// Replace the working frame. All points and the mode are reset.
    pub fn load_frame(&mut self, frame: Dimensions) {
        tracing::debug!(width = frame.width, height = frame.height, "frame loaded");
        self.frame = Some(frame);
        self.full_frame = Some(frame);
        self.mode = None;
        self.registry.clear_all();
    }

    /// Undo any crop by restoring the frame as last loaded. All points
    /// and the mode are reset.
    ///
    /// # Errors
    ///
    /// Returns [`AnnotateError::NoFrame`] if no frame was ever loaded.
    pub fn reset_to_full_frame(&mut self) -> Result<Dimensions, AnnotateError> {
        let full = self.full_frame.ok_or(AnnotateError::NoFrame)?;
        tracing::debug!(width = full.width, height = full.height, "frame reset");
        self.frame = Some(full);
        self.mode = None;
        self.registry.clear_all();
        Ok(full)
    }

    /// Crop the working frame to `region`. All points are reset because
    /// their coordinates belong to the old frame.
    ///
    /// # Errors
    ///
    /// Returns [`AnnotateError::NoFrame`] without a frame and
    /// [`AnnotateError::InvalidRegion`] for an empty or out-of-bounds
    /// region. The session is unchanged on error.
    pub fn crop(&mut self, region: Region) -> Result<Dimensions, AnnotateError> {
        let frame = self.frame.ok_or(AnnotateError::NoFrame)?;
        region.validate(frame)?;
        let cropped = region.dimensions();
        tracing::debug!(
            x = region.x,
            y = region.y,
            width = cropped.width,
            height = cropped.height,
            "frame cropped"
        );
        self.frame = Some(cropped);
        self.mode = None;
        self.registry.clear_all();
        Ok(cropped)
    }

    /// Arm placement of `name` on the next click.
    pub const fn begin_placement(&mut self, name: PointName) {
        self.mode = Some(name);
    }

    /// Set the calibration value and arm placement of the Axis tick.
    ///
    /// # Errors
    ///
    /// Returns [`AnnotateError::AxisValueOutOfRange`] for a value that is
    /// not finite or exceeds +/-1e9; the mode is not changed.
    pub fn begin_axis_placement(&mut self, axis_value: f64) -> Result<(), AnnotateError> {
        self.set_axis_value(axis_value)?;
        self.mode = Some(PointName::Axis);
        Ok(())
    }

    /// Set the calibration value without changing the mode.
    ///
    /// # Errors
    ///
    /// Returns [`AnnotateError::AxisValueOutOfRange`] for a value that is
    /// not finite or exceeds +/-1e9.
    pub fn set_axis_value(&mut self, axis_value: f64) -> Result<(), AnnotateError> {
        self.axis_value = validate_axis_value(axis_value)?;
        Ok(())
    }

    /// Leave any placement mode.
    pub const fn cancel(&mut self) {
        self.mode = None;
    }

    /// Place the armed point at `xy`, clamped into the frame.
    ///
    /// Returns the name of the point that was placed and leaves the
    /// placement mode.
    ///
    /// # Errors
    ///
    /// Returns [`AnnotateError::NoFrame`] without a frame and
    /// [`AnnotateError::NoActiveMode`] when no placement is armed.
    pub fn click(&mut self, xy: ImagePoint) -> Result<PointName, AnnotateError> {
        let frame = self.frame.ok_or(AnnotateError::NoFrame)?;
        let name = self.mode.take().ok_or(AnnotateError::NoActiveMode)?;
        let placed = frame.clamp(xy);
        tracing::debug!(point = %name, x = placed.x, y = placed.y, "point placed");
        self.registry.set(name, placed);
        Ok(name)
    }

    /// Remove every placement, keeping the frame.
    pub fn clear_marks(&mut self) {
        self.registry.clear_all();
    }

    /// Metrics for the current placements and calibration value.
    #[must_use]
    pub fn metrics(&self) -> Metrics {
        compute(&self.registry, self.axis_value)
    }
}
