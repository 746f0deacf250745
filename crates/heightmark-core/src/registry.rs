//! Point registry: the five named reference points and their optional
//! image-space coordinates.
//!
//! The registry is a plain data holder. Placing a point mutates exactly
//! one slot; [`PointRegistry::clear_all`] empties every slot at once and
//! is the only valid response to a change of coordinate frame.

use serde::{Deserialize, Serialize};

use crate::types::{AnnotateError, ImagePoint, PointName};

/// Optional coordinate for each of the five [`PointName`]s.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PointRegistry {
    slots: [Option<ImagePoint>; 5],
}

impl PointRegistry {
    /// Create a registry with every point unplaced.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the coordinate of `name`, replacing any previous placement.
    pub const fn set(&mut self, name: PointName, xy: ImagePoint) {
        self.slots[name.index()] = Some(xy);
    }

    /// Record a coordinate for a point identified by its string name.
    ///
    /// # Errors
    ///
    /// Returns [`AnnotateError::InvalidName`] if `name` is not one of the
    /// five fixed names. The registry is left unchanged.
    pub fn set_named(&mut self, name: &str, xy: ImagePoint) -> Result<(), AnnotateError> {
        let name: PointName = name.parse()?;
        self.set(name, xy);
        Ok(())
    }

    /// Coordinate of `name`, or `None` if it has not been placed.
    #[must_use]
    pub const fn get(&self, name: PointName) -> Option<ImagePoint> {
        self.slots[name.index()]
    }

    /// Look up a point by its string name.
    ///
    /// # Errors
    ///
    /// Returns [`AnnotateError::InvalidName`] for an unknown name.
    pub fn get_named(&self, name: &str) -> Result<Option<ImagePoint>, AnnotateError> {
        Ok(self.get(name.parse()?))
    }

    /// Forget a single placement.
    pub const fn unset(&mut self, name: PointName) {
        self.slots[name.index()] = None;
    }

    /// Reset every point to unplaced in one step.
    pub fn clear_all(&mut self) {
        self.slots = [None; 5];
    }

    /// Returns `true` if no point has been placed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }

    /// Placed points in display order.
    pub fn placed(&self) -> impl Iterator<Item = (PointName, ImagePoint)> + '_ {
        PointName::ALL
            .into_iter()
            .filter_map(|name| self.get(name).map(|xy| (name, xy)))
    }
}
