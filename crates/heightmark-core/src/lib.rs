//! heightmark-core: reference points and height metrics (sans-IO).
//!
//! A user places up to five named points on a chart image (Baseline,
//! Control, A, B and an optional Axis calibration tick). This crate holds
//! those placements in a [`PointRegistry`] and derives pixel heights,
//! pairwise percentage comparisons, and calibrated values from them with
//! the pure [`compute`] function.
//!
//! This crate has **no I/O dependencies**. Image decoding, overlay text,
//! and PNG export live in `heightmark-export`; the command-line driver
//! lives in `heightmark`.

pub mod config;
pub mod metrics;
pub mod registry;
pub mod session;
pub mod types;

pub use config::AnnotationConfig;
pub use metrics::{Comparison, MetricKey, Metrics, Scale, Subject, compute, percent};
pub use registry::PointRegistry;
pub use session::Session;
pub use types::{
    AXIS_VALUE_LIMIT, AnnotateError, DEFAULT_AXIS_VALUE, Dimensions, ImagePoint, PointName, Region,
};
