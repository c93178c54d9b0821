//! The tracking core: per-frame transforms from landmarks to pointer and
//! gesture output.
//!
//! Every component here is a synchronous, single-owner transform. The frame
//! loop in `pipeline` chains them in a straight line; none of them touch the
//! camera or the output stream.

mod extractor;
mod gesture;
mod rate;
mod smoothing;

pub use extractor::{tracking_point, TrackingMode};
pub use gesture::{GestureClassifier, GestureLabel, GestureThresholds};
pub use rate::RateEstimator;
pub use smoothing::SmoothingFilter;
