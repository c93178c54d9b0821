//! Face tracking pipeline.
//!
//! Turns a camera's noisy, high-rate stream of facial landmark observations
//! into two clean outputs for a drawing application: a smoothed 2D pointer
//! position and a discrete, debounced gesture label (blink, wink,
//! mouth-open), emitted as one JSON record per line on stdout.
//!
//! # Architecture
//!
//! Per frame, a straight synchronous chain:
//!
//! ```text
//! camera -> landmark detector -> point extractor -> smoothing filter
//!        -> gesture classifier -> rate estimator -> output encoder
//! ```
//!
//! The camera read is the only blocking call; an interrupt flips a
//! cancellation flag checked each iteration, and every exit path releases
//! the camera and emits a final stopped record.
//!
//! # Module structure
//!
//! - `ingest`: camera sources (`stub://` synthetic, V4L2 behind a feature)
//! - `detect`: the landmark detection capability and its backends
//! - `track`: the algorithmic core (extractor, filter, classifier, rate)
//! - `output`: wire records and the line-delimited JSON encoder
//! - `pipeline`: the per-frame chain and the capture loop
//! - `config`: file + env + CLI configuration layering

pub mod config;
pub mod detect;
pub mod frame;
pub mod ingest;
pub mod landmarks;
pub mod output;
pub mod pipeline;
pub mod track;

pub use config::{resolve_camera_device, TrackerConfig};
#[cfg(feature = "backend-mesh")]
pub use detect::MeshDetector;
pub use detect::{select_detector, CentroidDetector, LandmarkDetector, StubDetector};
pub use frame::CameraFrame;
pub use ingest::{CameraConfig, CameraSource, CameraStats};
pub use landmarks::{Landmark, LandmarkSet, LANDMARK_COUNT};
pub use output::{RecordWriter, TrackingRecord};
pub use pipeline::Tracker;
pub use track::{
    tracking_point, GestureClassifier, GestureLabel, GestureThresholds, RateEstimator,
    SmoothingFilter, TrackingMode,
};
