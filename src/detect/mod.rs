//! Landmark detection boundary.
//!
//! One capability: given an image frame, return zero or one fully populated
//! set of canonical facial landmarks. Implementations are interchangeable
//! and selected once at startup; the tracking core never learns which one
//! produced a set, only that the canonical indices are populated.
//!
//! - `MeshDetector` (feature `backend-mesh`): ONNX face-mesh landmarker.
//! - `CentroidDetector`: coarse luminance face box, always available.
//! - `StubDetector`: scripted faces for `stub://` cameras and tests.

mod backends;
mod geometry;

pub use backends::CentroidDetector;
#[cfg(feature = "backend-mesh")]
pub use backends::MeshDetector;
pub use backends::StubDetector;
pub use geometry::synthetic_face;

use anyhow::Result;

use crate::config::TrackerConfig;
use crate::frame::CameraFrame;
use crate::landmarks::LandmarkSet;

/// Landmark detector capability.
///
/// `detect` is synchronous, called once per captured frame, and must either
/// return a fully populated set or none at all - partial sets are a
/// conformance failure, not a degraded result.
pub trait LandmarkDetector: Send {
    /// Backend identifier.
    fn name(&self) -> &'static str;

    /// True when this implementation runs a full face-mesh landmarker
    /// rather than a coarse face-box fallback. Reported to the consumer in
    /// the startup record so it can judge gesture fidelity.
    fn is_landmarker(&self) -> bool;

    /// Run detection on a frame.
    fn detect(&mut self, frame: &CameraFrame) -> Result<Option<LandmarkSet>>;

    /// Optional warm-up hook, called once before the frame loop starts.
    fn warm_up(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Choose a detector for this run. Called once at startup; the selection is
/// fixed for the process lifetime.
///
/// `stub://` cameras get the scripted stub so the synthetic pipeline
/// produces faces end to end. Otherwise the mesh landmarker is preferred
/// when compiled in and its model file is present, with the centroid
/// fallback covering every other case.
pub fn select_detector(config: &TrackerConfig) -> Result<Box<dyn LandmarkDetector>> {
    if config.camera.device.starts_with("stub://") {
        log::info!("detector: stub (synthetic camera)");
        return Ok(Box::new(StubDetector::new()));
    }

    #[cfg(feature = "backend-mesh")]
    if let Some(model) = &config.model {
        if model.exists() {
            match MeshDetector::new(model) {
                Ok(detector) => {
                    log::info!("detector: mesh landmarker ({})", model.display());
                    return Ok(Box::new(detector));
                }
                Err(err) => {
                    log::warn!("mesh landmarker unavailable, falling back: {:#}", err);
                }
            }
        } else {
            log::warn!(
                "mesh model {} not found, falling back to centroid detector",
                model.display()
            );
        }
    }

    log::info!("detector: centroid fallback");
    Ok(Box::new(CentroidDetector::new()))
}
