//! Coarse fallback detector.
//!
//! Estimates a face box as the brightness-weighted centroid of the frame's
//! above-average luminance and synthesizes a neutral landmark set from it.
//! Lower fidelity than the mesh landmarker (the pointer tracks, apertures
//! stay neutral) but it keeps the capability contract: a returned set is
//! always fully populated.

use anyhow::Result;

use crate::detect::geometry::synthetic_face;
use crate::detect::LandmarkDetector;
use crate::frame::CameraFrame;
use crate::landmarks::LandmarkSet;

const NEUTRAL_EAR: f64 = 0.3;
const NEUTRAL_MAR: f64 = 0.1;

/// Luminance-centroid face box detector.
pub struct CentroidDetector {
    /// Sampling stride in pixels; the full frame is never scanned.
    sample_step: u32,
    /// How far above the mean a sample must sit to count as face-bright.
    luma_margin: u8,
    /// Minimum fraction of bright samples for a face to be present.
    min_coverage: f64,
}

impl CentroidDetector {
    pub fn new() -> Self {
        Self {
            sample_step: 4,
            luma_margin: 24,
            min_coverage: 0.02,
        }
    }
}

impl Default for CentroidDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl LandmarkDetector for CentroidDetector {
    fn name(&self) -> &'static str {
        "centroid"
    }

    fn is_landmarker(&self) -> bool {
        false
    }

    fn detect(&mut self, frame: &CameraFrame) -> Result<Option<LandmarkSet>> {
        let step = self.sample_step.max(1);

        // First pass: mean luminance of the sample grid.
        let mut total = 0u64;
        let mut samples = 0u64;
        let mut y = 0;
        while y < frame.height {
            let mut x = 0;
            while x < frame.width {
                total += frame.luma(x, y) as u64;
                samples += 1;
                x += step;
            }
            y += step;
        }
        if samples == 0 {
            return Ok(None);
        }
        let mean = (total / samples) as u8;
        let threshold = mean.saturating_add(self.luma_margin);

        // Second pass: brightness-weighted centroid and spread of samples
        // above the threshold.
        let mut weight = 0.0f64;
        let mut wx = 0.0f64;
        let mut wy = 0.0f64;
        let mut wxx = 0.0f64;
        let mut wyy = 0.0f64;
        let mut bright = 0u64;
        let mut y = 0;
        while y < frame.height {
            let mut x = 0;
            while x < frame.width {
                let luma = frame.luma(x, y);
                if luma > threshold {
                    let w = (luma - threshold) as f64;
                    let fx = x as f64;
                    let fy = y as f64;
                    weight += w;
                    wx += w * fx;
                    wy += w * fy;
                    wxx += w * fx * fx;
                    wyy += w * fy * fy;
                    bright += 1;
                }
                x += step;
            }
            y += step;
        }

        let coverage = bright as f64 / samples as f64;
        if coverage < self.min_coverage || weight <= 0.0 {
            return Ok(None);
        }

        let cx = wx / weight;
        let cy = wy / weight;
        let var_x = (wxx / weight - cx * cx).max(0.0);
        let var_y = (wyy / weight - cy * cy).max(0.0);

        let norm_cx = cx / frame.width as f64;
        let norm_cy = cy / frame.height as f64;
        let half_w = (2.0 * var_x.sqrt() / frame.width as f64).clamp(0.05, 0.5);
        let half_h = (2.0 * var_y.sqrt() / frame.height as f64).clamp(0.05, 0.5);

        Ok(Some(synthetic_face(
            norm_cx,
            norm_cy,
            half_w,
            half_h,
            NEUTRAL_EAR,
            NEUTRAL_EAR,
            NEUTRAL_MAR,
        )))
    }
}
