//! Scripted stub detector for `stub://` cameras and tests.
//!
//! Ignores pixel content and plays a deterministic script: the face orbits
//! the frame on triangle waves, drops out briefly once per cycle, and
//! performs each gesture in turn so a downstream consumer sees the full
//! vocabulary without a camera.

use anyhow::Result;

use crate::detect::geometry::synthetic_face;
use crate::detect::LandmarkDetector;
use crate::frame::CameraFrame;
use crate::landmarks::LandmarkSet;

const CYCLE: u64 = 240;

const OPEN_EAR: f64 = 0.3;
const CLOSED_EAR: f64 = 0.05;
const CLOSED_MAR: f64 = 0.1;
const OPEN_MAR: f64 = 0.6;

/// Deterministic scripted detector.
pub struct StubDetector {
    frames_seen: u64,
}

impl StubDetector {
    pub fn new() -> Self {
        Self { frames_seen: 0 }
    }
}

impl Default for StubDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl LandmarkDetector for StubDetector {
    fn name(&self) -> &'static str {
        "stub"
    }

    fn is_landmarker(&self) -> bool {
        // The stub emulates the full landmarker capability: every canonical
        // index is populated with gesture-capable geometry.
        true
    }

    fn detect(&mut self, _frame: &CameraFrame) -> Result<Option<LandmarkSet>> {
        let frame = self.frames_seen;
        self.frames_seen += 1;

        let phase = frame % CYCLE;

        // Brief dropout once per cycle: downstream must hold the pointer.
        if (230..235).contains(&phase) {
            return Ok(None);
        }

        let (mut left_ear, mut right_ear, mut mar) = (OPEN_EAR, OPEN_EAR, CLOSED_MAR);
        match phase {
            40..=45 => {
                left_ear = CLOSED_EAR;
                right_ear = CLOSED_EAR;
            }
            90..=95 => left_ear = CLOSED_EAR,
            140..=145 => right_ear = CLOSED_EAR,
            180..=187 => mar = OPEN_MAR,
            _ => {}
        }

        let cx = 0.5 + 0.2 * triangle(frame, 200);
        let cy = 0.5 + 0.15 * triangle(frame, 170);

        Ok(Some(synthetic_face(
            cx, cy, 0.2, 0.25, left_ear, right_ear, mar,
        )))
    }
}

/// Triangle wave in [-1, 1] with the given period.
fn triangle(frame: u64, period: u64) -> f64 {
    let phase = (frame % period) as f64 / period as f64;
    if phase < 0.5 {
        4.0 * phase - 1.0
    } else {
        3.0 - 4.0 * phase
    }
}
