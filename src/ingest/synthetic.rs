//! Synthetic camera (stub://) for tests and camera-free demos.
//!
//! Generates frames containing a bright face-like blob that drifts around
//! the image on triangle waves, pre-mirrored so no flip is needed. A
//! `frames=N` query on the device string bounds the stream, which exercises
//! the pipeline's end-of-stream path.

use std::time::Duration;

use anyhow::Result;

use super::{CameraConfig, CameraStats};
use crate::frame::CameraFrame;

pub(crate) struct SyntheticCamera {
    config: CameraConfig,
    frame_count: u64,
    frame_limit: Option<u64>,
    timestamp_ms: u64,
}

impl SyntheticCamera {
    pub(crate) fn new(config: CameraConfig) -> Self {
        let frame_limit = parse_frame_limit(&config.device);
        Self {
            config,
            frame_count: 0,
            frame_limit,
            timestamp_ms: 0,
        }
    }

    pub(crate) fn connect(&mut self) -> Result<()> {
        log::info!(
            "CameraSource: connected to {} (synthetic)",
            self.config.device
        );
        Ok(())
    }

    pub(crate) fn next_frame(&mut self) -> Result<Option<CameraFrame>> {
        if let Some(limit) = self.frame_limit {
            if self.frame_count >= limit {
                return Ok(None);
            }
        }

        // Pace like a real camera; target_fps of 0 disables pacing (tests).
        let interval_ms = if self.config.target_fps > 0 {
            1000 / self.config.target_fps.max(1) as u64
        } else {
            33
        };
        if self.config.target_fps > 0 && self.frame_count > 0 {
            std::thread::sleep(Duration::from_millis(interval_ms));
        }

        self.frame_count += 1;
        self.timestamp_ms += interval_ms;

        let pixels = self.generate_pixels();
        Ok(Some(CameraFrame::new(
            pixels,
            self.config.width,
            self.config.height,
            self.timestamp_ms,
        )))
    }

    pub(crate) fn release(&mut self) {
        log::info!("CameraSource: released {} (synthetic)", self.config.device);
    }

    pub(crate) fn stats(&self) -> CameraStats {
        CameraStats {
            frames_captured: self.frame_count,
            device: self.config.device.clone(),
        }
    }

    /// Dark background with a bright elliptical blob at the scripted face
    /// position.
    fn generate_pixels(&self) -> Vec<u8> {
        let width = self.config.width as usize;
        let height = self.config.height as usize;
        let mut pixels = vec![0u8; width * height * 3];

        let cx = (0.5 + 0.2 * triangle(self.frame_count, 200)) * width as f64;
        let cy = (0.5 + 0.15 * triangle(self.frame_count, 170)) * height as f64;
        let rx = 0.18 * width as f64;
        let ry = 0.28 * height as f64;

        for y in 0..height {
            for x in 0..width {
                let dx = (x as f64 - cx) / rx;
                let dy = (y as f64 - cy) / ry;
                let idx = (y * width + x) * 3;
                if dx * dx + dy * dy <= 1.0 {
                    pixels[idx] = 220;
                    pixels[idx + 1] = 185;
                    pixels[idx + 2] = 165;
                } else {
                    pixels[idx] = 24;
                    pixels[idx + 1] = 24;
                    pixels[idx + 2] = 28;
                }
            }
        }

        pixels
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

/// Parse an optional `frames=N` bound from a `stub://` device string.
fn parse_frame_limit(device: &str) -> Option<u64> {
    let (_, query) = device.split_once('?')?;
    query.split('&').find_map(|pair| {
        let (key, value) = pair.split_once('=')?;
        if key == "frames" {
            value.parse().ok()
        } else {
            None
        }
    })
}
