//! Runtime configuration.
//!
//! Layered the same way on every run: built-in defaults, then an optional
//! JSON config file named by `FACETRACK_CONFIG`, then `FACETRACK_*`
//! environment overrides, then CLI flags (applied by the binary). All of it
//! is fixed at process start and immutable thereafter.

use anyhow::{anyhow, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::ingest::CameraConfig;
use crate::track::{GestureThresholds, TrackingMode};

const DEFAULT_SMOOTHING: f64 = 0.3;

#[derive(Debug, Deserialize, Default)]
struct TrackerConfigFile {
    mode: Option<String>,
    smoothing: Option<f64>,
    preview: Option<bool>,
    model: Option<PathBuf>,
    camera: Option<CameraConfigFile>,
    gestures: Option<GestureConfigFile>,
}

#[derive(Debug, Deserialize, Default)]
struct CameraConfigFile {
    device: Option<String>,
    target_fps: Option<u32>,
    width: Option<u32>,
    height: Option<u32>,
}

#[derive(Debug, Deserialize, Default)]
struct GestureConfigFile {
    eye_closed_ear: Option<f64>,
    mouth_open_mar: Option<f64>,
}

/// Resolved configuration for one tracking run.
#[derive(Debug, Clone)]
pub struct TrackerConfig {
    pub mode: TrackingMode,
    /// Smoothing factor in [0.0, 1.0); weight retained from the previous
    /// smoothed position each frame.
    pub smoothing: f64,
    /// Parsed for interface compatibility; preview rendering is not part
    /// of this build.
    pub preview: bool,
    /// Path to the face-mesh ONNX model, when one is available.
    pub model: Option<PathBuf>,
    pub camera: CameraConfig,
    pub thresholds: GestureThresholds,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            mode: TrackingMode::Nose,
            smoothing: DEFAULT_SMOOTHING,
            preview: false,
            model: None,
            camera: CameraConfig::default(),
            thresholds: GestureThresholds::default(),
        }
    }
}

impl TrackerConfig {
    /// Load configuration from the optional config file and environment.
    /// The caller applies CLI overrides on top, then re-validates.
    pub fn load() -> Result<Self> {
        let config_path = std::env::var("FACETRACK_CONFIG").ok();
        let file_cfg = match config_path.as_deref() {
            Some(path) => Some(read_config_file(Path::new(path))?),
            None => None,
        };
        let mut cfg = Self::from_file(file_cfg.unwrap_or_default())?;
        cfg.apply_env()?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn from_file(file: TrackerConfigFile) -> Result<Self> {
        let mut cfg = Self::default();
        if let Some(mode) = file.mode {
            cfg.mode = mode.parse()?;
        }
        if let Some(smoothing) = file.smoothing {
            cfg.smoothing = smoothing;
        }
        if let Some(preview) = file.preview {
            cfg.preview = preview;
        }
        cfg.model = file.model;
        if let Some(camera) = file.camera {
            if let Some(device) = camera.device {
                cfg.camera.device = resolve_camera_device(&device);
            }
            if let Some(target_fps) = camera.target_fps {
                cfg.camera.target_fps = target_fps;
            }
            if let Some(width) = camera.width {
                cfg.camera.width = width;
            }
            if let Some(height) = camera.height {
                cfg.camera.height = height;
            }
        }
        if let Some(gestures) = file.gestures {
            if let Some(ear) = gestures.eye_closed_ear {
                cfg.thresholds.eye_closed_ear = ear;
            }
            if let Some(mar) = gestures.mouth_open_mar {
                cfg.thresholds.mouth_open_mar = mar;
            }
        }
        Ok(cfg)
    }

    fn apply_env(&mut self) -> Result<()> {
        if let Ok(mode) = std::env::var("FACETRACK_MODE") {
            if !mode.trim().is_empty() {
                self.mode = mode.parse()?;
            }
        }
        if let Ok(camera) = std::env::var("FACETRACK_CAMERA") {
            if !camera.trim().is_empty() {
                self.camera.device = resolve_camera_device(&camera);
            }
        }
        if let Ok(smoothing) = std::env::var("FACETRACK_SMOOTHING") {
            self.smoothing = smoothing
                .parse()
                .map_err(|_| anyhow!("FACETRACK_SMOOTHING must be a number"))?;
        }
        if let Ok(model) = std::env::var("FACETRACK_MODEL") {
            if !model.trim().is_empty() {
                self.model = Some(PathBuf::from(model));
            }
        }
        Ok(())
    }

    /// Reject configurations the pipeline cannot run with. Called after
    /// every layer is applied.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..1.0).contains(&self.smoothing) {
            return Err(anyhow!(
                "smoothing factor must be in [0.0, 1.0), got {}",
                self.smoothing
            ));
        }
        if self.camera.device.trim().is_empty() {
            return Err(anyhow!("camera device must not be empty"));
        }
        if self.camera.width == 0 || self.camera.height == 0 {
            return Err(anyhow!(
                "camera resolution must be non-zero, got {}x{}",
                self.camera.width,
                self.camera.height
            ));
        }
        if self.thresholds.eye_closed_ear <= 0.0 || self.thresholds.mouth_open_mar <= 0.0 {
            return Err(anyhow!("gesture thresholds must be positive"));
        }
        Ok(())
    }
}

/// Map a camera identifier to a device path: bare indices become
/// `/dev/videoN`, everything else (paths, `stub://` URLs) passes through.
pub fn resolve_camera_device(value: &str) -> String {
    match value.trim().parse::<u32>() {
        Ok(index) => format!("/dev/video{}", index),
        Err(_) => value.to_string(),
    }
}

fn read_config_file(path: &Path) -> Result<TrackerConfigFile> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| anyhow!("failed to read config file {}: {}", path.display(), e))?;
    let cfg = serde_json::from_str(&raw)
        .map_err(|e| anyhow!("invalid config file {}: {}", path.display(), e))?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_documented_surface() {
        let cfg = TrackerConfig::default();
        assert_eq!(cfg.mode, TrackingMode::Nose);
        assert!((cfg.smoothing - 0.3).abs() < f64::EPSILON);
        assert_eq!(cfg.camera.device, "/dev/video0");
        assert!(!cfg.preview);
        assert!(cfg.model.is_none());
        cfg.validate().unwrap();
    }

    #[test]
    fn camera_indices_resolve_to_device_paths() {
        assert_eq!(resolve_camera_device("0"), "/dev/video0");
        assert_eq!(resolve_camera_device("2"), "/dev/video2");
        assert_eq!(resolve_camera_device("/dev/video5"), "/dev/video5");
        assert_eq!(resolve_camera_device("stub://face"), "stub://face");
    }

    #[test]
    fn smoothing_must_stay_below_one() {
        let mut cfg = TrackerConfig::default();
        cfg.smoothing = 1.0;
        assert!(cfg.validate().is_err());
        cfg.smoothing = -0.1;
        assert!(cfg.validate().is_err());
        cfg.smoothing = 0.0;
        cfg.validate().unwrap();
        cfg.smoothing = 0.99;
        cfg.validate().unwrap();
    }

    #[test]
    fn zero_resolution_is_rejected() {
        let mut cfg = TrackerConfig::default();
        cfg.camera.width = 0;
        assert!(cfg.validate().is_err());
    }
}
