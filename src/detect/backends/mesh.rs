#![cfg(feature = "backend-mesh")]

//! ONNX face-mesh landmarker backend.
//!
//! Loads a local face-mesh model with tract and runs full-frame inference.
//! The model contract: input is a `1x3xHxW` f32 image in [0, 1]; the first
//! output is a flat run of at least `LANDMARK_COUNT` (x, y, z) coordinates
//! in input-pixel units; an optional second output is a face presence score.
//! No network I/O, no disk writes beyond the initial model load.

use std::path::Path;

use anyhow::{anyhow, Context, Result};
use tract_onnx::prelude::*;

use crate::detect::LandmarkDetector;
use crate::frame::CameraFrame;
use crate::landmarks::{Landmark, LandmarkSet, LANDMARK_COUNT};

/// Model input resolution. Canonical face-mesh models take square inputs.
pub const MESH_INPUT_SIZE: u32 = 192;

/// Tract-based face-mesh landmarker.
pub struct MeshDetector {
    model: SimplePlan<TypedFact, Box<dyn TypedOp>>,
    input_size: u32,
    presence_threshold: f32,
}

impl MeshDetector {
    /// Load an ONNX face-mesh model from disk and prepare it for inference.
    pub fn new<P: AsRef<Path>>(model_path: P) -> Result<Self> {
        let model_path = model_path.as_ref();
        let size = MESH_INPUT_SIZE as usize;
        let model = tract_onnx::onnx()
            .model_for_path(model_path)
            .with_context(|| format!("failed to load ONNX model from {}", model_path.display()))?
            .with_input_fact(
                0,
                InferenceFact::dt_shape(f32::datum_type(), tvec!(1, 3, size, size)),
            )
            .context("failed to set input fact")?
            .into_optimized()
            .context("failed to optimize ONNX model")?
            .into_runnable()
            .context("failed to build runnable ONNX model")?;

        Ok(Self {
            model,
            input_size: MESH_INPUT_SIZE,
            presence_threshold: 0.5,
        })
    }

    /// Override the default face presence threshold.
    pub fn with_presence_threshold(mut self, threshold: f32) -> Self {
        self.presence_threshold = threshold;
        self
    }

    /// Nearest-neighbour resample of the frame into the model's input
    /// tensor, channels-first, normalized to [0, 1].
    fn build_input(&self, frame: &CameraFrame) -> Result<Tensor> {
        if frame.width == 0 || frame.height == 0 {
            return Err(anyhow!("cannot resample an empty frame"));
        }
        let expected_len = (frame.width as usize)
            .checked_mul(frame.height as usize)
            .and_then(|v| v.checked_mul(3))
            .ok_or_else(|| anyhow!("frame dimensions overflow"))?;
        if frame.pixels.len() != expected_len {
            return Err(anyhow!(
                "expected {} RGB bytes, received {}",
                expected_len,
                frame.pixels.len()
            ));
        }

        let size = self.input_size as usize;
        let src_w = frame.width as usize;
        let src_h = frame.height as usize;
        let input =
            tract_ndarray::Array4::from_shape_fn((1, 3, size, size), |(_, channel, y, x)| {
                let src_x = (x * src_w / size).min(src_w - 1);
                let src_y = (y * src_h / size).min(src_h - 1);
                let idx = (src_y * src_w + src_x) * 3 + channel;
                frame.pixels[idx] as f32 / 255.0
            });

        Ok(input.into_tensor())
    }
}

impl LandmarkDetector for MeshDetector {
    fn name(&self) -> &'static str {
        "mesh"
    }

    fn is_landmarker(&self) -> bool {
        true
    }

    fn detect(&mut self, frame: &CameraFrame) -> Result<Option<LandmarkSet>> {
        let input = self.build_input(frame)?;
        let outputs = self
            .model
            .run(tvec!(input.into()))
            .context("ONNX inference failed")?;

        // Presence score, when the model provides one.
        if outputs.len() > 1 {
            let scores = outputs[1]
                .to_array_view::<f32>()
                .context("presence output tensor was not f32")?;
            let score = scores.iter().next().copied().unwrap_or(0.0);
            if score < self.presence_threshold {
                return Ok(None);
            }
        }

        let coords = outputs
            .first()
            .ok_or_else(|| anyhow!("model produced no outputs"))?
            .to_array_view::<f32>()
            .context("landmark output tensor was not f32")?;
        let flat: Vec<f32> = coords.iter().copied().collect();
        if flat.len() < LANDMARK_COUNT * 3 {
            return Err(anyhow!(
                "landmark output too short: {} values for {} points",
                flat.len(),
                LANDMARK_COUNT
            ));
        }

        let scale = self.input_size as f64;
        let points = (0..LANDMARK_COUNT)
            .map(|i| {
                Landmark::new(
                    flat[i * 3] as f64 / scale,
                    flat[i * 3 + 1] as f64 / scale,
                    flat[i * 3 + 2] as f64 / scale,
                )
            })
            .collect();

        LandmarkSet::from_points(points).map(Some)
    }

    fn warm_up(&mut self) -> Result<()> {
        let size = self.input_size as usize;
        let zeros = Tensor::zero::<f32>(&[1, 3, size, size])?;
        self.model
            .run(tvec!(zeros.into()))
            .context("warm-up inference failed")?;
        Ok(())
    }
}
