//! Output record encoding.
//!
//! One JSON object per line on the pipeline's output boundary, flushed per
//! record so the consumer sees each one before the next frame is processed.
//! Tracking records and lifecycle control records share the stream; the
//! consumer discriminates by key presence, not position.

use std::io::Write;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::track::{GestureLabel, TrackingMode};

/// One record per processed frame. Immutable once constructed, discarded
/// after emission.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrackingRecord {
    /// Smoothed pointer position, image-normalized.
    pub x: f64,
    pub y: f64,
    pub gesture: GestureLabel,
    pub face_detected: bool,
    pub fps: f64,
}

/// Line-delimited JSON encoder.
pub struct RecordWriter<W: Write> {
    out: W,
}

impl<W: Write> RecordWriter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// Emit one per-frame tracking record.
    pub fn write_record(&mut self, record: &TrackingRecord) -> Result<()> {
        self.write_json(record)
    }

    /// Emit the startup control record. `landmarker` tells the consumer
    /// whether a full face-mesh landmarker is active (gestures are coarse
    /// under the fallback detector).
    pub fn write_started(&mut self, mode: TrackingMode, landmarker: bool) -> Result<()> {
        self.write_json(&json!({
            "status": "started",
            "mode": mode.as_str(),
            "landmarker": landmarker,
        }))
    }

    /// Emit the shutdown control record.
    pub fn write_stopped(&mut self) -> Result<()> {
        self.write_json(&json!({ "status": "stopped" }))
    }

    /// Emit a fatal setup failure record.
    pub fn write_error(&mut self, message: &str) -> Result<()> {
        self.write_json(&json!({ "error": message }))
    }

    fn write_json<T: Serialize>(&mut self, value: &T) -> Result<()> {
        serde_json::to_writer(&mut self.out, value).context("serialize output record")?;
        self.out.write_all(b"\n").context("write record terminator")?;
        self.out.flush().context("flush output record")
    }

    pub fn get_ref(&self) -> &W {
        &self.out
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}
