//! Per-frame processing chain and the capture loop.
//!
//! Control flow per frame, a straight line with no branching topology:
//! camera -> landmark detector -> tracking point extractor -> smoothing
//! filter -> gesture classifier -> rate estimator -> output encoder.
//! Single-threaded; the camera read is the only suspension point, so none
//! of the persistent state needs locking.

use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use anyhow::Result;

use crate::config::TrackerConfig;
use crate::detect::LandmarkDetector;
use crate::ingest::CameraSource;
use crate::landmarks::LandmarkSet;
use crate::output::{RecordWriter, TrackingRecord};
use crate::track::{
    tracking_point, GestureClassifier, RateEstimator, SmoothingFilter, TrackingMode,
};

const STATS_LOG_INTERVAL: Duration = Duration::from_secs(5);

/// Per-frame processing chain. Owns all persistent tracking state, so the
/// whole pipeline can be driven frame by frame in tests without a camera.
pub struct Tracker {
    mode: TrackingMode,
    filter: SmoothingFilter,
    classifier: GestureClassifier,
    rate: RateEstimator,
}

impl Tracker {
    pub fn new(config: &TrackerConfig) -> Self {
        Self {
            mode: config.mode,
            filter: SmoothingFilter::new(config.smoothing),
            classifier: GestureClassifier::new(config.thresholds),
            rate: RateEstimator::new(),
        }
    }

    /// Turn one frame's detection result into a tracking record. With no
    /// face this frame, the smoothed pointer is held at its last value.
    pub fn process(&mut self, landmarks: Option<&LandmarkSet>) -> TrackingRecord {
        self.rate.tick();

        let (x, y) = match landmarks {
            Some(set) => {
                let (raw_x, raw_y) = tracking_point(self.mode, set);
                self.filter.update(raw_x, raw_y)
            }
            None => self.filter.position(),
        };

        TrackingRecord {
            x,
            y,
            gesture: self.classifier.update(landmarks),
            face_detected: landmarks.is_some(),
            fps: self.rate.fps(),
        }
    }
}

/// Run the capture loop until the stream ends, a read fails, or the
/// cancellation flag is set. The camera is released and a stopped record
/// emitted on every exit path.
pub fn run<W: Write>(
    config: &TrackerConfig,
    source: &mut CameraSource,
    detector: &mut dyn LandmarkDetector,
    writer: &mut RecordWriter<W>,
    cancel: &AtomicBool,
) -> Result<()> {
    writer.write_started(config.mode, detector.is_landmarker())?;
    log::info!(
        "tracking started: mode={} detector={} device={}",
        config.mode,
        detector.name(),
        config.camera.device
    );

    let result = capture_loop(config, source, detector, writer, cancel);

    source.release();
    if let Err(err) = writer.write_stopped() {
        log::warn!("failed to emit stopped record: {:#}", err);
    }
    result
}

fn capture_loop<W: Write>(
    config: &TrackerConfig,
    source: &mut CameraSource,
    detector: &mut dyn LandmarkDetector,
    writer: &mut RecordWriter<W>,
    cancel: &AtomicBool,
) -> Result<()> {
    let mut tracker = Tracker::new(config);
    let mut last_stats_log = Instant::now();

    loop {
        if cancel.load(Ordering::SeqCst) {
            log::info!("interrupt received, stopping");
            return Ok(());
        }

        let frame = match source.next_frame() {
            Ok(Some(frame)) => frame,
            Ok(None) => {
                log::info!(
                    "camera stream ended after {} frames",
                    source.stats().frames_captured
                );
                return Ok(());
            }
            Err(err) => {
                // A hard read failure ends the run; a live positional
                // stream has nothing useful to retry.
                log::warn!("frame read failed, ending run: {:#}", err);
                return Ok(());
            }
        };

        let landmarks = match detector.detect(&frame) {
            Ok(landmarks) => landmarks,
            Err(err) => {
                log::warn!("detection failed on frame: {:#}", err);
                None
            }
        };

        let record = tracker.process(landmarks.as_ref());
        writer.write_record(&record)?;

        if last_stats_log.elapsed() >= STATS_LOG_INTERVAL {
            let stats = source.stats();
            log::debug!(
                "camera {}: {} frames captured, {:.1} fps reported",
                stats.device,
                stats.frames_captured,
                record.fps
            );
            last_stats_log = Instant::now();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detect::synthetic_face;
    use crate::landmarks::{Landmark, NOSE_TIP};
    use crate::track::GestureLabel;

    fn config_with_smoothing(alpha: f64) -> TrackerConfig {
        let mut config = TrackerConfig::default();
        config.smoothing = alpha;
        config
    }

    #[test]
    fn held_pointer_then_step_toward_first_detection() {
        // Ten frames with no face, then one detection at (0.8, 0.2) with
        // alpha 0.5 from the (0.5, 0.5) seed.
        let mut tracker = Tracker::new(&config_with_smoothing(0.5));

        for _ in 0..10 {
            let record = tracker.process(None);
            assert!(!record.face_detected);
            assert_eq!(record.gesture, GestureLabel::None);
            assert!((record.x - 0.5).abs() < 1e-12);
            assert!((record.y - 0.5).abs() < 1e-12);
        }

        let mut set = synthetic_face(0.8, 0.2, 0.1, 0.15, 0.3, 0.3, 0.1);
        set.set_point(NOSE_TIP, Landmark::new(0.8, 0.2, 0.0));
        let record = tracker.process(Some(&set));
        assert!(record.face_detected);
        assert!((record.x - 0.65).abs() < 1e-6);
        assert!((record.y - 0.35).abs() < 1e-6);
    }

    #[test]
    fn gestures_flow_through_the_chain() {
        let mut tracker = Tracker::new(&TrackerConfig::default());
        let closed = synthetic_face(0.5, 0.5, 0.2, 0.25, 0.05, 0.05, 0.1);

        assert_eq!(tracker.process(Some(&closed)).gesture, GestureLabel::None);
        assert_eq!(tracker.process(Some(&closed)).gesture, GestureLabel::None);
        assert_eq!(
            tracker.process(Some(&closed)).gesture,
            GestureLabel::BlinkBoth
        );
    }

    #[test]
    fn records_report_throughput() {
        let mut tracker = Tracker::new(&TrackerConfig::default());
        let record = tracker.process(None);
        assert!(record.fps >= 0.0);
        assert!(record.fps.is_finite());
    }

    #[test]
    fn cancelled_run_emits_started_and_stopped_only() {
        use crate::ingest::{CameraConfig, CameraSource};
        use crate::detect::StubDetector;

        let mut config = TrackerConfig::default();
        config.camera = CameraConfig {
            device: "stub://face".to_string(),
            target_fps: 0,
            width: 32,
            height: 24,
        };

        let mut source = CameraSource::new(config.camera.clone()).unwrap();
        source.connect().unwrap();
        let mut detector = StubDetector::new();
        let mut writer = RecordWriter::new(Vec::new());
        let cancel = AtomicBool::new(true);

        run(&config, &mut source, &mut detector, &mut writer, &cancel).unwrap();

        let out = String::from_utf8(writer.into_inner()).unwrap();
        let values: Vec<serde_json::Value> = out
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        assert_eq!(values.len(), 2);
        assert_eq!(values[0]["status"], "started");
        assert_eq!(values[1]["status"], "stopped");
    }
}
