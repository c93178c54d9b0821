//! End-to-end pipeline test over the synthetic camera.
//!
//! Drives a bounded `stub://` stream through the full chain and checks the
//! emitted line-delimited JSON: control records bracket the run, every
//! tracking record is well formed, and the two record shapes are
//! distinguishable by key presence alone.

use std::sync::atomic::AtomicBool;

use facetrack::config::TrackerConfig;
use facetrack::detect::select_detector;
use facetrack::ingest::{CameraConfig, CameraSource};
use facetrack::output::{RecordWriter, TrackingRecord};
use facetrack::pipeline;
use facetrack::track::GestureLabel;

const FRAMES: usize = 40;

fn run_synthetic_stream() -> Vec<serde_json::Value> {
    let mut config = TrackerConfig::default();
    config.camera = CameraConfig {
        device: format!("stub://face?frames={}", FRAMES),
        target_fps: 0,
        width: 64,
        height: 48,
    };

    let mut source = CameraSource::new(config.camera.clone()).expect("camera source");
    source.connect().expect("connect synthetic camera");
    let mut detector = select_detector(&config).expect("select detector");
    let mut writer = RecordWriter::new(Vec::new());
    let cancel = AtomicBool::new(false);

    pipeline::run(
        &config,
        &mut source,
        detector.as_mut(),
        &mut writer,
        &cancel,
    )
    .expect("pipeline run");

    String::from_utf8(writer.into_inner())
        .expect("utf8 output")
        .lines()
        .map(|line| serde_json::from_str(line).expect("valid json line"))
        .collect()
}

#[test]
fn stream_is_bracketed_by_control_records() {
    let values = run_synthetic_stream();

    assert_eq!(values.len(), FRAMES + 2);
    assert_eq!(values[0]["status"], "started");
    assert_eq!(values[0]["mode"], "nose");
    assert_eq!(values[0]["landmarker"], true);
    assert_eq!(values[values.len() - 1]["status"], "stopped");
}

#[test]
fn tracking_records_are_well_formed_and_ordered() {
    let values = run_synthetic_stream();
    let records: Vec<TrackingRecord> = values[1..values.len() - 1]
        .iter()
        .map(|value| serde_json::from_value(value.clone()).expect("tracking record"))
        .collect();

    assert_eq!(records.len(), FRAMES);
    for record in &records {
        assert!((0.0..=1.0).contains(&record.x), "x={}", record.x);
        assert!((0.0..=1.0).contains(&record.y), "y={}", record.y);
        assert!(record.fps >= 0.0 && record.fps.is_finite());
        assert!(matches!(
            record.gesture,
            GestureLabel::None
                | GestureLabel::BlinkBoth
                | GestureLabel::BlinkLeft
                | GestureLabel::BlinkRight
                | GestureLabel::MouthOpen
        ));
    }

    // The scripted face is on screen from the first frame.
    assert!(records.iter().any(|record| record.face_detected));
}

#[test]
fn record_shapes_discriminate_by_key_presence() {
    let values = run_synthetic_stream();

    for value in &values {
        let is_control = value.get("status").is_some() || value.get("error").is_some();
        let is_tracking = value.get("x").is_some();
        assert!(
            is_control != is_tracking,
            "record must be exactly one shape: {}",
            value
        );
    }
}

#[test]
fn scripted_blink_survives_the_full_chain() {
    // Long enough to cross the stub script's both-eyes-closed window.
    let mut config = TrackerConfig::default();
    config.camera = CameraConfig {
        device: "stub://face?frames=60".to_string(),
        target_fps: 0,
        width: 64,
        height: 48,
    };

    let mut source = CameraSource::new(config.camera.clone()).expect("camera source");
    source.connect().expect("connect");
    let mut detector = select_detector(&config).expect("detector");
    let mut writer = RecordWriter::new(Vec::new());
    let cancel = AtomicBool::new(false);

    pipeline::run(
        &config,
        &mut source,
        detector.as_mut(),
        &mut writer,
        &cancel,
    )
    .expect("pipeline run");

    let out = String::from_utf8(writer.into_inner()).expect("utf8");
    let blinks = out
        .lines()
        .filter(|line| line.contains("\"blink_both\""))
        .count();
    assert_eq!(blinks, 1, "one cooldown-bounded blink expected:\n{}", out);
}
