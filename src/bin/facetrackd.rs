//! facetrackd - face tracking daemon
//!
//! Reads camera frames, runs landmark detection, and writes one JSON
//! tracking record per frame to stdout for the drawing application to
//! consume. Logs go to stderr; stdout carries only the record stream.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;

use facetrack::config::{resolve_camera_device, TrackerConfig};
use facetrack::detect::select_detector;
use facetrack::ingest::CameraSource;
use facetrack::output::RecordWriter;
use facetrack::pipeline;

#[derive(Parser, Debug)]
#[command(name = "facetrackd", about = "Face tracking for pointer control")]
struct Args {
    /// Tracking mode: nose, head, eyes, or mouth
    #[arg(long)]
    mode: Option<String>,

    /// Camera index, device path, or stub:// URL
    #[arg(long)]
    camera: Option<String>,

    /// Smoothing factor in [0.0, 1.0); higher means more inertia
    #[arg(long)]
    smoothing: Option<f64>,

    /// Show a preview window (accepted for compatibility, not supported)
    #[arg(long)]
    preview: bool,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    if let Err(err) = run(args) {
        // Fatal setup failures surface as a single structured error record
        // on the same stream the consumer is already reading.
        let mut writer = RecordWriter::new(std::io::stdout().lock());
        let _ = writer.write_error(&format!("{:#}", err));
        log::error!("fatal: {:#}", err);
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<()> {
    let mut config = TrackerConfig::load()?;
    if let Some(mode) = args.mode {
        config.mode = mode.parse()?;
    }
    if let Some(camera) = args.camera {
        config.camera.device = resolve_camera_device(&camera);
    }
    if let Some(smoothing) = args.smoothing {
        config.smoothing = smoothing;
    }
    if args.preview {
        config.preview = true;
    }
    config.validate()?;

    if config.preview {
        log::warn!("preview window is not supported in this build; continuing headless");
    }

    let cancel = Arc::new(AtomicBool::new(false));
    {
        let cancel = Arc::clone(&cancel);
        ctrlc::set_handler(move || cancel.store(true, Ordering::SeqCst))
            .context("install interrupt handler")?;
    }

    let mut source =
        CameraSource::new(config.camera.clone()).context("configure camera source")?;
    source.connect().context("open camera")?;

    let mut detector = select_detector(&config)?;
    detector.warm_up().context("detector warm-up failed")?;

    let stdout = std::io::stdout();
    let mut writer = RecordWriter::new(stdout.lock());

    pipeline::run(
        &config,
        &mut source,
        detector.as_mut(),
        &mut writer,
        &cancel,
    )
}
