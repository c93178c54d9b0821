#![cfg(feature = "ingest-v4l2")]

//! V4L2 camera backend.
//!
//! Captures RGB frames from a local device node via libv4l. If the
//! configured device cannot be opened, the standard device nodes
//! /dev/video0..3 are probed before giving up, matching how desktop webcam
//! setups commonly shuffle indices across reconnects. Captured frames are
//! mirrored in place so the pointer tracks like a mirror.

use anyhow::{anyhow, Context, Result};
use ouroboros::self_referencing;

use super::{CameraConfig, CameraStats};
use crate::frame::CameraFrame;

const PROBE_DEVICES: [&str; 4] = ["/dev/video0", "/dev/video1", "/dev/video2", "/dev/video3"];

pub(crate) struct DeviceCamera {
    config: CameraConfig,
    state: Option<DeviceState>,
    frame_count: u64,
    timestamp_ms: u64,
    active_device: String,
    active_width: u32,
    active_height: u32,
}

#[self_referencing]
struct DeviceState {
    device: v4l::Device,
    #[borrows(mut device)]
    #[covariant]
    stream: v4l::prelude::MmapStream<'this, v4l::Device>,
}

impl DeviceCamera {
    pub(crate) fn new(config: CameraConfig) -> Result<Self> {
        Ok(Self {
            active_device: config.device.clone(),
            active_width: config.width,
            active_height: config.height,
            config,
            state: None,
            frame_count: 0,
            timestamp_ms: 0,
        })
    }

    pub(crate) fn connect(&mut self) -> Result<()> {
        let mut tried = Vec::new();
        let mut candidates = vec![self.config.device.clone()];
        for probe in PROBE_DEVICES {
            if probe != self.config.device {
                candidates.push(probe.to_string());
            }
        }

        for candidate in candidates {
            match self.open_device(&candidate) {
                Ok(()) => {
                    self.active_device = candidate;
                    return Ok(());
                }
                Err(err) => {
                    log::warn!("CameraSource: could not open {}: {:#}", candidate, err);
                    tried.push(candidate);
                }
            }
        }

        Err(anyhow!(
            "could not open any camera device (tried {})",
            tried.join(", ")
        ))
    }

    fn open_device(&mut self, path: &str) -> Result<()> {
        use v4l::buffer::Type;
        use v4l::video::Capture;

        let mut device =
            v4l::Device::with_path(path).with_context(|| format!("open v4l2 device {}", path))?;
        let mut format = device.format().context("read v4l2 format")?;
        format.width = self.config.width;
        format.height = self.config.height;
        format.fourcc = v4l::FourCC::new(b"RGB3");

        let format = match device.set_format(&format) {
            Ok(format) => format,
            Err(err) => {
                log::warn!("CameraSource: failed to set format on {}: {}", path, err);
                device
                    .format()
                    .context("read v4l2 format after set failure")?
            }
        };

        if self.config.target_fps > 0 {
            let params = v4l::video::capture::Parameters::with_fps(self.config.target_fps);
            if let Err(err) = device.set_params(&params) {
                log::warn!("CameraSource: failed to set fps on {}: {}", path, err);
            }
        }

        self.active_width = format.width;
        self.active_height = format.height;

        let state = DeviceStateTryBuilder {
            device,
            stream_builder: |device| {
                v4l::prelude::MmapStream::with_buffers(device, Type::VideoCapture, 4)
                    .map_err(|err| anyhow::Error::new(err).context("create v4l2 buffer stream"))
            },
        }
        .try_build()?;
        self.state = Some(state);

        log::info!(
            "CameraSource: connected to {} ({}x{})",
            path,
            self.active_width,
            self.active_height
        );
        Ok(())
    }

    pub(crate) fn next_frame(&mut self) -> Result<Option<CameraFrame>> {
        use v4l::io::traits::CaptureStream;

        let state = self.state.as_mut().context("camera not connected")?;
        let (buf, _meta) = state
            .with_mut(|fields| fields.stream.next())
            .map_err(|err| anyhow::Error::new(err).context("capture camera frame"))?;

        self.frame_count += 1;
        self.timestamp_ms += 1000 / self.config.target_fps.max(1) as u64;

        let mut frame = CameraFrame::new(
            buf.to_vec(),
            self.active_width,
            self.active_height,
            self.timestamp_ms,
        );
        frame.flip_horizontal();
        Ok(Some(frame))
    }

    pub(crate) fn release(&mut self) {
        if self.state.take().is_some() {
            log::info!("CameraSource: released {}", self.active_device);
        }
    }

    pub(crate) fn stats(&self) -> CameraStats {
        CameraStats {
            frames_captured: self.frame_count,
            device: self.active_device.clone(),
        }
    }
}
