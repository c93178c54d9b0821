//! Throughput estimation.

use std::time::Instant;

/// Tracks frame count against a monotonic start instant. Never resets
/// during a run.
#[derive(Clone, Debug)]
pub struct RateEstimator {
    frames: u64,
    started: Instant,
}

impl RateEstimator {
    pub fn new() -> Self {
        Self {
            frames: 0,
            started: Instant::now(),
        }
    }

    /// Count one processed frame.
    pub fn tick(&mut self) {
        self.frames += 1;
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Frames per second since the run started, 0.0 before any time has
    /// elapsed.
    pub fn fps(&self) -> f64 {
        let elapsed = self.started.elapsed().as_secs_f64();
        if elapsed > 0.0 {
            self.frames as f64 / elapsed
        } else {
            0.0
        }
    }
}

impl Default for RateEstimator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn counts_frames() {
        let mut rate = RateEstimator::new();
        assert_eq!(rate.frames(), 0);
        rate.tick();
        rate.tick();
        assert_eq!(rate.frames(), 2);
    }

    #[test]
    fn fps_is_finite_and_grows_with_ticks() {
        let mut rate = RateEstimator::new();
        assert!(rate.fps() >= 0.0);

        for _ in 0..30 {
            rate.tick();
        }
        std::thread::sleep(Duration::from_millis(20));
        let fps = rate.fps();
        assert!(fps.is_finite());
        assert!(fps > 0.0);
    }
}
