//! Pointer smoothing.
//!
//! First-order IIR low-pass over the raw tracking point. The smoothed
//! position is the only externally visible pointer; it persists across
//! frames and is simply held when a frame has no detection.

/// Exponential moving average filter for the pointer position.
///
/// `alpha` is the weight retained from the previous smoothed value each
/// frame: higher means more inertia, lower means more responsive. After a
/// step input of magnitude d the remaining lag decays as `d * alpha^n`.
#[derive(Clone, Debug)]
pub struct SmoothingFilter {
    x: f64,
    y: f64,
    alpha: f64,
}

impl SmoothingFilter {
    /// Create a filter seeded at the image center.
    pub fn new(alpha: f64) -> Self {
        Self {
            x: 0.5,
            y: 0.5,
            alpha,
        }
    }

    /// Fold this frame's raw point into the smoothed position and return it.
    pub fn update(&mut self, raw_x: f64, raw_y: f64) -> (f64, f64) {
        self.x = self.x * self.alpha + raw_x * (1.0 - self.alpha);
        self.y = self.y * self.alpha + raw_y * (1.0 - self.alpha);
        (self.x, self.y)
    }

    /// Current smoothed position. Unchanged by frames with no detection.
    pub fn position(&self) -> (f64, f64) {
        (self.x, self.y)
    }
}

impl Default for SmoothingFilter {
    fn default() -> Self {
        Self::new(0.3)
    }
}
