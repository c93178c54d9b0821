//! Gesture classification.
//!
//! A hysteresis state machine over per-frame eye and mouth aperture ratios.
//! Closures must persist for a run of frames before a gesture fires, and a
//! cooldown window after each emission keeps one physical blink or mouth
//! movement from triggering repeatedly.

use serde::{Deserialize, Serialize};

use crate::landmarks::{
    LandmarkSet, LEFT_EYE_BOTTOM, LEFT_EYE_INNER, LEFT_EYE_OUTER, LEFT_EYE_TOP, LEFT_MOUTH,
    LOWER_LIP, RIGHT_EYE_BOTTOM, RIGHT_EYE_INNER, RIGHT_EYE_OUTER, RIGHT_EYE_TOP, RIGHT_MOUTH,
    UPPER_LIP,
};

/// Horizontal spans below this are degenerate; the ratio falls back to a
/// neutral value instead of blowing up.
const DEGENERATE_SPAN: f64 = 0.001;

/// Gesture emitted for a frame. Absence of a gesture is itself a label,
/// not an omission.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GestureLabel {
    #[default]
    None,
    BlinkBoth,
    BlinkLeft,
    BlinkRight,
    MouthOpen,
}

impl GestureLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::BlinkBoth => "blink_both",
            Self::BlinkLeft => "blink_left",
            Self::BlinkRight => "blink_right",
            Self::MouthOpen => "mouth_open",
        }
    }
}

/// Classification thresholds. The aperture thresholds may be overridden via
/// configuration; the run lengths and cooldowns are part of the gesture
/// vocabulary's shape and stay fixed.
#[derive(Clone, Copy, Debug)]
pub struct GestureThresholds {
    /// An eye with EAR below this is closed.
    pub eye_closed_ear: f64,
    /// A mouth with MAR above this is open.
    pub mouth_open_mar: f64,
    /// Both-eye run length that fires `blink_both`.
    pub blink_frames: u32,
    /// Single-eye run length that fires a wink.
    pub wink_frames: u32,
    /// Mouth-open run length that fires `mouth_open`.
    pub mouth_frames: u32,
    /// Cooldown frames after any blink or wink.
    pub blink_cooldown: u32,
    /// Cooldown frames after a mouth-open.
    pub mouth_cooldown: u32,
}

impl Default for GestureThresholds {
    fn default() -> Self {
        Self {
            eye_closed_ear: 0.15,
            mouth_open_mar: 0.4,
            blink_frames: 2,
            wink_frames: 3,
            mouth_frames: 5,
            blink_cooldown: 15,
            mouth_cooldown: 20,
        }
    }
}

/// Per-run gesture state machine. Owns all mutable gesture state so it can
/// be driven frame by frame in tests without a camera.
#[derive(Clone, Debug, Default)]
pub struct GestureClassifier {
    thresholds: GestureThresholds,
    left_eye_closed_frames: u32,
    right_eye_closed_frames: u32,
    mouth_open_frames: u32,
    cooldown: u32,
    last_gesture: GestureLabel,
}

impl GestureClassifier {
    pub fn new(thresholds: GestureThresholds) -> Self {
        Self {
            thresholds,
            ..Self::default()
        }
    }

    /// Classify one frame. `None` landmarks means no face was detected this
    /// frame; the counters are left untouched so a dropped frame does not
    /// read as "eyes open".
    pub fn update(&mut self, landmarks: Option<&LandmarkSet>) -> GestureLabel {
        let Some(landmarks) = landmarks else {
            return GestureLabel::None;
        };

        let left_ear = eye_aspect_ratio(
            landmarks,
            LEFT_EYE_TOP,
            LEFT_EYE_BOTTOM,
            LEFT_EYE_INNER,
            LEFT_EYE_OUTER,
        );
        let right_ear = eye_aspect_ratio(
            landmarks,
            RIGHT_EYE_TOP,
            RIGHT_EYE_BOTTOM,
            RIGHT_EYE_INNER,
            RIGHT_EYE_OUTER,
        );
        let mar = mouth_aspect_ratio(landmarks);

        // Run-length counters: increment while the condition holds, reset the
        // frame it fails. Debounce comes from the run-length thresholds, not
        // from the counters themselves.
        if left_ear < self.thresholds.eye_closed_ear {
            self.left_eye_closed_frames += 1;
        } else {
            self.left_eye_closed_frames = 0;
        }
        if right_ear < self.thresholds.eye_closed_ear {
            self.right_eye_closed_frames += 1;
        } else {
            self.right_eye_closed_frames = 0;
        }
        if mar > self.thresholds.mouth_open_mar {
            self.mouth_open_frames += 1;
        } else {
            self.mouth_open_frames = 0;
        }

        // An active cooldown suppresses everything, guaranteeing at most one
        // emission per physical gesture.
        if self.cooldown > 0 {
            self.cooldown -= 1;
            return GestureLabel::None;
        }

        // Priority order: the combined signal first, then winks (which
        // require the other eye to have zero closed frames, so a double
        // blink is never read as two winks), then mouth.
        let gesture = if self.left_eye_closed_frames > self.thresholds.blink_frames
            && self.right_eye_closed_frames > self.thresholds.blink_frames
        {
            self.cooldown = self.thresholds.blink_cooldown;
            GestureLabel::BlinkBoth
        } else if self.left_eye_closed_frames > self.thresholds.wink_frames
            && self.right_eye_closed_frames == 0
        {
            self.cooldown = self.thresholds.blink_cooldown;
            GestureLabel::BlinkLeft
        } else if self.right_eye_closed_frames > self.thresholds.wink_frames
            && self.left_eye_closed_frames == 0
        {
            self.cooldown = self.thresholds.blink_cooldown;
            GestureLabel::BlinkRight
        } else if self.mouth_open_frames > self.thresholds.mouth_frames {
            self.cooldown = self.thresholds.mouth_cooldown;
            GestureLabel::MouthOpen
        } else {
            GestureLabel::None
        };

        if gesture != GestureLabel::None {
            self.last_gesture = gesture;
        }
        gesture
    }

    /// Most recent non-none gesture emitted this run.
    pub fn last_gesture(&self) -> GestureLabel {
        self.last_gesture
    }
}

/// Eye aspect ratio: vertical eyelid distance over horizontal corner
/// distance. A degenerate horizontal span reads as open (1.0).
fn eye_aspect_ratio(
    landmarks: &LandmarkSet,
    top: usize,
    bottom: usize,
    inner: usize,
    outer: usize,
) -> f64 {
    let vertical = landmarks.point(top).distance_2d(&landmarks.point(bottom));
    let horizontal = landmarks.point(inner).distance_2d(&landmarks.point(outer));
    if horizontal < DEGENERATE_SPAN {
        return 1.0;
    }
    vertical / horizontal
}

/// Mouth aspect ratio: vertical lip distance over horizontal corner
/// distance. A degenerate horizontal span reads as closed (0.0).
fn mouth_aspect_ratio(landmarks: &LandmarkSet) -> f64 {
    let vertical = landmarks
        .point(UPPER_LIP)
        .distance_2d(&landmarks.point(LOWER_LIP));
    let horizontal = landmarks
        .point(LEFT_MOUTH)
        .distance_2d(&landmarks.point(RIGHT_MOUTH));
    if horizontal < DEGENERATE_SPAN {
        return 0.0;
    }
    vertical / horizontal
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detect::synthetic_face;

    const OPEN: f64 = 0.3;
    const CLOSED: f64 = 0.05;
    const MOUTH_CLOSED: f64 = 0.1;
    const MOUTH_OPEN: f64 = 0.6;

    fn face(left_ear: f64, right_ear: f64, mar: f64) -> LandmarkSet {
        synthetic_face(0.5, 0.5, 0.2, 0.25, left_ear, right_ear, mar)
    }

    #[test]
    fn neutral_face_emits_none() {
        let mut classifier = GestureClassifier::default();
        for _ in 0..50 {
            assert_eq!(
                classifier.update(Some(&face(OPEN, OPEN, MOUTH_CLOSED))),
                GestureLabel::None
            );
        }
    }

    #[test]
    fn blink_both_fires_on_third_frame_then_cools_down() {
        let mut classifier = GestureClassifier::default();
        let closed = face(CLOSED, CLOSED, MOUTH_CLOSED);

        assert_eq!(classifier.update(Some(&closed)), GestureLabel::None);
        assert_eq!(classifier.update(Some(&closed)), GestureLabel::None);
        assert_eq!(classifier.update(Some(&closed)), GestureLabel::BlinkBoth);

        // Eyes stay closed; the cooldown suppresses every further emission.
        for frame in 0..14 {
            assert_eq!(
                classifier.update(Some(&closed)),
                GestureLabel::None,
                "frame {} after blink_both should be suppressed",
                frame
            );
        }
    }

    #[test]
    fn blink_left_requires_four_frames_and_quiet_right_eye() {
        let mut classifier = GestureClassifier::default();
        let left_closed = face(CLOSED, OPEN, MOUTH_CLOSED);

        for _ in 0..3 {
            assert_eq!(classifier.update(Some(&left_closed)), GestureLabel::None);
        }
        assert_eq!(classifier.update(Some(&left_closed)), GestureLabel::BlinkLeft);
    }

    #[test]
    fn one_closed_right_frame_vetoes_blink_left() {
        let mut classifier = GestureClassifier::default();
        let left_closed = face(CLOSED, OPEN, MOUTH_CLOSED);
        let both_closed = face(CLOSED, CLOSED, MOUTH_CLOSED);

        classifier.update(Some(&left_closed));
        classifier.update(Some(&left_closed));
        classifier.update(Some(&left_closed));
        // Right eye records one closed frame; the wink's strict zero-frame
        // condition on the other eye must now reject blink_left.
        assert_eq!(classifier.update(Some(&both_closed)), GestureLabel::None);
    }

    #[test]
    fn blink_right_mirrors_blink_left() {
        let mut classifier = GestureClassifier::default();
        let right_closed = face(OPEN, CLOSED, MOUTH_CLOSED);

        for _ in 0..3 {
            assert_eq!(classifier.update(Some(&right_closed)), GestureLabel::None);
        }
        assert_eq!(
            classifier.update(Some(&right_closed)),
            GestureLabel::BlinkRight
        );
    }

    #[test]
    fn mouth_open_fires_on_sixth_frame_with_longer_cooldown() {
        let mut classifier = GestureClassifier::default();
        let open = face(OPEN, OPEN, MOUTH_OPEN);

        for _ in 0..5 {
            assert_eq!(classifier.update(Some(&open)), GestureLabel::None);
        }
        assert_eq!(classifier.update(Some(&open)), GestureLabel::MouthOpen);

        for frame in 0..20 {
            assert_eq!(
                classifier.update(Some(&open)),
                GestureLabel::None,
                "frame {} after mouth_open should be suppressed",
                frame
            );
        }
    }

    #[test]
    fn blink_both_outranks_winks() {
        let mut classifier = GestureClassifier::default();
        // Left eye leads by one frame, then both close: run lengths end up
        // 4/3, which satisfies both blink_both and (numerically) the left
        // wink count. Priority must pick blink_both.
        let left_closed = face(CLOSED, OPEN, MOUTH_CLOSED);
        let both_closed = face(CLOSED, CLOSED, MOUTH_CLOSED);

        classifier.update(Some(&left_closed));
        classifier.update(Some(&both_closed));
        classifier.update(Some(&both_closed));
        assert_eq!(classifier.update(Some(&both_closed)), GestureLabel::BlinkBoth);
    }

    #[test]
    fn dropped_frames_leave_counters_untouched() {
        let mut classifier = GestureClassifier::default();
        let closed = face(CLOSED, CLOSED, MOUTH_CLOSED);

        classifier.update(Some(&closed));
        classifier.update(Some(&closed));
        // Face lost for a frame: not an eyes-open observation.
        assert_eq!(classifier.update(None), GestureLabel::None);
        assert_eq!(classifier.update(Some(&closed)), GestureLabel::BlinkBoth);
    }

    #[test]
    fn degenerate_eye_span_reads_as_open() {
        let mut classifier = GestureClassifier::default();
        // Collapse the left eye corners onto one point: EAR falls back to
        // 1.0, so no closed frames accumulate.
        let mut set = face(CLOSED, OPEN, MOUTH_CLOSED);
        let corner = set.point(crate::landmarks::LEFT_EYE_OUTER);
        set.set_point(crate::landmarks::LEFT_EYE_INNER, corner);
        for _ in 0..10 {
            assert_eq!(classifier.update(Some(&set)), GestureLabel::None);
        }
    }

    #[test]
    fn degenerate_mouth_span_reads_as_closed() {
        let mut classifier = GestureClassifier::default();
        let mut set = face(OPEN, OPEN, MOUTH_OPEN);
        let corner = set.point(crate::landmarks::LEFT_MOUTH);
        set.set_point(crate::landmarks::RIGHT_MOUTH, corner);
        for _ in 0..10 {
            assert_eq!(classifier.update(Some(&set)), GestureLabel::None);
        }
    }

    #[test]
    fn labels_serialize_snake_case() {
        assert_eq!(
            serde_json::to_string(&GestureLabel::BlinkBoth).unwrap(),
            "\"blink_both\""
        );
        assert_eq!(
            serde_json::from_str::<GestureLabel>("\"mouth_open\"").unwrap(),
            GestureLabel::MouthOpen
        );
        assert_eq!(GestureLabel::None.as_str(), "none");
    }
}
