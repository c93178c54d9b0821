//! Tracking point extraction.
//!
//! Maps a landmark set plus the configured tracking mode to a raw pointer
//! position in normalized image coordinates. Pure function of its inputs;
//! the mode is fixed for the lifetime of a run.

use std::fmt;
use std::str::FromStr;

use anyhow::anyhow;

use crate::landmarks::{
    LandmarkSet, CHIN, FOREHEAD, LEFT_EYE_INNER, LEFT_EYE_OUTER, LEFT_MOUTH, LOWER_LIP, NOSE_TIP,
    RIGHT_EYE_INNER, RIGHT_EYE_OUTER, RIGHT_MOUTH, UPPER_LIP,
};

/// Which facial feature drives the pointer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TrackingMode {
    #[default]
    Nose,
    Head,
    Eyes,
    Mouth,
}

impl TrackingMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Nose => "nose",
            Self::Head => "head",
            Self::Eyes => "eyes",
            Self::Mouth => "mouth",
        }
    }
}

impl fmt::Display for TrackingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TrackingMode {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "nose" => Ok(Self::Nose),
            "head" => Ok(Self::Head),
            "eyes" => Ok(Self::Eyes),
            "mouth" => Ok(Self::Mouth),
            other => Err(anyhow!(
                "unknown tracking mode '{}' (expected nose, head, eyes, or mouth)",
                other
            )),
        }
    }
}

/// Raw pointer position for one frame.
pub fn tracking_point(mode: TrackingMode, landmarks: &LandmarkSet) -> (f64, f64) {
    match mode {
        TrackingMode::Nose => {
            let nose = landmarks.point(NOSE_TIP);
            (nose.x, nose.y)
        }
        TrackingMode::Head => {
            let forehead = landmarks.point(FOREHEAD);
            let chin = landmarks.point(CHIN);
            ((forehead.x + chin.x) / 2.0, (forehead.y + chin.y) / 2.0)
        }
        TrackingMode::Eyes => {
            let left_x =
                (landmarks.point(LEFT_EYE_INNER).x + landmarks.point(LEFT_EYE_OUTER).x) / 2.0;
            let left_y =
                (landmarks.point(LEFT_EYE_INNER).y + landmarks.point(LEFT_EYE_OUTER).y) / 2.0;
            let right_x =
                (landmarks.point(RIGHT_EYE_INNER).x + landmarks.point(RIGHT_EYE_OUTER).x) / 2.0;
            let right_y =
                (landmarks.point(RIGHT_EYE_INNER).y + landmarks.point(RIGHT_EYE_OUTER).y) / 2.0;
            ((left_x + right_x) / 2.0, (left_y + right_y) / 2.0)
        }
        TrackingMode::Mouth => {
            let x = (landmarks.point(LEFT_MOUTH).x + landmarks.point(RIGHT_MOUTH).x) / 2.0;
            let y = (landmarks.point(UPPER_LIP).y + landmarks.point(LOWER_LIP).y) / 2.0;
            (x, y)
        }
    }
}
