//! Synthetic landmark geometry.
//!
//! Builds fully populated landmark sets from a face box plus target aperture
//! ratios. Used by the fallback detectors (which only see a box, not a mesh)
//! and by tests that need faces with exact EAR/MAR values.

use crate::landmarks::{
    Landmark, LandmarkSet, CHIN, FOREHEAD, LEFT_EYE_BOTTOM, LEFT_EYE_INNER, LEFT_EYE_OUTER,
    LEFT_EYE_TOP, LEFT_MOUTH, LOWER_LIP, NOSE_TIP, RIGHT_EYE_BOTTOM, RIGHT_EYE_INNER,
    RIGHT_EYE_OUTER, RIGHT_EYE_TOP, RIGHT_MOUTH, UPPER_LIP,
};

/// Build a landmark set for a face centered at `(cx, cy)` with the given
/// half-extents, left/right eye aspect ratios, and mouth aspect ratio.
///
/// The canonical indices are laid out so the classifier's measured ratios
/// equal the requested ones exactly; every other index sits at the face
/// center.
pub fn synthetic_face(
    cx: f64,
    cy: f64,
    half_w: f64,
    half_h: f64,
    left_ear: f64,
    right_ear: f64,
    mar: f64,
) -> LandmarkSet {
    let mut set = LandmarkSet::from_fn(|_| Landmark::new(cx, cy, 0.0));

    set.set_point(NOSE_TIP, Landmark::new(cx, cy, 0.0));
    set.set_point(FOREHEAD, Landmark::new(cx, cy - 0.8 * half_h, 0.0));
    set.set_point(CHIN, Landmark::new(cx, cy + 0.9 * half_h, 0.0));

    // Eyes: corners span 0.3 * half_w, lids split the requested EAR
    // symmetrically about the eye center.
    let eye_y = cy - 0.2 * half_h;
    let eye_span = 0.3 * half_w;

    let left_x = cx - 0.45 * half_w;
    set.set_point(LEFT_EYE_OUTER, Landmark::new(left_x - eye_span / 2.0, eye_y, 0.0));
    set.set_point(LEFT_EYE_INNER, Landmark::new(left_x + eye_span / 2.0, eye_y, 0.0));
    let left_lid = left_ear * eye_span / 2.0;
    set.set_point(LEFT_EYE_TOP, Landmark::new(left_x, eye_y - left_lid, 0.0));
    set.set_point(LEFT_EYE_BOTTOM, Landmark::new(left_x, eye_y + left_lid, 0.0));

    let right_x = cx + 0.45 * half_w;
    set.set_point(RIGHT_EYE_INNER, Landmark::new(right_x - eye_span / 2.0, eye_y, 0.0));
    set.set_point(RIGHT_EYE_OUTER, Landmark::new(right_x + eye_span / 2.0, eye_y, 0.0));
    let right_lid = right_ear * eye_span / 2.0;
    set.set_point(RIGHT_EYE_TOP, Landmark::new(right_x, eye_y - right_lid, 0.0));
    set.set_point(RIGHT_EYE_BOTTOM, Landmark::new(right_x, eye_y + right_lid, 0.0));

    // Mouth: corners span 0.6 * half_w, lips split the requested MAR.
    let mouth_y = cy + 0.55 * half_h;
    let mouth_span = 0.6 * half_w;
    set.set_point(LEFT_MOUTH, Landmark::new(cx - mouth_span / 2.0, mouth_y, 0.0));
    set.set_point(RIGHT_MOUTH, Landmark::new(cx + mouth_span / 2.0, mouth_y, 0.0));
    let lip = mar * mouth_span / 2.0;
    set.set_point(UPPER_LIP, Landmark::new(cx, mouth_y - lip, 0.0));
    set.set_point(LOWER_LIP, Landmark::new(cx, mouth_y + lip, 0.0));

    set
}
