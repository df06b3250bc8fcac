//! Conversion of predicted arrays to a common depth representation.
//!
//! Predictions arrive as one of three representations, selected by
//! configuration. Depth passes through resize untouched; inverse depth is
//! reciprocated after resize; disparity needs the per-sample focal length and
//! stereo baseline. Non-finite pixels produced by the divisions are zeroed,
//! which leaves them outside every validity mask.

use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::resize::resize_bilinear;

/// What the predicted arrays contain. The three variants are mutually
/// exclusive per evaluation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PredictionKind {
    /// Disparities, converted to depth via `baseline * focal / disparity`.
    Disparity,
    /// Metric depth in meters.
    Depth,
    /// Inverse depth, reciprocated after resize.
    InverseDepth,
}

/// Replace non-finite pixels with zero in place.
pub fn zero_non_finite(map: &mut Array2<f32>) {
    map.mapv_inplace(|v| if v.is_finite() { v } else { 0.0 });
}

/// Resize an inverse-depth prediction to the ground-truth resolution and
/// reciprocate it into depth.
pub fn depth_from_inverse_depth(pred: &Array2<f32>, height: usize, width: usize) -> Array2<f32> {
    let mut depth = resize_bilinear(pred, height, width);
    depth.mapv_inplace(|v| 1.0 / v);
    zero_non_finite(&mut depth);
    depth
}

/// Convert a disparity map (in pixels) to depth with the given focal length
/// (pixels) and stereo baseline (meters).
pub fn depth_from_disparity(disp: &Array2<f32>, focal: f32, baseline: f32) -> Array2<f32> {
    let mut depth = disp.mapv(|d| baseline * focal / d);
    zero_non_finite(&mut depth);
    depth
}
