//! Per-sample depth-estimation error metrics.

use ndarray::Array2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("ground truth and prediction have different pixel counts ({gt} vs {pred})")]
    PixelCountMismatch { gt: usize, pred: usize },
    #[error("no valid pixels to evaluate")]
    EmptyPixelSet,
}

/// Error metrics for one ground-truth/prediction pair, computed over the
/// masked pixel set.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct DepthErrors {
    /// Mean absolute relative error, `mean(|gt - pred| / gt)`.
    pub abs_rel: f64,
    /// Mean squared relative error, `mean((gt - pred)^2 / gt)`.
    pub sq_rel: f64,
    /// Root mean squared error in meters.
    pub rms: f64,
    /// Root mean squared error of log depths.
    pub log_rms: f64,
    /// Fraction of pixels with `max(gt/pred, pred/gt) < 1.25`.
    pub a1: f64,
    /// Same with threshold `1.25^2`.
    pub a2: f64,
    /// Same with threshold `1.25^3`.
    pub a3: f64,
}

/// Compute the standard error metrics over parallel masked pixel slices.
///
/// Callers are expected to have clamped `pred` to the evaluation depth range
/// and to pass only pixels with positive ground truth.
pub fn compute_errors(gt: &[f32], pred: &[f32]) -> Result<DepthErrors, MetricsError> {
    if gt.len() != pred.len() {
        return Err(MetricsError::PixelCountMismatch {
            gt: gt.len(),
            pred: pred.len(),
        });
    }
    if gt.is_empty() {
        return Err(MetricsError::EmptyPixelSet);
    }

    let n = gt.len() as f64;
    let mut abs_rel = 0.0;
    let mut sq_rel = 0.0;
    let mut sq_err = 0.0;
    let mut sq_log_err = 0.0;
    let mut a1 = 0usize;
    let mut a2 = 0usize;
    let mut a3 = 0usize;

    for (&g, &p) in gt.iter().zip(pred.iter()) {
        let g = g as f64;
        let p = p as f64;
        let diff = g - p;

        abs_rel += diff.abs() / g;
        sq_rel += diff * diff / g;
        sq_err += diff * diff;
        let log_diff = g.ln() - p.ln();
        sq_log_err += log_diff * log_diff;

        let thresh = (g / p).max(p / g);
        if thresh < 1.25 {
            a1 += 1;
        }
        if thresh < 1.25 * 1.25 {
            a2 += 1;
        }
        if thresh < 1.25 * 1.25 * 1.25 {
            a3 += 1;
        }
    }

    Ok(DepthErrors {
        abs_rel: abs_rel / n,
        sq_rel: sq_rel / n,
        rms: (sq_err / n).sqrt(),
        log_rms: (sq_log_err / n).sqrt(),
        a1: a1 as f64 / n,
        a2: a2 as f64 / n,
        a3: a3 as f64 / n,
    })
}

/// D1-all bad-pixel rate in percent over parallel masked disparity slices.
///
/// A pixel is bad when its absolute disparity error is at least 3 px and its
/// relative disparity error is at least 5 % (KITTI 2015 stereo convention).
pub fn d1_all(gt_disp: &[f32], pred_disp: &[f32]) -> Result<f64, MetricsError> {
    if gt_disp.len() != pred_disp.len() {
        return Err(MetricsError::PixelCountMismatch {
            gt: gt_disp.len(),
            pred: pred_disp.len(),
        });
    }
    if gt_disp.is_empty() {
        return Err(MetricsError::EmptyPixelSet);
    }

    let bad = gt_disp
        .iter()
        .zip(pred_disp.iter())
        .filter(|&(&g, &p)| {
            let diff = (g - p).abs();
            diff >= 3.0 && diff / g >= 0.05
        })
        .count();

    Ok(100.0 * bad as f64 / gt_disp.len() as f64)
}

/// Clamp a predicted depth map into the evaluation range in place.
pub fn clamp_depth(depth: &mut Array2<f32>, min_depth: f32, max_depth: f32) {
    depth.mapv_inplace(|v| v.clamp(min_depth, max_depth));
}
