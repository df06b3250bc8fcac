//! Core building blocks for monocular depth evaluation.
//!
//! This crate contains:
//! - per-sample depth error metrics ([`compute_errors`], [`d1_all`]),
//! - validity masks and the standard evaluation crops ([`mask`]),
//! - raster utilities: bilinear resize, prediction-to-depth conversion,
//!   and a colormap for diagnostic output.
//!
//! Depth and disparity maps are `ndarray::Array2<f32>` in row-major image
//! layout (row 0 at the top). Metric accumulation is done in `f64`.

/// Colormap rendering for diagnostic depth images.
pub mod colormap;
/// Prediction-to-depth conversion paths.
pub mod convert;
/// Validity masks and crop presets.
pub mod mask;
/// Per-sample error metrics.
pub mod metrics;
/// Bilinear raster resize.
pub mod resize;

pub use colormap::colorize_depth;
pub use convert::{
    depth_from_disparity, depth_from_inverse_depth, zero_non_finite, PredictionKind,
};
pub use mask::{apply_crop, depth_range_mask, masked_pixels, positive_mask, CropPreset};
pub use metrics::{clamp_depth, compute_errors, d1_all, DepthErrors, MetricsError};
pub use resize::resize_bilinear;
