//! Per-split evaluation pipelines for monocular depth predictions.
//!
//! A run loads a stack of predicted disparity/depth maps, pairs every sample
//! with KITTI ground truth, converts predictions to metric depth, applies the
//! validity mask and optional crop, computes per-sample error metrics and
//! averages them into an [`EvalReport`].

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{ensure, Context, Result};
use log::{debug, info, warn};
use ndarray::{Array3, Axis};
use serde::{Deserialize, Serialize};

use depth_eval_core::{
    apply_crop, clamp_depth, compute_errors, d1_all, depth_from_disparity,
    depth_from_inverse_depth, depth_range_mask, masked_pixels, positive_mask, resize_bilinear,
    zero_non_finite, CropPreset, DepthErrors, PredictionKind,
};
use depth_eval_data::{
    convert_stereo_disps_to_depths, focal_length_baseline, generate_depth_map, load_predictions,
    load_stereo_gt_disparities, read_file_data, read_text_lines, CalibFile,
};

pub mod visualize;

/// Dataset split to evaluate against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Split {
    /// KITTI 2015 stereo training set (200 frames, gt disparities).
    Kitti,
    /// Eigen et al. raw-data test split (velodyne-projected gt depths).
    Eigen,
}

impl FromStr for Split {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "kitti" => Ok(Split::Kitti),
            "eigen" => Ok(Split::Eigen),
            other => anyhow::bail!("unknown split '{other}' (expected 'kitti' or 'eigen')"),
        }
    }
}

impl fmt::Display for Split {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Split::Kitti => write!(f, "kitti"),
            Split::Eigen => write!(f, "eigen"),
        }
    }
}

/// Evaluation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvalConfig {
    pub split: Split,
    /// Minimum evaluation depth in meters.
    pub min_depth: f32,
    /// Maximum evaluation depth in meters.
    pub max_depth: f32,
    /// Optional fixed crop applied to the validity mask (eigen split only).
    pub crop: Option<CropPreset>,
    /// Representation of the predicted arrays.
    pub prediction_kind: PredictionKind,
    /// Write colorized prediction/gt PNGs per sample.
    pub save_visualized: bool,
    /// Directory for visualization output.
    pub output_dir: PathBuf,
    /// Accepted for command-line compatibility; official benchmark depth
    /// maps are not loaded.
    pub use_official: bool,
}

impl EvalConfig {
    pub fn new(split: Split) -> Self {
        Self {
            split,
            min_depth: 1.0,
            max_depth: 80.0,
            crop: None,
            prediction_kind: PredictionKind::Disparity,
            save_visualized: false,
            output_dir: PathBuf::from("tmp/result"),
            use_official: false,
        }
    }
}

/// Metric means over all evaluated samples.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvalReport {
    pub num_samples: usize,
    pub abs_rel: f64,
    pub sq_rel: f64,
    pub rms: f64,
    pub log_rms: f64,
    /// D1-all bad-pixel percentage; zero for splits/modes without disparity
    /// ground truth.
    pub d1_all: f64,
    pub a1: f64,
    pub a2: f64,
    pub a3: f64,
}

impl EvalReport {
    /// Fixed-width table: a header row and one row of values.
    pub fn table(&self) -> String {
        let header = format!(
            "{:>10}, {:>10}, {:>10}, {:>10}, {:>10}, {:>10}, {:>10}, {:>10}",
            "abs_rel", "sq_rel", "rms", "log_rms", "d1_all", "a1", "a2", "a3"
        );
        let values = format!(
            "{:10.4}, {:10.4}, {:10.3}, {:10.3}, {:10.3}, {:10.3}, {:10.3}, {:10.3}",
            self.abs_rel,
            self.sq_rel,
            self.rms,
            self.log_rms,
            self.d1_all,
            self.a1,
            self.a2,
            self.a3
        );
        format!("{header}\n{values}")
    }
}

/// Evaluate a prediction stack against the configured split.
pub fn evaluate(config: &EvalConfig, pred_path: &Path, gt_path: &Path) -> Result<EvalReport> {
    if config.use_official {
        warn!("--use-official is accepted but ignored; evaluating against split ground truth");
    }

    let predictions = load_predictions(pred_path)
        .with_context(|| format!("loading predictions from '{}'", pred_path.display()))?;
    info!(
        "loaded {} predicted maps ({} split, {:?} predictions)",
        predictions.len_of(Axis(0)),
        config.split,
        config.prediction_kind
    );

    match config.split {
        Split::Kitti => evaluate_kitti(config, &predictions, gt_path),
        Split::Eigen => evaluate_eigen(config, &predictions, gt_path),
    }
}

fn evaluate_kitti(
    config: &EvalConfig,
    predictions: &Array3<f32>,
    gt_dir: &Path,
) -> Result<EvalReport> {
    let gt_disparities = load_stereo_gt_disparities(gt_dir)
        .with_context(|| format!("loading stereo ground truth from '{}'", gt_dir.display()))?;
    let stereo = convert_stereo_disps_to_depths(&gt_disparities, predictions)?;

    let mut errors = Vec::with_capacity(gt_disparities.len());
    let mut d1 = Vec::with_capacity(gt_disparities.len());

    for (i, gt_disp) in gt_disparities.iter().enumerate() {
        let (height, width) = gt_disp.dim();
        let gt_depth = &stereo.gt_depths[i];

        let mut pred_depth = match config.prediction_kind {
            PredictionKind::Disparity => stereo.pred_depths[i].clone(),
            PredictionKind::Depth => {
                let mut d = resize_bilinear(&predictions.index_axis(Axis(0), i).to_owned(), height, width);
                zero_non_finite(&mut d);
                d
            }
            PredictionKind::InverseDepth => {
                depth_from_inverse_depth(&predictions.index_axis(Axis(0), i).to_owned(), height, width)
            }
        };
        clamp_depth(&mut pred_depth, config.min_depth, config.max_depth);

        let mask = positive_mask(gt_disp);
        if config.prediction_kind == PredictionKind::Disparity {
            d1.push(d1_all(
                &masked_pixels(gt_disp, &mask),
                &masked_pixels(&stereo.pred_disps[i], &mask),
            )?);
        } else {
            // The resized stack does not hold disparities in this mode, so
            // the bad-pixel rate is not defined.
            d1.push(0.0);
        }

        errors.push(compute_errors(
            &masked_pixels(gt_depth, &mask),
            &masked_pixels(&pred_depth, &mask),
        )?);
        debug!("sample {i}: abs_rel {:.4}", errors[i].abs_rel);

        if config.save_visualized {
            visualize::save_sample_pair(&config.output_dir, i, &pred_depth, gt_disp)?;
        }
    }

    if config.prediction_kind != PredictionKind::Disparity {
        warn!("d1_all reported as 0: predictions are not disparities");
    }
    if config.crop.is_some() {
        warn!("crop presets only apply to the eigen split; ignoring");
    }

    Ok(aggregate(&errors, &d1))
}

fn evaluate_eigen(
    config: &EvalConfig,
    predictions: &Array3<f32>,
    gt_path: &Path,
) -> Result<EvalReport> {
    let lines = read_text_lines(&gt_path.join("eigen_test_files.txt"))?;
    let samples = read_file_data(&lines, gt_path)?;
    ensure!(
        predictions.len_of(Axis(0)) == samples.len(),
        "prediction stack has {} samples but the split provides {}",
        predictions.len_of(Axis(0)),
        samples.len()
    );

    // The split shares one calibration per recording date.
    let mut focal_cache: HashMap<PathBuf, (f64, f64)> = HashMap::new();

    let mut errors = Vec::with_capacity(samples.len());
    for (i, sample) in samples.iter().enumerate() {
        let gt_depth = generate_depth_map(
            &sample.calib_dir,
            &sample.velodyne_path,
            sample.height,
            sample.width,
            sample.camera_id,
        )
        .with_context(|| format!("projecting ground truth for sample {i}"))?;

        let pred = predictions.index_axis(Axis(0), i).to_owned();
        let mut pred_depth = match config.prediction_kind {
            PredictionKind::InverseDepth => {
                depth_from_inverse_depth(&pred, sample.height, sample.width)
            }
            PredictionKind::Depth => {
                let mut d = resize_bilinear(&pred, sample.height, sample.width);
                zero_non_finite(&mut d);
                d
            }
            PredictionKind::Disparity => {
                let (focal, baseline) = match focal_cache.get(&sample.calib_dir) {
                    Some(&cached) => cached,
                    None => {
                        let cam2cam =
                            CalibFile::read(&sample.calib_dir.join("calib_cam_to_cam.txt"))?;
                        let fb = focal_length_baseline(&cam2cam, sample.camera_id)?;
                        focal_cache.insert(sample.calib_dir.clone(), fb);
                        fb
                    }
                };
                // Predicted disparities are fractions of image width.
                let mut disp = resize_bilinear(&pred, sample.height, sample.width);
                disp.mapv_inplace(|d| d * sample.width as f32);
                depth_from_disparity(&disp, focal as f32, baseline as f32)
            }
        };
        clamp_depth(&mut pred_depth, config.min_depth, config.max_depth);

        let mut mask = depth_range_mask(&gt_depth, config.min_depth, config.max_depth);
        if let Some(preset) = config.crop {
            apply_crop(&mut mask, preset);
        }

        errors.push(compute_errors(
            &masked_pixels(&gt_depth, &mask),
            &masked_pixels(&pred_depth, &mask),
        )?);
        debug!("sample {i}: abs_rel {:.4}", errors[i].abs_rel);

        if config.save_visualized {
            visualize::save_sample_pair(&config.output_dir, i, &pred_depth, &gt_depth)?;
        }
    }

    let d1 = vec![0.0; errors.len()];
    Ok(aggregate(&errors, &d1))
}

fn aggregate(errors: &[DepthErrors], d1: &[f64]) -> EvalReport {
    let n = errors.len() as f64;
    let mean = |f: fn(&DepthErrors) -> f64| errors.iter().map(f).sum::<f64>() / n;

    EvalReport {
        num_samples: errors.len(),
        abs_rel: mean(|e| e.abs_rel),
        sq_rel: mean(|e| e.sq_rel),
        rms: mean(|e| e.rms),
        log_rms: mean(|e| e.log_rms),
        d1_all: d1.iter().sum::<f64>() / d1.len() as f64,
        a1: mean(|e| e.a1),
        a2: mean(|e| e.a2),
        a3: mean(|e| e.a3),
    }
}
