//! Diagnostic colormap dumps, one prediction/gt image pair per sample.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use depth_eval_core::colorize_depth;
use ndarray::Array2;

/// Write `{index:010}.png` (prediction) and `{index:010}_GT.png` (ground
/// truth) under `output_dir`, creating the directory if needed.
pub fn save_sample_pair(
    output_dir: &Path,
    index: usize,
    pred: &Array2<f32>,
    gt: &Array2<f32>,
) -> Result<()> {
    fs::create_dir_all(output_dir)
        .with_context(|| format!("creating output directory '{}'", output_dir.display()))?;

    let pred_path = output_dir.join(format!("{index:010}.png"));
    colorize_depth(pred)
        .save(&pred_path)
        .with_context(|| format!("writing '{}'", pred_path.display()))?;

    let gt_path = output_dir.join(format!("{index:010}_GT.png"));
    colorize_depth(gt)
        .save(&gt_path)
        .with_context(|| format!("writing '{}'", gt_path.display()))?;

    Ok(())
}
