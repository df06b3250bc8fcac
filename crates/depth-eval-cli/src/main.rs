use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use depth_eval_core::{CropPreset, PredictionKind};
use depth_eval_pipeline::{evaluate, EvalConfig, EvalReport, Split};

/// Evaluation of monocular depth predictions on the KITTI dataset.
#[derive(Debug, Parser)]
#[command(author, version, about = "Depth-estimation error metrics on KITTI splits")]
struct Args {
    /// Data split: kitti or eigen.
    #[arg(long)]
    split: Split,

    /// Path to the estimated disparities (.npy stack).
    #[arg(long = "predicted_disp_path")]
    predicted_disp_path: PathBuf,

    /// Path to the ground-truth data root.
    #[arg(long = "gt_path")]
    gt_path: PathBuf,

    /// Minimum depth for evaluation (meters).
    #[arg(long = "min_depth", default_value_t = 1.0)]
    min_depth: f32,

    /// Maximum depth for evaluation (meters).
    #[arg(long = "max_depth", default_value_t = 80.0)]
    max_depth: f32,

    /// Crop according to Eigen NIPS14.
    #[arg(long = "eigen_crop", conflicts_with = "garg_crop")]
    eigen_crop: bool,

    /// Crop according to Garg ECCV16.
    #[arg(long = "garg_crop")]
    garg_crop: bool,

    /// Write colorized prediction/gt images per sample.
    #[arg(long = "save_visualized")]
    save_visualized: bool,

    /// Predictions are depths instead of disparities.
    #[arg(long = "depth_provided", conflicts_with = "invdepth_provided")]
    depth_provided: bool,

    /// Predictions are inverse depths instead of disparities.
    #[arg(long = "invdepth_provided")]
    invdepth_provided: bool,

    /// Accepted for compatibility; official benchmark depth is not loaded.
    #[arg(long = "use_official")]
    use_official: bool,

    /// Directory for visualization output.
    #[arg(long = "output_dir", default_value = "tmp/result")]
    output_dir: PathBuf,
}

impl Args {
    fn config(&self) -> EvalConfig {
        let crop = if self.garg_crop {
            Some(CropPreset::Garg)
        } else if self.eigen_crop {
            Some(CropPreset::Eigen)
        } else {
            None
        };

        let prediction_kind = if self.depth_provided {
            PredictionKind::Depth
        } else if self.invdepth_provided {
            PredictionKind::InverseDepth
        } else {
            PredictionKind::Disparity
        };

        EvalConfig {
            split: self.split,
            min_depth: self.min_depth,
            max_depth: self.max_depth,
            crop,
            prediction_kind,
            save_visualized: self.save_visualized,
            output_dir: self.output_dir.clone(),
            use_official: self.use_official,
        }
    }
}

fn run(args: &Args) -> Result<EvalReport> {
    evaluate(&args.config(), &args.predicted_disp_path, &args.gt_path)
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    if let Err(err) = try_main() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

fn try_main() -> Result<()> {
    let args = Args::parse();
    let report = run(&args)?;
    println!("{}", report.table());
    Ok(())
}
