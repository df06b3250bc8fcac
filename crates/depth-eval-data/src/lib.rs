//! KITTI data loading for depth evaluation.
//!
//! This crate contains the dataset-specific collaborators of the evaluation
//! pipeline:
//! - predicted disparity/depth stacks from `.npy` files ([`npy`]),
//! - KITTI 2015 stereo ground-truth disparities ([`stereo`]),
//! - raw-data calibration files and rectified projection matrices ([`calib`]),
//! - velodyne scans projected into sparse depth maps ([`velodyne`]),
//! - the Eigen raw-data test split ([`eigen_split`]).

/// KITTI raw-data calibration files.
pub mod calib;
/// Eigen test split file lists.
pub mod eigen_split;
/// Predicted array stacks.
pub mod npy;
/// KITTI 2015 stereo ground truth.
pub mod stereo;
/// Velodyne scans and their projection to depth maps.
pub mod velodyne;

pub use calib::{focal_length_baseline, CalibError, CalibFile};
pub use eigen_split::{read_file_data, read_text_lines, EigenSample, SplitError};
pub use npy::{load_predictions, PredictionError};
pub use stereo::{
    convert_stereo_disps_to_depths, focal_for_width, load_stereo_gt_disparities, StereoGtError,
    KITTI_BASELINE_M, STEREO_NUM_SAMPLES,
};
pub use velodyne::{generate_depth_map, load_velodyne_points, VelodyneError};
