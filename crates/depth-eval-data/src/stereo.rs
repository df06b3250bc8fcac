//! KITTI 2015 stereo ground truth and disparity-to-depth conversion.

use std::path::Path;

use depth_eval_core::{positive_mask, resize_bilinear, zero_non_finite};
use ndarray::{Array2, Array3, Axis};
use thiserror::Error;

/// Number of frames in the KITTI 2015 stereo training set.
pub const STEREO_NUM_SAMPLES: usize = 200;

/// Stereo baseline of the KITTI color-camera pair in meters.
pub const KITTI_BASELINE_M: f32 = 0.54;

#[derive(Debug, Error)]
pub enum StereoGtError {
    #[error("failed to read ground-truth disparity '{path}': {source}")]
    Image {
        path: String,
        #[source]
        source: image::ImageError,
    },
    #[error("no focal length known for image width {0}")]
    UnknownWidth(usize),
    #[error(
        "prediction stack has {predictions} samples but the split provides {ground_truth}"
    )]
    SampleCountMismatch {
        predictions: usize,
        ground_truth: usize,
    },
}

/// Focal length of the rectified KITTI cameras, keyed by image width.
pub fn focal_for_width(width: usize) -> Result<f32, StereoGtError> {
    match width {
        1242 => Ok(721.5377),
        1241 => Ok(718.856),
        1224 => Ok(707.0493),
        1238 => Ok(718.3351),
        other => Err(StereoGtError::UnknownWidth(other)),
    }
}

/// Load the 200 training ground-truth disparity maps
/// (`training/disp_noc_0/{i:06}_10.png`). Disparities are stored as 16-bit
/// PNGs scaled by 256; zero marks missing pixels.
pub fn load_stereo_gt_disparities(gt_dir: &Path) -> Result<Vec<Array2<f32>>, StereoGtError> {
    let mut disparities = Vec::with_capacity(STEREO_NUM_SAMPLES);
    for i in 0..STEREO_NUM_SAMPLES {
        let path = gt_dir
            .join("training")
            .join("disp_noc_0")
            .join(format!("{i:06}_10.png"));
        disparities.push(read_disparity_png(&path)?);
    }
    Ok(disparities)
}

/// Decode one 16-bit disparity PNG into a float map (value / 256).
pub fn read_disparity_png(path: &Path) -> Result<Array2<f32>, StereoGtError> {
    let img = image::open(path)
        .map_err(|source| StereoGtError::Image {
            path: path.display().to_string(),
            source,
        })?
        .to_luma16();
    let (width, height) = img.dimensions();

    Ok(Array2::from_shape_fn(
        (height as usize, width as usize),
        |(row, col)| img.get_pixel(col as u32, row as u32)[0] as f32 / 256.0,
    ))
}

/// Per-sample output of [`convert_stereo_disps_to_depths`].
#[derive(Debug, Clone)]
pub struct StereoDepths {
    /// Ground-truth depths from gt disparities.
    pub gt_depths: Vec<Array2<f32>>,
    /// Predicted depths from resized predicted disparities.
    pub pred_depths: Vec<Array2<f32>>,
    /// Predicted disparities resized to gt resolution and scaled to pixels
    /// (needed for the D1-all bad-pixel rate).
    pub pred_disps: Vec<Array2<f32>>,
}

/// Convert gt and predicted disparities to depth maps.
///
/// Predicted disparities are fractions of image width; they are resized to
/// the gt resolution and scaled by the gt width. Ground-truth zeros are kept
/// finite by adding one to missing pixels before division (those pixels are
/// masked out downstream anyway).
pub fn convert_stereo_disps_to_depths(
    gt_disparities: &[Array2<f32>],
    predictions: &Array3<f32>,
) -> Result<StereoDepths, StereoGtError> {
    if predictions.len_of(Axis(0)) != gt_disparities.len() {
        return Err(StereoGtError::SampleCountMismatch {
            predictions: predictions.len_of(Axis(0)),
            ground_truth: gt_disparities.len(),
        });
    }

    let mut gt_depths = Vec::with_capacity(gt_disparities.len());
    let mut pred_depths = Vec::with_capacity(gt_disparities.len());
    let mut pred_disps = Vec::with_capacity(gt_disparities.len());

    for (gt_disp, pred) in gt_disparities.iter().zip(predictions.axis_iter(Axis(0))) {
        let (height, width) = gt_disp.dim();
        let focal = focal_for_width(width)?;
        let depth_scale = focal * KITTI_BASELINE_M;

        let mut pred_disp = resize_bilinear(&pred.to_owned(), height, width);
        pred_disp.mapv_inplace(|d| d * width as f32);

        let mask = positive_mask(gt_disp);
        let mut gt_depth = Array2::zeros((height, width));
        for ((g, &m), out) in gt_disp.iter().zip(mask.iter()).zip(gt_depth.iter_mut()) {
            let denom = g + if m { 0.0 } else { 1.0 };
            *out = depth_scale / denom;
        }

        let mut pred_depth = pred_disp.mapv(|d| depth_scale / d);
        zero_non_finite(&mut pred_depth);

        gt_depths.push(gt_depth);
        pred_depths.push(pred_depth);
        pred_disps.push(pred_disp);
    }

    Ok(StereoDepths {
        gt_depths,
        pred_depths,
        pred_disps,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::Array3;
    use tempfile::tempdir;

    #[test]
    fn focal_table_covers_kitti_widths() {
        assert_abs_diff_eq!(focal_for_width(1242).unwrap(), 721.5377);
        assert_abs_diff_eq!(focal_for_width(1241).unwrap(), 718.856);
        assert_abs_diff_eq!(focal_for_width(1224).unwrap(), 707.0493);
        assert_abs_diff_eq!(focal_for_width(1238).unwrap(), 718.3351);
        assert!(matches!(
            focal_for_width(640),
            Err(StereoGtError::UnknownWidth(640))
        ));
    }

    #[test]
    fn disparity_png_decodes_as_value_over_256() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("disp.png");

        let mut img = image::ImageBuffer::<image::Luma<u16>, Vec<u16>>::new(3, 2);
        img.put_pixel(0, 0, image::Luma([256 * 10]));
        img.put_pixel(2, 1, image::Luma([128]));
        img.save(&path).unwrap();

        let disp = read_disparity_png(&path).unwrap();
        assert_eq!(disp.dim(), (2, 3));
        assert_abs_diff_eq!(disp[(0, 0)], 10.0);
        assert_abs_diff_eq!(disp[(1, 2)], 0.5);
        assert_abs_diff_eq!(disp[(0, 1)], 0.0);
    }

    #[test]
    fn conversion_matches_depth_formula() {
        // One 2x1242 gt sample: disparity 100 px at (0, 0), missing at rest.
        let mut gt = Array2::<f32>::zeros((2, 1242));
        gt[(0, 0)] = 100.0;

        // Prediction already at gt resolution, disparity as width fraction.
        let mut preds = Array3::<f32>::zeros((1, 2, 1242));
        preds.fill(100.0 / 1242.0);

        let out = convert_stereo_disps_to_depths(&[gt], &preds).unwrap();
        let expected = 721.5377 * 0.54 / 100.0;
        assert_abs_diff_eq!(out.gt_depths[0][(0, 0)], expected, epsilon = 1e-3);
        assert_abs_diff_eq!(out.pred_depths[0][(0, 0)], expected, epsilon = 1e-3);
        assert_abs_diff_eq!(out.pred_disps[0][(0, 0)], 100.0, epsilon = 1e-3);

        // Missing gt pixels become depth_scale / 1, finite by construction.
        assert!(out.gt_depths[0][(1, 5)].is_finite());
    }

    #[test]
    fn sample_count_mismatch_is_rejected() {
        let gt = vec![Array2::<f32>::zeros((2, 1242))];
        let preds = Array3::<f32>::zeros((3, 2, 1242));
        assert!(matches!(
            convert_stereo_disps_to_depths(&gt, &preds),
            Err(StereoGtError::SampleCountMismatch { .. })
        ));
    }
}
