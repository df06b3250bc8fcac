//! Validity masks and the standard evaluation crops.

use ndarray::{s, Array2};
use serde::{Deserialize, Serialize};

/// Fixed fractional crop rectangles used by the depth-estimation literature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CropPreset {
    /// Crop used by Garg et al., ECCV 2016.
    Garg,
    /// Crop reproducing the Eigen et al., NIPS 2014 evaluation region.
    Eigen,
}

/// Integer pixel bounds of a crop for a concrete image size.
///
/// Rows `row_start..row_end`, columns `col_start..col_end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropBounds {
    pub row_start: usize,
    pub row_end: usize,
    pub col_start: usize,
    pub col_end: usize,
}

impl CropPreset {
    /// Fractional bounds `[row_lo, row_hi, col_lo, col_hi]` of the preset.
    pub fn fractions(self) -> [f64; 4] {
        match self {
            CropPreset::Garg => [0.408_108_11, 0.991_891_89, 0.035_947_71, 0.964_052_29],
            CropPreset::Eigen => [0.332_432_4, 0.913_513_51, 0.035_947_7, 0.964_052_29],
        }
    }

    /// Resolve the fractional bounds for an image of `height` x `width`.
    ///
    /// Fractions are truncated toward zero. On a 370x1224 image the Garg
    /// preset yields rows 151..366 and columns 43..1180.
    pub fn bounds(self, height: usize, width: usize) -> CropBounds {
        let f = self.fractions();
        CropBounds {
            row_start: (f[0] * height as f64) as usize,
            row_end: (f[1] * height as f64) as usize,
            col_start: (f[2] * width as f64) as usize,
            col_end: (f[3] * width as f64) as usize,
        }
    }
}

/// Mask of pixels strictly inside the evaluation depth range.
pub fn depth_range_mask(depth: &Array2<f32>, min_depth: f32, max_depth: f32) -> Array2<bool> {
    depth.mapv(|v| v > min_depth && v < max_depth)
}

/// Mask of pixels with positive disparity (KITTI stereo ground truth marks
/// missing pixels with zero).
pub fn positive_mask(disp: &Array2<f32>) -> Array2<bool> {
    disp.mapv(|v| v > 0.0)
}

/// Intersect `mask` with the crop rectangle of `preset` in place.
pub fn apply_crop(mask: &mut Array2<bool>, preset: CropPreset) {
    let (height, width) = mask.dim();
    let b = preset.bounds(height, width);

    let mut cropped = Array2::from_elem((height, width), false);
    cropped
        .slice_mut(s![b.row_start..b.row_end, b.col_start..b.col_end])
        .assign(&mask.slice(s![b.row_start..b.row_end, b.col_start..b.col_end]));
    *mask = cropped;
}

/// Extract the masked pixels of `map` in row-major order.
///
/// Panics if the shapes disagree; maps and masks for one sample always share
/// the ground-truth resolution.
pub fn masked_pixels(map: &Array2<f32>, mask: &Array2<bool>) -> Vec<f32> {
    assert_eq!(map.dim(), mask.dim(), "map and mask shapes must agree");
    map.iter()
        .zip(mask.iter())
        .filter_map(|(&v, &keep)| keep.then_some(v))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, Array2};

    #[test]
    fn garg_bounds_match_published_crop() {
        let b = CropPreset::Garg.bounds(370, 1224);
        assert_eq!(
            b,
            CropBounds {
                row_start: 151,
                row_end: 366,
                // 0.03594771 * 1224 = 43.9999970, truncated.
                col_start: 43,
                col_end: 1180,
            }
        );
    }

    #[test]
    fn eigen_bounds_truncate_toward_zero() {
        let b = CropPreset::Eigen.bounds(375, 1242);
        assert_eq!(b.row_start, (0.332_432_4_f64 * 375.0) as usize);
        assert_eq!(b.row_end, (0.913_513_51_f64 * 375.0) as usize);
        assert_eq!(b.col_start, (0.035_947_7_f64 * 1242.0) as usize);
        assert_eq!(b.col_end, (0.964_052_29_f64 * 1242.0) as usize);
    }

    #[test]
    fn crop_pixel_count_matches_bounds() {
        let mut mask = Array2::from_elem((370, 1224), true);
        apply_crop(&mut mask, CropPreset::Garg);

        let expected = (366 - 151) * (1180 - 43);
        assert_eq!(mask.iter().filter(|&&m| m).count(), expected);
    }

    #[test]
    fn range_mask_uses_strict_inequalities() {
        let depth = array![[1.0_f32, 1.5], [80.0, 79.9]];
        let mask = depth_range_mask(&depth, 1.0, 80.0);
        assert_eq!(mask, array![[false, true], [false, true]]);
    }

    #[test]
    fn positive_mask_drops_zero_disparity() {
        let disp = array![[0.0_f32, 2.0], [-1.0, 0.5]];
        let mask = positive_mask(&disp);
        assert_eq!(mask, array![[false, true], [false, true]]);
    }

    #[test]
    fn masked_pixels_are_row_major() {
        let map = array![[1.0_f32, 2.0], [3.0, 4.0]];
        let mask = array![[true, false], [true, true]];
        assert_eq!(masked_pixels(&map, &mask), vec![1.0, 3.0, 4.0]);
    }
}
