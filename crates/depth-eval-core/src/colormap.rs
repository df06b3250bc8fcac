//! Colormap rendering for diagnostic depth images.

use image::{Rgb, RgbImage};
use ndarray::Array2;

/// Fixed visualization range in meters. Depth is clipped at the far bound and
/// rescaled from this range regardless of the evaluation depth limits.
const VIS_MIN_DEPTH: f32 = 1.0;
const VIS_MAX_DEPTH: f32 = 80.0;

/// Classic piecewise-linear jet ramp: blue at 0, red at 1.
#[inline]
fn jet(t: f32) -> [u8; 3] {
    let r = (1.5 - (4.0 * t - 3.0).abs()).clamp(0.0, 1.0);
    let g = (1.5 - (4.0 * t - 2.0).abs()).clamp(0.0, 1.0);
    let b = (1.5 - (4.0 * t - 1.0).abs()).clamp(0.0, 1.0);
    [(r * 255.0) as u8, (g * 255.0) as u8, (b * 255.0) as u8]
}

/// Render a depth (or disparity) map as a jet-colored RGB image.
pub fn colorize_depth(map: &Array2<f32>) -> RgbImage {
    let (height, width) = map.dim();
    RgbImage::from_fn(width as u32, height as u32, |x, y| {
        let v = map[(y as usize, x as usize)].min(VIS_MAX_DEPTH);
        let t = ((v - VIS_MIN_DEPTH) / (VIS_MAX_DEPTH - VIS_MIN_DEPTH)).clamp(0.0, 1.0);
        Rgb(jet(t))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn jet_endpoints_are_blue_and_red() {
        let near = jet(0.0);
        let far = jet(1.0);
        assert!(near[2] > near[0], "near end should be blue: {near:?}");
        assert!(far[0] > far[2], "far end should be red: {far:?}");
    }

    #[test]
    fn colorize_clips_beyond_max_depth() {
        let map = array![[80.0_f32, 500.0]];
        let img = colorize_depth(&map);
        assert_eq!(img.get_pixel(0, 0), img.get_pixel(1, 0));
    }

    #[test]
    fn output_dimensions_match_input() {
        let map = Array2::from_elem((3, 5), 10.0_f32);
        let img = colorize_depth(&map);
        assert_eq!((img.width(), img.height()), (5, 3));
    }
}
