//! Bilinear raster resize for prediction maps.

use image::imageops::{self, FilterType};
use image::{ImageBuffer, Luma};
use ndarray::Array2;

/// Resize `map` to `out_height` x `out_width` with linear interpolation.
///
/// Predictions are typically produced at network resolution and have to be
/// brought to the ground-truth resolution before masking and metrics.
pub fn resize_bilinear(map: &Array2<f32>, out_height: usize, out_width: usize) -> Array2<f32> {
    let (height, width) = map.dim();
    if (height, width) == (out_height, out_width) {
        return map.clone();
    }

    let buffer: ImageBuffer<Luma<f32>, Vec<f32>> =
        ImageBuffer::from_fn(width as u32, height as u32, |x, y| {
            Luma([map[(y as usize, x as usize)]])
        });
    let resized = imageops::resize(
        &buffer,
        out_width as u32,
        out_height as u32,
        FilterType::Triangle,
    );

    Array2::from_shape_fn((out_height, out_width), |(row, col)| {
        resized.get_pixel(col as u32, row as u32)[0]
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::Array2;

    #[test]
    fn same_size_is_identity() {
        let map = Array2::from_shape_fn((4, 6), |(r, c)| (r * 6 + c) as f32);
        assert_eq!(resize_bilinear(&map, 4, 6), map);
    }

    #[test]
    fn constant_image_stays_constant() {
        let map = Array2::from_elem((10, 20), 7.5_f32);
        let up = resize_bilinear(&map, 37, 121);
        assert_eq!(up.dim(), (37, 121));
        for &v in up.iter() {
            assert_abs_diff_eq!(v, 7.5, epsilon = 1e-5);
        }
    }

    #[test]
    fn upsampled_gradient_stays_within_input_range() {
        let map = Array2::from_shape_fn((8, 8), |(r, c)| (r + c) as f32);
        let up = resize_bilinear(&map, 31, 29);
        for &v in up.iter() {
            assert!((0.0..=14.0).contains(&v), "value out of range: {v}");
        }
    }
}
