//! Velodyne scans and their projection into sparse depth maps.
//!
//! Ground truth for the Eigen split is produced by projecting the lidar scan
//! of each test frame into the rectified camera image:
//! `P_velo2im = P_rect_0{cam} * R_rect_00 * T_velo2cam`.

use std::fs;
use std::path::Path;

use nalgebra::{Matrix3x4, Matrix4, Vector4};
use ndarray::Array2;
use thiserror::Error;

use crate::calib::{CalibError, CalibFile};

#[derive(Debug, Error)]
pub enum VelodyneError {
    #[error("failed to read velodyne scan '{path}'")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("velodyne scan '{path}' is not a whole number of (x, y, z, reflectance) records")]
    TruncatedScan { path: String },
    #[error(transparent)]
    Calib(#[from] CalibError),
}

/// Lidar points as homogeneous column vectors `(x, y, z, 1)`.
///
/// Scans store little-endian `f32` quadruples; the reflectance channel is
/// replaced by the homogeneous coordinate.
pub fn load_velodyne_points(path: &Path) -> Result<Vec<Vector4<f64>>, VelodyneError> {
    let bytes = fs::read(path).map_err(|source| VelodyneError::Io {
        path: path.display().to_string(),
        source,
    })?;
    if bytes.len() % 16 != 0 {
        return Err(VelodyneError::TruncatedScan {
            path: path.display().to_string(),
        });
    }

    let mut points = Vec::with_capacity(bytes.len() / 16);
    for record in bytes.chunks_exact(16) {
        let read = |offset: usize| {
            let raw: [u8; 4] = record[offset..offset + 4]
                .try_into()
                .unwrap_or([0; 4]);
            f32::from_le_bytes(raw) as f64
        };
        points.push(Vector4::new(read(0), read(4), read(8), 1.0));
    }
    Ok(points)
}

fn velo_to_cam_transform(velo2cam: &CalibFile) -> Result<Matrix4<f64>, CalibError> {
    let r = velo2cam.matrix3("R")?;
    let t = velo2cam.vector("T")?;
    if t.len() != 3 {
        return Err(CalibError::WrongLength {
            key: "T".to_string(),
            got: t.len(),
            expected: 3,
        });
    }

    let mut m = Matrix4::identity();
    m.fixed_view_mut::<3, 3>(0, 0).copy_from(&r);
    m[(0, 3)] = t[0];
    m[(1, 3)] = t[1];
    m[(2, 3)] = t[2];
    Ok(m)
}

/// Build the velodyne-to-image projection for the given rectified camera.
pub fn velo_to_image_projection(
    cam2cam: &CalibFile,
    velo2cam: &CalibFile,
    camera_id: u8,
) -> Result<Matrix3x4<f64>, CalibError> {
    let p_rect = cam2cam.matrix3x4(&format!("P_rect_0{camera_id}"))?;
    let mut r_rect = Matrix4::identity();
    r_rect
        .fixed_view_mut::<3, 3>(0, 0)
        .copy_from(&cam2cam.matrix3("R_rect_00")?);

    Ok(p_rect * r_rect * velo_to_cam_transform(velo2cam)?)
}

/// Project the velodyne scan of one frame into a sparse depth map.
///
/// Points behind the sensor (`x < 0`) are dropped before projection. Image
/// coordinates are rounded and shifted by one pixel (KITTI convention), and
/// pixels hit by several points keep the smallest depth. Negative depths are
/// zeroed.
pub fn generate_depth_map(
    calib_dir: &Path,
    velo_path: &Path,
    height: usize,
    width: usize,
    camera_id: u8,
) -> Result<Array2<f32>, VelodyneError> {
    let cam2cam = CalibFile::read(&calib_dir.join("calib_cam_to_cam.txt"))?;
    let velo2cam = CalibFile::read(&calib_dir.join("calib_velo_to_cam.txt"))?;
    let projection = velo_to_image_projection(&cam2cam, &velo2cam, camera_id)?;

    let points = load_velodyne_points(velo_path)?;
    let mut depth = Array2::<f32>::zeros((height, width));

    for point in points.iter().filter(|p| p.x >= 0.0) {
        let projected = projection * point;
        let z = projected.z;
        let u = projected.x / z;
        let v = projected.y / z;
        if !u.is_finite() || !v.is_finite() {
            continue;
        }

        let col = u.round() - 1.0;
        let row = v.round() - 1.0;
        if col < 0.0 || row < 0.0 || col >= width as f64 || row >= height as f64 {
            continue;
        }

        let cell = &mut depth[(row as usize, col as usize)];
        if *cell == 0.0 || (z as f32) < *cell {
            *cell = z as f32;
        }
    }

    depth.mapv_inplace(|v| if v < 0.0 { 0.0 } else { v });
    Ok(depth)
}
