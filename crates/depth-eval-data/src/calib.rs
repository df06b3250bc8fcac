//! KITTI raw-data calibration files.
//!
//! Calibration files are plain text, one `key: v1 v2 ...` entry per line
//! (`calib_cam_to_cam.txt`, `calib_velo_to_cam.txt`). Entries whose values do
//! not all parse as floats (e.g. `calib_time`) are skipped.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use nalgebra::{Matrix3, Matrix3x4};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CalibError {
    #[error("failed to read calibration file '{path}'")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("calibration key '{0}' not found")]
    MissingKey(String),
    #[error("calibration key '{key}' has {got} values, expected {expected}")]
    WrongLength {
        key: String,
        got: usize,
        expected: usize,
    },
    #[error("unsupported camera id {0} (expected 2 or 3)")]
    UnsupportedCamera(u8),
}

/// Parsed key/value calibration file.
#[derive(Debug, Clone)]
pub struct CalibFile {
    entries: HashMap<String, Vec<f64>>,
}

impl CalibFile {
    pub fn read(path: &Path) -> Result<Self, CalibError> {
        let text = fs::read_to_string(path).map_err(|source| CalibError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Ok(Self::parse(&text))
    }

    pub fn parse(text: &str) -> Self {
        let mut entries = HashMap::new();
        for line in text.lines() {
            let Some((key, values)) = line.split_once(':') else {
                continue;
            };
            let parsed: Result<Vec<f64>, _> = values
                .split_whitespace()
                .map(|v| v.parse::<f64>())
                .collect();
            if let Ok(values) = parsed {
                if !values.is_empty() {
                    entries.insert(key.trim().to_string(), values);
                }
            }
        }
        Self { entries }
    }

    pub fn vector(&self, key: &str) -> Result<&[f64], CalibError> {
        self.entries
            .get(key)
            .map(Vec::as_slice)
            .ok_or_else(|| CalibError::MissingKey(key.to_string()))
    }

    fn fixed<const N: usize>(&self, key: &str) -> Result<[f64; N], CalibError> {
        let values = self.vector(key)?;
        values
            .try_into()
            .map_err(|_| CalibError::WrongLength {
                key: key.to_string(),
                got: values.len(),
                expected: N,
            })
    }

    /// Row-major 3x3 entry (e.g. `R`, `R_rect_00`).
    pub fn matrix3(&self, key: &str) -> Result<Matrix3<f64>, CalibError> {
        let v: [f64; 9] = self.fixed(key)?;
        Ok(Matrix3::from_row_slice(&v))
    }

    /// Row-major 3x4 entry (e.g. `P_rect_02`).
    pub fn matrix3x4(&self, key: &str) -> Result<Matrix3x4<f64>, CalibError> {
        let v: [f64; 12] = self.fixed(key)?;
        Ok(Matrix3x4::from_row_slice(&v))
    }
}

/// Focal length (pixels) and stereo baseline (meters) of a rectified color
/// camera (id 2 or 3) from a parsed `calib_cam_to_cam.txt`.
///
/// The baseline is recovered from the horizontal offsets of `P_rect_02` and
/// `P_rect_03` relative to camera 0.
pub fn focal_length_baseline(cam2cam: &CalibFile, camera_id: u8) -> Result<(f64, f64), CalibError> {
    let p2 = cam2cam.matrix3x4("P_rect_02")?;
    let p3 = cam2cam.matrix3x4("P_rect_03")?;

    let b2 = p2[(0, 3)] / -p2[(0, 0)];
    let b3 = p3[(0, 3)] / -p3[(0, 0)];
    let baseline = b3 - b2;

    let focal = match camera_id {
        2 => p2[(0, 0)],
        3 => p3[(0, 0)],
        other => return Err(CalibError::UnsupportedCamera(other)),
    };

    Ok((focal, baseline))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    // Values from the KITTI 2011_09_26 calibration.
    const CAM2CAM: &str = "\
calib_time: 09-Jan-2012 13:57:47
R_rect_00: 9.999239e-01 9.837760e-03 -7.445048e-03 -9.869795e-03 9.999421e-01 -4.278459e-03 7.402527e-03 4.351614e-03 9.999631e-01
P_rect_02: 7.215377e+02 0.000000e+00 6.095593e+02 4.485728e+01 0.000000e+00 7.215377e+02 1.728540e+02 2.163791e-01 0.000000e+00 0.000000e+00 1.000000e+00 2.745884e-03
P_rect_03: 7.215377e+02 0.000000e+00 6.095593e+02 -3.395242e+02 0.000000e+00 7.215377e+02 1.728540e+02 2.199936e+00 0.000000e+00 0.000000e+00 1.000000e+00 2.729905e-03
";

    #[test]
    fn parses_matrices_and_skips_non_numeric_entries() {
        let calib = CalibFile::parse(CAM2CAM);
        assert!(calib.vector("calib_time").is_err());

        let r = calib.matrix3("R_rect_00").unwrap();
        assert_abs_diff_eq!(r[(0, 0)], 0.9999239, epsilon = 1e-7);
        assert_abs_diff_eq!(r[(2, 1)], 4.351614e-03, epsilon = 1e-9);

        let p2 = calib.matrix3x4("P_rect_02").unwrap();
        assert_abs_diff_eq!(p2[(0, 0)], 721.5377, epsilon = 1e-4);
        assert_abs_diff_eq!(p2[(0, 3)], 44.85728, epsilon = 1e-5);
    }

    #[test]
    fn focal_and_baseline_match_kitti() {
        let calib = CalibFile::parse(CAM2CAM);
        let (focal, baseline) = focal_length_baseline(&calib, 2).unwrap();
        assert_abs_diff_eq!(focal, 721.5377, epsilon = 1e-4);
        // The color-camera pair sits roughly 0.54 m apart.
        assert_abs_diff_eq!(baseline, 0.5327254, epsilon = 1e-3);
    }

    #[test]
    fn right_camera_uses_its_own_focal() {
        let calib = CalibFile::parse(CAM2CAM);
        let (focal, _) = focal_length_baseline(&calib, 3).unwrap();
        assert_abs_diff_eq!(focal, 721.5377, epsilon = 1e-4);
        assert!(matches!(
            focal_length_baseline(&calib, 1),
            Err(CalibError::UnsupportedCamera(1))
        ));
    }

    #[test]
    fn wrong_length_is_reported() {
        let calib = CalibFile::parse("R: 1 2 3\n");
        assert!(matches!(
            calib.matrix3("R"),
            Err(CalibError::WrongLength { got: 3, expected: 9, .. })
        ));
    }
}
