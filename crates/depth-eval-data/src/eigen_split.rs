//! Eigen raw-data test split handling.
//!
//! The split is described by a text file (`eigen_test_files.txt`) with one
//! image path per line, e.g.
//! `2011_09_26/2011_09_26_drive_0002_sync/image_02/data/0000000069.png`.
//! Each line resolves to the corresponding velodyne scan, the per-date
//! calibration directory, and the image size.

use std::fs;
use std::path::{Path, PathBuf};

use log::warn;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SplitError {
    #[error("failed to read split file '{path}'")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed split line '{0}'")]
    MalformedLine(String),
    #[error("no usable samples found under '{0}'")]
    NoSamples(String),
}

/// One resolved test frame of the Eigen split.
#[derive(Debug, Clone)]
pub struct EigenSample {
    pub image_path: PathBuf,
    pub velodyne_path: PathBuf,
    pub calib_dir: PathBuf,
    pub height: usize,
    pub width: usize,
    /// Rectified color camera: 2 (left) or 3 (right).
    pub camera_id: u8,
}

/// Read the non-empty lines of a split file.
pub fn read_text_lines(path: &Path) -> Result<Vec<String>, SplitError> {
    let text = fs::read_to_string(path).map_err(|source| SplitError::Io {
        path: path.display().to_string(),
        source,
    })?;
    Ok(text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect())
}

/// Resolve split lines against the dataset root.
///
/// Lines whose image file is missing on disk are skipped with a warning, so a
/// partial dataset checkout still evaluates over the frames it has.
pub fn read_file_data(lines: &[String], root: &Path) -> Result<Vec<EigenSample>, SplitError> {
    let mut samples = Vec::with_capacity(lines.len());
    let mut skipped = 0usize;

    for line in lines {
        let relative = line
            .split_whitespace()
            .next()
            .ok_or_else(|| SplitError::MalformedLine(line.clone()))?;
        let parts: Vec<&str> = relative.split('/').collect();
        // <date>/<drive>/image_0X/data/<frame>.png
        let (date, drive, image_dir, file) = match parts.as_slice() {
            &[date, drive, image_dir, _, file] => (date, drive, image_dir, file),
            _ => return Err(SplitError::MalformedLine(line.clone())),
        };

        let camera_id: u8 = image_dir
            .chars()
            .last()
            .and_then(|c| c.to_digit(10))
            .map(|d| d as u8)
            .ok_or_else(|| SplitError::MalformedLine(line.clone()))?;
        let frame_id = file
            .split('.')
            .next()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| SplitError::MalformedLine(line.clone()))?;

        let image_path = root.join(relative);
        let (width, height) = match image::image_dimensions(&image_path) {
            Ok(dims) => dims,
            Err(err) => {
                warn!("skipping {relative}: {err}");
                skipped += 1;
                continue;
            }
        };

        samples.push(EigenSample {
            image_path,
            velodyne_path: root
                .join(date)
                .join(drive)
                .join("velodyne_points")
                .join("data")
                .join(format!("{frame_id}.bin")),
            calib_dir: root.join(date),
            height: height as usize,
            width: width as usize,
            camera_id,
        });
    }

    if skipped > 0 {
        warn!("{skipped} of {} split frames were missing", lines.len());
    }
    if samples.is_empty() {
        return Err(SplitError::NoSamples(root.display().to_string()));
    }
    Ok(samples)
}
