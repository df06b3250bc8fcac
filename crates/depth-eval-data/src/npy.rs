//! Loading predicted disparity/depth stacks from `.npy` files.

use std::fs::File;
use std::path::Path;

use ndarray::Array3;
use ndarray_npy::{ReadNpyError, ReadNpyExt};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PredictionError {
    #[error("failed to open prediction file '{path}'")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("'{path}' is not a (samples, height, width) float array")]
    Format {
        path: String,
        #[source]
        source: ReadNpyError,
    },
}

/// Load a `(num_samples, height, width)` stack of predicted disparities or
/// depths. `f32` arrays are read directly; `f64` arrays are narrowed.
pub fn load_predictions(path: &Path) -> Result<Array3<f32>, PredictionError> {
    let open = |path: &Path| {
        File::open(path).map_err(|source| PredictionError::Io {
            path: path.display().to_string(),
            source,
        })
    };

    match Array3::<f32>::read_npy(open(path)?) {
        Ok(stack) => Ok(stack),
        Err(f32_err) => match Array3::<f64>::read_npy(open(path)?) {
            Ok(stack) => Ok(stack.mapv(|v| v as f32)),
            Err(_) => Err(PredictionError::Format {
                path: path.display().to_string(),
                source: f32_err,
            }),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array3;
    use ndarray_npy::WriteNpyExt;
    use std::io::BufWriter;
    use tempfile::tempdir;

    fn write_npy<T: ndarray_npy::WritableElement>(path: &Path, stack: &Array3<T>) {
        let file = File::create(path).unwrap();
        stack.write_npy(BufWriter::new(file)).unwrap();
    }

    #[test]
    fn roundtrips_f32_stack() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("disp.npy");
        let stack = Array3::from_shape_fn((2, 3, 4), |(s, r, c)| (s * 12 + r * 4 + c) as f32);
        write_npy(&path, &stack);

        let loaded = load_predictions(&path).unwrap();
        assert_eq!(loaded, stack);
    }

    #[test]
    fn narrows_f64_stack() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("disp64.npy");
        let stack = Array3::from_elem((1, 2, 2), 0.25_f64);
        write_npy(&path, &stack);

        let loaded = load_predictions(&path).unwrap();
        assert_eq!(loaded, Array3::from_elem((1, 2, 2), 0.25_f32));
    }

    #[test]
    fn missing_file_reports_path() {
        let err = load_predictions(Path::new("/nonexistent/preds.npy")).unwrap_err();
        assert!(matches!(err, PredictionError::Io { .. }));
    }

    #[test]
    fn wrong_rank_is_a_format_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("flat.npy");
        let flat = ndarray::Array1::from_vec(vec![1.0_f32, 2.0]);
        let file = File::create(&path).unwrap();
        flat.write_npy(BufWriter::new(file)).unwrap();

        let err = load_predictions(&path).unwrap_err();
        assert!(matches!(err, PredictionError::Format { .. }));
    }
}
