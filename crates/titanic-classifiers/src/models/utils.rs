use ndarray::Array2;

use crate::error::{ModelError, Result};

/// Validate a training set: non-empty, one label per row, labels in `{0, 1}`.
pub fn check_fit_input(x: &Array2<f64>, y: &[u8]) -> Result<()> {
    if x.nrows() == 0 || x.ncols() == 0 {
        return Err(ModelError::InvalidInput(
            "training matrix must have at least one row and one column".to_string(),
        ));
    }
    check_labels(x.nrows(), y)?;
    if x.iter().any(|v| !v.is_finite()) {
        return Err(ModelError::InvalidInput(
            "training matrix contains NaN or infinite values".to_string(),
        ));
    }
    Ok(())
}

/// One label per row, each `0` or `1`.
pub fn check_labels(n_rows: usize, y: &[u8]) -> Result<()> {
    if n_rows != y.len() {
        return Err(ModelError::LengthMismatch {
            rows: n_rows,
            labels: y.len(),
        });
    }
    if let Some(bad) = y.iter().find(|&&v| v > 1) {
        return Err(ModelError::InvalidInput(format!(
            "labels must be 0 or 1, found {}",
            bad
        )));
    }
    Ok(())
}

/// Validate a prediction matrix against the width seen at fit time.
pub fn check_predict_input(x: &Array2<f64>, n_features: usize) -> Result<()> {
    if x.ncols() != n_features {
        return Err(ModelError::ShapeMismatch {
            expected: n_features,
            actual: x.ncols(),
        });
    }
    Ok(())
}

/// `max(1, floor(sqrt(n)))`, the default per-split feature budget.
pub fn sqrt_features(n_features: usize) -> usize {
    ((n_features as f64).sqrt().floor() as usize).max(1)
}
