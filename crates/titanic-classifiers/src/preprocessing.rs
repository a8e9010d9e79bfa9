//! Standard scaling of a subset of feature columns.
//!
//! Only the continuous columns (Age and Fare) are standardised; indicator and
//! count columns pass through untouched. The scaler is fitted once on the
//! training split and persisted next to the estimator so that prediction time
//! applies exactly the same transformation.

use ndarray::{Array2, Axis};
use serde::{Deserialize, Serialize};

use crate::data_handling::CONTINUOUS_FEATURES;
use crate::error::{ModelError, Result};

/// Per-column mean/std for the selected columns.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Scaler {
    /// Column indices that are standardised.
    pub columns: Vec<usize>,
    pub mean: Vec<f64>,
    /// Population standard deviation; `1.0` for constant columns.
    pub scale: Vec<f64>,
    /// Width of the matrix the scaler was fitted on.
    pub n_features: usize,
}

impl Scaler {
    /// Fit on `x`, standardising only `columns`.
    pub fn fit(x: &Array2<f64>, columns: &[usize]) -> Result<Self> {
        let (nrows, ncols) = x.dim();
        if nrows == 0 {
            return Err(ModelError::InvalidInput(
                "cannot fit a scaler on an empty matrix".to_string(),
            ));
        }
        if let Some(&bad) = columns.iter().find(|&&c| c >= ncols) {
            return Err(ModelError::InvalidInput(format!(
                "scaler column {} out of range for {} features",
                bad, ncols
            )));
        }

        let mut mean = Vec::with_capacity(columns.len());
        let mut scale = Vec::with_capacity(columns.len());
        for &c in columns {
            let col = x.index_axis(Axis(1), c);
            let m = col.sum() / nrows as f64;
            let var = col.iter().map(|v| (v - m) * (v - m)).sum::<f64>() / nrows as f64;
            let std = var.sqrt();
            mean.push(m);
            scale.push(if std > 0.0 { std } else { 1.0 });
        }

        Ok(Self {
            columns: columns.to_vec(),
            mean,
            scale,
            n_features: ncols,
        })
    }

    /// Fit on the Age/Fare columns of a feature matrix.
    pub fn fit_continuous(x: &Array2<f64>) -> Result<Self> {
        Self::fit(x, &CONTINUOUS_FEATURES)
    }

    /// Apply the stored statistics; never refits.
    pub fn transform(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        if x.ncols() != self.n_features {
            return Err(ModelError::ShapeMismatch {
                expected: self.n_features,
                actual: x.ncols(),
            });
        }
        let mut out = x.clone();
        for (k, &c) in self.columns.iter().enumerate() {
            let (m, s) = (self.mean[k], self.scale[k]);
            out.index_axis_mut(Axis(1), c).mapv_inplace(|v| (v - m) / s);
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn test_only_selected_columns_change() {
        let x = array![[1.0, 5.0, 10.0], [3.0, 6.0, 20.0]];
        let sc = Scaler::fit(&x, &[0, 2]).unwrap();
        let t = sc.transform(&x).unwrap();
        assert_abs_diff_eq!(t[[0, 0]], -1.0);
        assert_abs_diff_eq!(t[[1, 0]], 1.0);
        assert_eq!(t.column(1).to_vec(), vec![5.0, 6.0]);
        assert_abs_diff_eq!(t[[1, 2]], 1.0);
    }

    #[test]
    fn test_constant_column_is_only_centred() {
        let x = array![[2.0, 1.0], [2.0, 3.0]];
        let sc = Scaler::fit(&x, &[0]).unwrap();
        assert_eq!(sc.scale[0], 1.0);
        let t = sc.transform(&x).unwrap();
        assert_eq!(t.column(0).to_vec(), vec![0.0, 0.0]);
    }

    #[test]
    fn test_transform_does_not_refit() {
        let train = array![[0.0, 0.0], [2.0, 0.0]];
        let sc = Scaler::fit(&train, &[0]).unwrap();
        let t = sc.transform(&array![[100.0, 0.0]]).unwrap();
        assert_abs_diff_eq!(t[[0, 0]], 99.0);
    }

    #[test]
    fn test_shape_mismatch() {
        let sc = Scaler::fit(&array![[1.0, 2.0]], &[0]).unwrap();
        assert!(matches!(
            sc.transform(&array![[1.0, 2.0, 3.0]]),
            Err(ModelError::ShapeMismatch { expected: 2, actual: 3 })
        ));
    }
}
