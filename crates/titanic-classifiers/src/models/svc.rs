//! C-support vector classifier backed by `linfa-svm`.
//!
//! The fitted `Svm<f64, Pr>` carries its own Platt sigmoid, so
//! `predict_proba` reads probabilities straight off the model and `predict`
//! thresholds them at 0.5.

use linfa::dataset::Pr;
use linfa::traits::{Fit, Predict};
use linfa::Dataset;
use linfa_svm::{Svm, SvmParams};
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

use crate::config::Kernel;
use crate::error::{ModelError, Result};
use crate::models::classifier_trait::ClassifierModel;
use crate::models::utils::{check_fit_input, check_predict_input};

/// Upper bound on training rows; the solver holds a dense kernel matrix.
pub const MAX_KERNEL_MATRIX_SAMPLES: usize = 10_000;

/// Width of the gaussian kernel `exp(-||a - b||^2 / eps)` matching
/// `gamma = 1 / (n_features * var(x))`, so `eps = n_features * var(x)`.
/// Falls back to `1.0` when `x` is constant.
pub fn gaussian_eps(x: &Array2<f64>) -> f64 {
    let n = x.len() as f64;
    let mean = x.sum() / n;
    let var = x.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / n;
    if var > 0.0 {
        x.ncols() as f64 * var
    } else {
        1.0
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct FittedSvc {
    model: Svm<f64, Pr>,
    n_features: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SvcClassifier {
    pub c: f64,
    pub kernel: Kernel,
    fitted: Option<FittedSvc>,
}

impl Default for SvcClassifier {
    fn default() -> Self {
        Self::new(1.0, Kernel::Rbf)
    }
}

impl SvcClassifier {
    pub fn new(c: f64, kernel: Kernel) -> Self {
        Self {
            c,
            kernel,
            fitted: None,
        }
    }

    pub fn is_fitted(&self) -> bool {
        self.fitted.is_some()
    }

    pub fn n_support(&self) -> usize {
        self.fitted.as_ref().map_or(0, |f| f.model.nsupport())
    }

    fn fitted(&self) -> Result<&FittedSvc> {
        self.fitted.as_ref().ok_or(ModelError::NotTrained("SVC"))
    }

    fn params(&self, x: &Array2<f64>) -> SvmParams<f64, Pr> {
        let params = Svm::<f64, Pr>::params().pos_neg_weights(self.c, self.c);
        match self.kernel {
            Kernel::Linear => params.linear_kernel(),
            Kernel::Rbf => params.gaussian_kernel(gaussian_eps(x)),
        }
    }
}

impl ClassifierModel for SvcClassifier {
    fn fit(&mut self, x: &Array2<f64>, y: &[u8]) -> Result<()> {
        check_fit_input(x, y)?;
        let n_pos = y.iter().filter(|&&v| v == 1).count();
        if n_pos == 0 || n_pos == y.len() {
            return Err(ModelError::InvalidInput(
                "SVC needs samples of both classes; only one class is present".to_string(),
            ));
        }
        if x.nrows() > MAX_KERNEL_MATRIX_SAMPLES {
            return Err(ModelError::InvalidInput(format!(
                "SVC training is limited to {} rows, got {}",
                MAX_KERNEL_MATRIX_SAMPLES,
                x.nrows()
            )));
        }

        let targets: Array1<bool> = y.iter().map(|&l| l == 1).collect();
        let dataset = Dataset::new(x.to_owned(), targets);
        let model = self.params(x).fit(&dataset).map_err(ModelError::Svm)?;

        log::debug!(
            "Fitted SVC (C={}, kernel={}): {} support vectors",
            self.c,
            self.kernel,
            model.nsupport()
        );
        self.fitted = Some(FittedSvc {
            model,
            n_features: x.ncols(),
        });
        Ok(())
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Vec<u8>> {
        Ok(self
            .predict_proba(x)?
            .into_iter()
            .map(|p| u8::from(p > 0.5))
            .collect())
    }

    /// Platt-scaled probability of the positive class.
    fn predict_proba(&self, x: &Array2<f64>) -> Result<Vec<f64>> {
        let fitted = self.fitted()?;
        check_predict_input(x, fitted.n_features)?;
        let scores: Array1<Pr> = fitted.model.predict(x);
        Ok(scores.iter().map(|p| f64::from(**p)).collect())
    }

    fn name(&self) -> &str {
        "svc"
    }
}
