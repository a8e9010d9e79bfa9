use ndarray::Array2;

use crate::error::Result;

/// Contract shared by the binary classifiers in this crate.
///
/// Labels use `0` (did not survive) and `1` (survived). Probabilities are
/// always for the positive class.
pub trait ClassifierModel {
    /// Fit the model on rows of `x` with labels `y`.
    fn fit(&mut self, x: &Array2<f64>, y: &[u8]) -> Result<()>;

    /// Predict one class label per row of `x`.
    fn predict(&self, x: &Array2<f64>) -> Result<Vec<u8>>;

    /// Predict the positive-class probability per row of `x`.
    fn predict_proba(&self, x: &Array2<f64>) -> Result<Vec<f64>>;

    /// Optional human readable name for the model
    fn name(&self) -> &str {
        "classifier"
    }
}
