use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::config::{HyperParams, ModelType};
use crate::error::{ModelError, Result};
use crate::models::classifier_trait::ClassifierModel;
use crate::models::random_forest::RandomForest;
use crate::models::svc::SvcClassifier;

/// A classifier of either supported family.
///
/// This is what gets persisted as the estimator artifact, so it carries the
/// family tag alongside the fitted state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Estimator {
    RandomForest(RandomForest),
    Svc(SvcClassifier),
}

impl Estimator {
    pub fn model_type(&self) -> ModelType {
        match self {
            Estimator::RandomForest(_) => ModelType::RandomForest,
            Estimator::Svc(_) => ModelType::Svc,
        }
    }

    /// Impurity-based importances; only random forests have them.
    pub fn feature_importances(&self) -> Result<Vec<f64>> {
        match self {
            Estimator::RandomForest(rf) => rf.feature_importances(),
            Estimator::Svc(_) => Err(ModelError::Unsupported(
                "Feature importance only available for Random Forest.".to_string(),
            )),
        }
    }

    fn inner(&self) -> &dyn ClassifierModel {
        match self {
            Estimator::RandomForest(m) => m,
            Estimator::Svc(m) => m,
        }
    }
}

impl ClassifierModel for Estimator {
    fn fit(&mut self, x: &Array2<f64>, y: &[u8]) -> Result<()> {
        match self {
            Estimator::RandomForest(m) => m.fit(x, y),
            Estimator::Svc(m) => m.fit(x, y),
        }
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Vec<u8>> {
        self.inner().predict(x)
    }

    fn predict_proba(&self, x: &Array2<f64>) -> Result<Vec<f64>> {
        self.inner().predict_proba(x)
    }

    fn name(&self) -> &str {
        self.inner().name()
    }
}

/// Build an unfitted estimator for one grid candidate.
pub fn build_model(params: &HyperParams, random_state: u64) -> Estimator {
    match *params {
        HyperParams::RandomForest {
            n_estimators,
            max_depth,
        } => Estimator::RandomForest(RandomForest::new(n_estimators, max_depth, random_state)),
        HyperParams::Svc { c, kernel } => Estimator::Svc(SvcClassifier::new(c, kernel)),
    }
}
