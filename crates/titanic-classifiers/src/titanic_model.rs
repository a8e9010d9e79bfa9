//! Train / evaluate / persist / predict wrapper around one classifier family.
//!
//! A [`TitanicModel`] owns a fitted [`Scaler`] and a fitted [`Estimator`].
//! Both are produced by [`TitanicModel::train`] (or restored by
//! [`TitanicModel::load`]) and are only read afterwards.

use std::path::{Path, PathBuf};

use ndarray::Array2;

use crate::config::{HyperParams, ModelType, SearchConfig};
use crate::data_handling::{FEATURE_NAMES, N_FEATURES};
use crate::error::{ModelError, Result};
use crate::metrics::Metrics;
use crate::model_selection::{GridSearch, SearchSummary};
use crate::models::utils::check_labels;
use crate::models::{ClassifierModel, Estimator};
use crate::persistence::{read_artifact, write_artifact};
use crate::preprocessing::Scaler;

pub const ARTIFACT_EXTENSION: &str = "bin";

/// Where the two artifacts of one model type live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    pub estimator: PathBuf,
    pub scaler: PathBuf,
}

impl ArtifactPaths {
    /// `{prefix}_{tag}.bin` and `{prefix}_scaler_{tag}.bin`.
    pub fn new(prefix: &Path, model_type: ModelType) -> Self {
        let base = prefix.as_os_str().to_string_lossy();
        let tag = model_type.as_str();
        Self {
            estimator: PathBuf::from(format!("{}_{}.{}", base, tag, ARTIFACT_EXTENSION)),
            scaler: PathBuf::from(format!("{}_scaler_{}.{}", base, tag, ARTIFACT_EXTENSION)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct TitanicModel {
    model_type: ModelType,
    search: SearchConfig,
    scaler: Option<Scaler>,
    estimator: Option<Estimator>,
    best_params: Option<HyperParams>,
}

impl TitanicModel {
    pub fn new(model_type: ModelType) -> Self {
        Self {
            model_type,
            search: SearchConfig::default(),
            scaler: None,
            estimator: None,
            best_params: None,
        }
    }

    /// Build from a tag such as `"rf"` or `"svc"`.
    pub fn from_tag(tag: &str) -> Result<Self> {
        Ok(Self::new(tag.parse()?))
    }

    pub fn with_search_config(mut self, search: SearchConfig) -> Self {
        self.search = search;
        self
    }

    /// Restore a previously saved model.
    pub fn from_artifacts(model_type: ModelType, prefix: impl AsRef<Path>) -> Result<Self> {
        let mut model = Self::new(model_type);
        model.load(prefix)?;
        Ok(model)
    }

    pub fn model_type(&self) -> ModelType {
        self.model_type
    }

    pub fn is_trained(&self) -> bool {
        self.estimator.is_some() && self.scaler.is_some()
    }

    /// Hyperparameters picked by the last `train`, if any.
    pub fn best_params(&self) -> Option<&HyperParams> {
        self.best_params.as_ref()
    }

    fn fitted(&self) -> Result<(&Scaler, &Estimator)> {
        match (&self.scaler, &self.estimator) {
            (Some(s), Some(e)) => Ok((s, e)),
            _ => Err(ModelError::NotTrained(self.model_type.display_name())),
        }
    }

    fn check_width(x: &Array2<f64>) -> Result<()> {
        if x.ncols() != N_FEATURES {
            return Err(ModelError::ShapeMismatch {
                expected: N_FEATURES,
                actual: x.ncols(),
            });
        }
        Ok(())
    }

    /// Fit the scaler on Age/Fare, grid-search the family's hyperparameters
    /// with stratified CV, and keep the best estimator refitted on all rows.
    pub fn train(&mut self, x: &Array2<f64>, y: &[u8]) -> Result<SearchSummary> {
        Self::check_width(x)?;
        if x.nrows() == 0 {
            return Err(ModelError::InvalidInput(
                "cannot train on an empty feature matrix".to_string(),
            ));
        }
        if x.nrows() != y.len() {
            return Err(ModelError::LengthMismatch {
                rows: x.nrows(),
                labels: y.len(),
            });
        }

        let scaler = Scaler::fit_continuous(x)?;
        let x_scaled = scaler.transform(x)?;

        let search = GridSearch::new(
            self.search.candidates(self.model_type),
            self.search.cv_folds,
            self.search.random_state,
        );
        let (estimator, summary) = search.fit(&x_scaled, y)?.into_parts();

        log::info!(
            "Best {} params: {} (CV accuracy {:.4})",
            self.model_type,
            summary.best_params,
            summary.best_score
        );

        self.scaler = Some(scaler);
        self.estimator = Some(estimator);
        self.best_params = Some(summary.best_params.clone());
        Ok(summary)
    }

    /// Held-out metrics using the stored scaler (never refitted here).
    pub fn evaluate(&self, x: &Array2<f64>, y: &[u8]) -> Result<Metrics> {
        let (scaler, estimator) = self.fitted()?;
        Self::check_width(x)?;
        check_labels(x.nrows(), y)?;
        let x_scaled = scaler.transform(x)?;
        let y_pred = estimator.predict(&x_scaled)?;
        let y_score = estimator.predict_proba(&x_scaled)?;
        let metrics = Metrics::compute(y, &y_pred, &y_score)?;

        log::info!("{} metrics:", self.model_type.as_str().to_uppercase());
        for (name, value) in Metrics::HEADERS.iter().zip(metrics.values()) {
            log::info!("{}: {:.4}", name, value);
        }
        Ok(metrics)
    }

    /// One `0/1` label per row, in input order.
    pub fn predict(&self, x: &Array2<f64>) -> Result<Vec<u8>> {
        let (scaler, estimator) = self.fitted()?;
        Self::check_width(x)?;
        estimator.predict(&scaler.transform(x)?)
    }

    /// Positive-class (survived) probability per row.
    pub fn predict_proba(&self, x: &Array2<f64>) -> Result<Vec<f64>> {
        let (scaler, estimator) = self.fitted()?;
        Self::check_width(x)?;
        estimator.predict_proba(&scaler.transform(x)?)
    }

    /// `(feature, weight)` pairs in column order; random forest only.
    pub fn feature_importance(&self) -> Result<Vec<(String, f64)>> {
        let (_, estimator) = self.fitted()?;
        let weights = estimator.feature_importances()?;
        Ok(FEATURE_NAMES
            .iter()
            .map(|n| n.to_string())
            .zip(weights)
            .collect())
    }

    pub fn artifact_paths(&self, prefix: impl AsRef<Path>) -> ArtifactPaths {
        ArtifactPaths::new(prefix.as_ref(), self.model_type)
    }

    /// Write estimator and scaler next to each other under `prefix`.
    pub fn save(&self, prefix: impl AsRef<Path>) -> Result<ArtifactPaths> {
        let (scaler, estimator) = self.fitted()?;
        let paths = self.artifact_paths(prefix);
        write_artifact(&paths.estimator, estimator)?;
        write_artifact(&paths.scaler, scaler)?;
        log::info!(
            "Saved model and scaler as {} and {}",
            paths.estimator.display(),
            paths.scaler.display()
        );
        Ok(paths)
    }

    /// Replace the fitted state with the artifacts saved under `prefix`.
    pub fn load(&mut self, prefix: impl AsRef<Path>) -> Result<()> {
        let paths = self.artifact_paths(prefix);
        let estimator: Estimator = read_artifact(&paths.estimator)?;
        if estimator.model_type() != self.model_type {
            return Err(ModelError::InvalidInput(format!(
                "{} holds a {} estimator, expected {}",
                paths.estimator.display(),
                estimator.model_type().display_name(),
                self.model_type.display_name()
            )));
        }
        let scaler: Scaler = read_artifact(&paths.scaler)?;

        self.estimator = Some(estimator);
        self.scaler = Some(scaler);
        self.best_params = None;
        log::info!("Loaded {} model from {}", self.model_type, paths.estimator.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_artifact_paths() {
        let paths = ArtifactPaths::new(Path::new("models/titanic"), ModelType::Svc);
        assert_eq!(paths.estimator, PathBuf::from("models/titanic_svc.bin"));
        assert_eq!(paths.scaler, PathBuf::from("models/titanic_scaler_svc.bin"));
    }

    #[test]
    fn test_from_tag() {
        assert_eq!(
            TitanicModel::from_tag("RF").unwrap().model_type(),
            ModelType::RandomForest
        );
        assert!(matches!(
            TitanicModel::from_tag("xgb"),
            Err(ModelError::InvalidModelType(_))
        ));
    }

    #[test]
    fn test_untrained_model_refuses_to_work() {
        let model = TitanicModel::new(ModelType::RandomForest);
        let x = Array2::zeros((1, N_FEATURES));
        assert!(!model.is_trained());
        assert!(matches!(model.predict(&x), Err(ModelError::NotTrained(_))));
        assert!(matches!(
            model.evaluate(&x, &[0]),
            Err(ModelError::NotTrained(_))
        ));
        assert!(matches!(
            model.save("unused"),
            Err(ModelError::NotTrained(_))
        ));
    }
}
