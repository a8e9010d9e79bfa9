use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::ArgMatches;
use serde::{Deserialize, Serialize};
use titanic_classifiers::{ModelType, SearchConfig};

use crate::util::validate_tsv_or_csv_file;

/// Settings for one `titanic train` run. Every field has a default, so a
/// config file only needs the keys it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainConfig {
    pub train_data: String,
    /// Artifacts are written as `{model_prefix}_{tag}.bin` and
    /// `{model_prefix}_scaler_{tag}.bin`.
    pub model_prefix: String,
    pub metrics_file: String,
    pub log_file: Option<String>,
    pub test_size: f64,
    pub split_seed: u64,
    pub models: Vec<ModelType>,
    pub search: SearchConfig,
}

impl Default for TrainConfig {
    fn default() -> Self {
        TrainConfig {
            train_data: String::from("titanic/train.csv"),
            model_prefix: String::from("models/titanic"),
            metrics_file: String::from("models/ab_testing_metrics.csv"),
            log_file: Some(String::from("models/pipeline.log")),
            test_size: 0.2,
            split_seed: 23,
            models: ModelType::ALL.to_vec(),
            search: SearchConfig::default(),
        }
    }
}

impl TrainConfig {
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let config_json = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        serde_json::from_str(&config_json)
            .with_context(|| format!("Failed to parse config file: {:?}", path))
    }

    /// Defaults, then the optional config file, then command-line overrides.
    pub fn from_arguments(config_path: Option<&PathBuf>, matches: &ArgMatches) -> Result<Self> {
        let mut config = match config_path {
            Some(path) => Self::from_json_file(path)?,
            None => TrainConfig::default(),
        };

        if let Some(train_data) = matches.get_one::<String>("train_data") {
            config.train_data = train_data.clone();
        }
        if let Some(model_prefix) = matches.get_one::<String>("model_prefix") {
            config.model_prefix = model_prefix.clone();
        }
        if let Some(metrics_file) = matches.get_one::<String>("metrics_file") {
            config.metrics_file = metrics_file.clone();
        }
        if let Some(log_file) = matches.get_one::<String>("log_file") {
            config.log_file = Some(log_file.clone());
        }
        if let Some(models) = matches.get_many::<String>("models") {
            config.models = models
                .map(|m| m.parse::<ModelType>())
                .collect::<std::result::Result<_, _>>()?;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        validate_tsv_or_csv_file(&self.train_data)?;
        if !(self.test_size > 0.0 && self.test_size < 1.0) {
            anyhow::bail!("test_size must lie strictly between 0 and 1, got {}", self.test_size);
        }
        if self.models.is_empty() {
            anyhow::bail!("At least one model type must be selected");
        }
        if self.search.cv_folds < 2 {
            anyhow::bail!("cv_folds must be at least 2, got {}", self.search.cv_folds);
        }
        Ok(())
    }
}
