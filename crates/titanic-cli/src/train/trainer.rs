use std::path::PathBuf;

use anyhow::{Context, Result};
use titanic_classifiers::data_handling::{preprocess, train_test_split};
use titanic_classifiers::io::metrics_csv::write_metrics_csv;
use titanic_classifiers::io::titanic_csv::read_titanic_csv;
use titanic_classifiers::model_selection::SearchSummary;
use titanic_classifiers::profiling::{profile, ResourceProfile};
use titanic_classifiers::titanic_model::ArtifactPaths;
use titanic_classifiers::{Metrics, ModelType, TitanicModel};

use super::input::TrainConfig;

/// Outcome of training one model family.
#[derive(Debug, Clone)]
pub struct ModelReport {
    pub model_type: ModelType,
    pub search: SearchSummary,
    pub metrics: Metrics,
    pub artifacts: ArtifactPaths,
    pub train_profile: ResourceProfile,
}

#[derive(Debug, Clone)]
pub struct TrainingSummary {
    pub n_train: usize,
    pub n_test: usize,
    pub age_median: f64,
    pub models: Vec<ModelReport>,
    pub metrics_file: PathBuf,
}

pub fn run_training(config: &TrainConfig) -> Result<TrainingSummary> {
    log::info!("Loading data from {}", config.train_data);
    let raw = read_titanic_csv(&config.train_data)?;

    log::info!("Preprocessing {} passengers", raw.len());
    let prepared = preprocess(&raw).context("Failed to preprocess training data")?;
    let y = prepared
        .y
        .as_deref()
        .context("Training data has no Survived column")?;
    log::debug!("Filled missing ages with median {}", prepared.age_median);

    log::info!(
        "Splitting data (test_size {}, seed {})",
        config.test_size,
        config.split_seed
    );
    let split = train_test_split(&prepared.x, y, config.test_size, config.split_seed)?;
    log::info!(
        "{} training rows, {} test rows",
        split.y_train.len(),
        split.y_test.len()
    );

    let mut reports = Vec::with_capacity(config.models.len());
    for &model_type in &config.models {
        log::info!("Training {}...", model_type.display_name());
        let mut model = TitanicModel::new(model_type).with_search_config(config.search.clone());

        let (trained, train_profile) =
            profile("train", || model.train(&split.x_train, &split.y_train));
        let search = trained
            .with_context(|| format!("Training {} failed", model_type.display_name()))?;

        let metrics = model
            .evaluate(&split.x_test, &split.y_test)
            .with_context(|| format!("Evaluating {} failed", model_type.display_name()))?;
        let artifacts = model.save(&config.model_prefix)?;

        reports.push(ModelReport {
            model_type,
            search,
            metrics,
            artifacts,
            train_profile,
        });
    }

    let rows: Vec<(String, Metrics)> = reports
        .iter()
        .map(|r| (r.model_type.display_name().to_string(), r.metrics))
        .collect();
    write_metrics_csv(&config.metrics_file, &rows)?;
    log::info!("Saved metrics table to {}", config.metrics_file);
    log::info!("Training complete. Metrics and models saved.");

    Ok(TrainingSummary {
        n_train: split.y_train.len(),
        n_test: split.y_test.len(),
        age_median: prepared.age_median,
        models: reports,
        metrics_file: PathBuf::from(&config.metrics_file),
    })
}
