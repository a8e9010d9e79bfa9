use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use anyhow::{Context, Result};
use titanic_classifiers::profiling::{ResourceSampler, ResourceSnapshot};
use titanic_classifiers::{ModelType, TitanicModel};

/// Shared by every request. Models are only read after startup.
pub struct AppState {
    rf: TitanicModel,
    svc: TitanicModel,
    api_key: Option<String>,
    request_count: AtomicU64,
    sampler: Mutex<ResourceSampler>,
}

impl AppState {
    pub fn new(rf: TitanicModel, svc: TitanicModel, api_key: Option<String>) -> Self {
        AppState {
            rf,
            svc,
            api_key,
            request_count: AtomicU64::new(0),
            sampler: Mutex::new(ResourceSampler::new()),
        }
    }

    /// Restore both families from `{prefix}_{rf,svc}.bin` and their scalers.
    pub fn load(prefix: &Path, api_key: Option<String>) -> Result<Self> {
        let rf = TitanicModel::from_artifacts(ModelType::RandomForest, prefix)
            .context("Failed to load the random forest artifacts")?;
        let svc = TitanicModel::from_artifacts(ModelType::Svc, prefix)
            .context("Failed to load the SVC artifacts")?;
        Ok(Self::new(rf, svc, api_key))
    }

    pub fn model(&self, model_type: ModelType) -> &TitanicModel {
        match model_type {
            ModelType::RandomForest => &self.rf,
            ModelType::Svc => &self.svc,
        }
    }

    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }

    /// Count one request and return the running total.
    pub fn record_request(&self) -> u64 {
        self.request_count.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub fn requests_handled(&self) -> u64 {
        self.request_count.load(Ordering::Relaxed)
    }

    /// Read process memory and CPU through the shared sampler. Blocks on
    /// `/proc`, so call it off the async workers.
    pub fn resource_snapshot(&self) -> ResourceSnapshot {
        match self.sampler.lock() {
            Ok(mut sampler) => sampler.snapshot(),
            Err(poisoned) => poisoned.into_inner().snapshot(),
        }
    }
}
