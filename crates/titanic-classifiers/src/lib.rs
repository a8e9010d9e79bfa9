//! titanic-classifiers: survival classifiers for the Titanic passenger table.
//!
//! The crate covers the full modelling pipeline: CSV loading and feature
//! preparation, a column-selective scaler, two classifier families (random
//! forest and support-vector), grid search with stratified cross-validation,
//! evaluation metrics, binary persistence and resource profiling. The
//! [`titanic_model::TitanicModel`] wrapper ties these together.
pub mod config;
pub mod data_handling;
pub mod error;
pub mod io;
pub mod metrics;
pub mod model_selection;
pub mod models;
pub mod persistence;
pub mod preprocessing;
pub mod profiling;
pub mod titanic_model;

pub use config::{HyperParams, Kernel, ModelType, SearchConfig};
pub use error::{DataError, MetricError, ModelError};
pub use metrics::Metrics;
pub use titanic_model::TitanicModel;
