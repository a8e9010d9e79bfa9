use std::path::PathBuf;

use thiserror::Error;

/// Failures raised by the training/prediction pipeline.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("Invalid model_type '{0}'. Choose 'rf' or 'svc'")]
    InvalidModelType(String),

    #[error("{0} model is not trained. Call train() or load() first")]
    NotTrained(&'static str),

    #[error("Artifact not found: {}", .0.display())]
    ArtifactNotFound(PathBuf),

    #[error("Expected {expected} feature columns, got {actual}")]
    ShapeMismatch { expected: usize, actual: usize },

    #[error("Feature matrix has {rows} rows but {labels} labels were given")]
    LengthMismatch { rows: usize, labels: usize },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("{0}")]
    Unsupported(String),

    #[error(transparent)]
    Metric(#[from] MetricError),

    #[error("SVM solver failed: {0}")]
    Svm(#[from] linfa_svm::SvmError),

    #[error("Failed to (de)serialize artifact {}: {source}", .path.display())]
    Serialization {
        path: PathBuf,
        #[source]
        source: bincode::Error,
    },

    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Failures while computing classification metrics.
#[derive(Debug, Error, PartialEq)]
pub enum MetricError {
    #[error("Only one class present in y_true. ROC AUC score is not defined in that case")]
    SingleClass,

    #[error("y_true has {0} entries but predictions have {1}")]
    LengthMismatch(usize, usize),

    #[error("Cannot compute metrics on empty input")]
    Empty,
}

/// Failures while turning raw passenger rows into a feature matrix.
#[derive(Debug, Error, PartialEq)]
pub enum DataError {
    #[error("No passenger records to process")]
    Empty,

    #[error("Unknown {column} value '{value}' for passenger {passenger_id}")]
    UnknownCategory {
        column: &'static str,
        value: String,
        passenger_id: i64,
    },

    #[error("No Age values present; median imputation is undefined")]
    NoAgeValues,

    #[error("Invalid passenger record: {0}")]
    InvalidRecord(String),

    #[error("Invalid train/test split: {0}")]
    InvalidSplit(String),
}

pub type Result<T, E = ModelError> = std::result::Result<T, E>;
