pub mod metrics_csv;
pub mod titanic_csv;
