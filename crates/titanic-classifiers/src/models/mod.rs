pub mod classifier_trait;
pub mod decision_tree;
pub mod factory;
pub mod random_forest;
pub mod svc;
pub mod utils;

pub use classifier_trait::ClassifierModel;
pub use factory::{build_model, Estimator};
