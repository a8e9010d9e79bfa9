//! Hyperparameter search with stratified cross-validation.
pub mod cross_validation;
pub mod grid_search;

pub use cross_validation::{Fold, StratifiedKFold};
pub use grid_search::{CandidateScore, GridSearch, GridSearchResult, SearchSummary};
