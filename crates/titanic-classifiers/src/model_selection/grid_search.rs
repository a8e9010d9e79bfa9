use ndarray::{Array2, Axis};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::HyperParams;
use crate::error::{ModelError, Result};
use crate::metrics;
use crate::model_selection::cross_validation::StratifiedKFold;
use crate::models::classifier_trait::ClassifierModel;
use crate::models::factory::{build_model, Estimator};
use crate::models::utils::check_fit_input;

/// Cross-validated accuracy of one candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateScore {
    pub params: HyperParams,
    pub fold_scores: Vec<f64>,
    pub mean_score: f64,
    pub std_score: f64,
    /// 1 for the best mean; ties share the lower rank.
    pub rank: usize,
}

/// Everything about a finished search except the fitted estimator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchSummary {
    pub best_params: HyperParams,
    pub best_score: f64,
    pub best_index: usize,
    pub candidates: Vec<CandidateScore>,
}

#[derive(Debug, Clone)]
pub struct GridSearchResult {
    /// The best candidate refitted on the full input.
    pub best_estimator: Estimator,
    pub summary: SearchSummary,
}

impl GridSearchResult {
    pub fn into_parts(self) -> (Estimator, SearchSummary) {
        (self.best_estimator, self.summary)
    }
}

/// Exhaustive search over a list of candidates, scored by accuracy.
#[derive(Debug, Clone)]
pub struct GridSearch {
    pub candidates: Vec<HyperParams>,
    pub cv: StratifiedKFold,
    /// Passed to every estimator built during the search.
    pub random_state: u64,
}

impl GridSearch {
    pub fn new(candidates: Vec<HyperParams>, cv_folds: usize, random_state: u64) -> Self {
        Self {
            candidates,
            cv: StratifiedKFold::new(cv_folds),
            random_state,
        }
    }

    /// Score every (candidate, fold) pair in parallel, pick the first
    /// candidate with the highest mean accuracy and refit it on all of `x`.
    pub fn fit(&self, x: &Array2<f64>, y: &[u8]) -> Result<GridSearchResult> {
        check_fit_input(x, y)?;
        if self.candidates.is_empty() {
            return Err(ModelError::InvalidInput(
                "grid search needs at least one candidate".to_string(),
            ));
        }
        let folds = self.cv.split(y)?;
        log::info!(
            "Fitting {} folds for each of {} candidates, totalling {} fits",
            folds.len(),
            self.candidates.len(),
            folds.len() * self.candidates.len()
        );

        let jobs: Vec<(usize, usize)> = (0..self.candidates.len())
            .flat_map(|c| (0..folds.len()).map(move |f| (c, f)))
            .collect();

        let scores: Vec<f64> = jobs
            .par_iter()
            .map(|&(c, f)| -> Result<f64> {
                let fold = &folds[f];
                let x_train = x.select(Axis(0), &fold.train);
                let y_train: Vec<u8> = fold.train.iter().map(|&i| y[i]).collect();
                let x_test = x.select(Axis(0), &fold.test);
                let y_test: Vec<u8> = fold.test.iter().map(|&i| y[i]).collect();

                let mut model = build_model(&self.candidates[c], self.random_state);
                model.fit(&x_train, &y_train)?;
                let pred = model.predict(&x_test)?;
                Ok(metrics::accuracy(&y_test, &pred)?)
            })
            .collect::<Result<_>>()?;

        let n_folds = folds.len();
        let mut table: Vec<CandidateScore> = self
            .candidates
            .iter()
            .enumerate()
            .map(|(c, params)| {
                let fold_scores = scores[c * n_folds..(c + 1) * n_folds].to_vec();
                let mean = fold_scores.iter().sum::<f64>() / n_folds as f64;
                let var = fold_scores.iter().map(|s| (s - mean) * (s - mean)).sum::<f64>()
                    / n_folds as f64;
                CandidateScore {
                    params: params.clone(),
                    fold_scores,
                    mean_score: mean,
                    std_score: var.sqrt(),
                    rank: 0,
                }
            })
            .collect();

        let means: Vec<f64> = table.iter().map(|c| c.mean_score).collect();
        for cand in table.iter_mut() {
            cand.rank = 1 + means.iter().filter(|&&m| m > cand.mean_score).count();
        }

        // first maximum wins ties
        let mut best_index = 0;
        for (i, m) in means.iter().enumerate() {
            if *m > means[best_index] {
                best_index = i;
            }
        }
        for cand in &table {
            log::debug!(
                "{}: mean accuracy {:.4} (+/- {:.4}), rank {}",
                cand.params,
                cand.mean_score,
                cand.std_score,
                cand.rank
            );
        }

        let best_params = self.candidates[best_index].clone();
        let mut best_estimator = build_model(&best_params, self.random_state);
        best_estimator.fit(x, y)?;

        Ok(GridSearchResult {
            best_estimator,
            summary: SearchSummary {
                best_params,
                best_score: means[best_index],
                best_index,
                candidates: table,
            },
        })
    }
}
