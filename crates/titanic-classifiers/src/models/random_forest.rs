//! Bagged ensemble of CART trees.

use ndarray::Array2;
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};
use crate::models::classifier_trait::ClassifierModel;
use crate::models::decision_tree::DecisionTree;
use crate::models::utils::{check_fit_input, check_predict_input, sqrt_features};

/// Trees see a bootstrap sample of the rows and `sqrt(n_features)` candidate
/// features per split.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomForest {
    pub n_estimators: usize,
    pub max_depth: Option<usize>,
    /// Tree `i` is seeded with `random_state + i`.
    pub random_state: u64,
    trees: Vec<DecisionTree>,
    n_features: usize,
}

impl RandomForest {
    pub fn new(n_estimators: usize, max_depth: Option<usize>, random_state: u64) -> Self {
        Self {
            n_estimators,
            max_depth,
            random_state,
            trees: Vec::new(),
            n_features: 0,
        }
    }

    pub fn is_fitted(&self) -> bool {
        !self.trees.is_empty()
    }

    /// Mean of the per-tree importances over trees that split at least once,
    /// renormalised to sum to 1.
    pub fn feature_importances(&self) -> Result<Vec<f64>> {
        if !self.is_fitted() {
            return Err(ModelError::NotTrained("Random forest"));
        }
        let mut acc = vec![0.0; self.n_features];
        let mut used = 0usize;
        for tree in self.trees.iter().filter(|t| t.n_splits() > 0) {
            used += 1;
            for (a, v) in acc.iter_mut().zip(tree.feature_importances()) {
                *a += v;
            }
        }
        if used == 0 {
            return Ok(acc);
        }
        let total: f64 = acc.iter().sum();
        if total > 0.0 {
            for a in acc.iter_mut() {
                *a /= total;
            }
        }
        Ok(acc)
    }
}

impl ClassifierModel for RandomForest {
    fn fit(&mut self, x: &Array2<f64>, y: &[u8]) -> Result<()> {
        check_fit_input(x, y)?;
        if self.n_estimators == 0 {
            return Err(ModelError::InvalidInput(
                "n_estimators must be at least 1".to_string(),
            ));
        }
        let n = x.nrows();
        let n_features = x.ncols();
        let max_features = sqrt_features(n_features);

        let trees: Result<Vec<DecisionTree>> = (0..self.n_estimators)
            .into_par_iter()
            .map(|i| {
                let seed = self.random_state.wrapping_add(i as u64);
                let mut rng = ChaCha8Rng::seed_from_u64(seed);
                let indices: Vec<usize> = (0..n).map(|_| rng.gen_range(0..n)).collect();
                let mut tree = DecisionTree::new(self.max_depth)
                    .with_max_features(max_features)
                    .with_random_state(seed);
                tree.fit_indices(x, y, &indices, &mut rng)?;
                Ok(tree)
            })
            .collect();

        self.trees = trees?;
        self.n_features = n_features;
        log::debug!(
            "Fitted random forest: {} trees, max_depth {:?}, max_features {}",
            self.trees.len(),
            self.max_depth,
            max_features
        );
        Ok(())
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Vec<u8>> {
        Ok(self
            .predict_proba(x)?
            .into_iter()
            .map(|p| u8::from(p > 0.5))
            .collect())
    }

    /// Mean leaf probability across trees.
    fn predict_proba(&self, x: &Array2<f64>) -> Result<Vec<f64>> {
        if !self.is_fitted() {
            return Err(ModelError::NotTrained("Random forest"));
        }
        check_predict_input(x, self.n_features)?;

        let per_tree: Vec<Vec<f64>> = self
            .trees
            .par_iter()
            .map(|t| t.leaf_values(x))
            .collect::<Result<_>>()?;

        let mut proba = vec![0.0; x.nrows()];
        for values in &per_tree {
            for (p, v) in proba.iter_mut().zip(values) {
                *p += v;
            }
        }
        let k = self.trees.len() as f64;
        proba.iter_mut().for_each(|p| *p /= k);
        Ok(proba)
    }

    fn name(&self) -> &str {
        "random_forest"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn toy() -> (Array2<f64>, Vec<u8>) {
        let x = Array2::from_shape_fn((40, 3), |(i, j)| match j {
            0 => i as f64,
            1 => (i % 7) as f64,
            _ => ((i * 13) % 5) as f64,
        });
        let y = (0..40).map(|i| u8::from(i >= 20)).collect();
        (x, y)
    }

    #[test]
    fn test_forest_learns_threshold() {
        let (x, y) = toy();
        let mut rf = RandomForest::new(25, None, 42);
        rf.fit(&x, &y).unwrap();
        let pred = rf.predict(&x).unwrap();
        let correct = pred.iter().zip(&y).filter(|(p, t)| p == t).count();
        assert!(correct >= 38, "only {} of 40 correct", correct);
    }

    #[test]
    fn test_same_seed_same_model() {
        let (x, y) = toy();
        let mut a = RandomForest::new(10, Some(3), 7);
        let mut b = RandomForest::new(10, Some(3), 7);
        a.fit(&x, &y).unwrap();
        b.fit(&x, &y).unwrap();
        assert_eq!(a.predict_proba(&x).unwrap(), b.predict_proba(&x).unwrap());
    }

    #[test]
    fn test_importances_normalised() {
        let (x, y) = toy();
        let mut rf = RandomForest::new(10, Some(4), 42);
        rf.fit(&x, &y).unwrap();
        let imp = rf.feature_importances().unwrap();
        assert_eq!(imp.len(), 3);
        assert_abs_diff_eq!(imp.iter().sum::<f64>(), 1.0, epsilon = 1e-9);
        assert!(imp[0] > imp[1] && imp[0] > imp[2]);
    }

    #[test]
    fn test_probabilities_in_unit_interval() {
        let (x, y) = toy();
        let mut rf = RandomForest::new(5, Some(2), 1);
        rf.fit(&x, &y).unwrap();
        assert!(rf
            .predict_proba(&x)
            .unwrap()
            .iter()
            .all(|p| (0.0..=1.0).contains(p)));
    }
}
