//! CART classification tree with Gini impurity.
//!
//! Nodes live in a flat arena (`Vec<Node>`) with child indices, which keeps
//! the fitted tree trivially serializable and cheap to traverse.

use ndarray::{Array2, ArrayView1};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};
use crate::models::classifier_trait::ClassifierModel;
use crate::models::utils::{check_fit_input, check_predict_input, sqrt_features};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Node {
    /// Terminal node holding the positive-class fraction of its samples.
    Leaf { value: f64, n_samples: usize },
    /// `x[feature] <= threshold` goes left.
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
        n_samples: usize,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionTree {
    pub max_depth: Option<usize>,
    /// Features examined per split; `None` means `sqrt(n_features)`.
    pub max_features: Option<usize>,
    pub min_samples_split: usize,
    /// Seed used by [`ClassifierModel::fit`].
    pub random_state: u64,
    nodes: Vec<Node>,
    n_features: usize,
    feature_importances: Vec<f64>,
}

struct BestSplit {
    feature: usize,
    threshold: f64,
    /// Weighted child impurity, `n_left * gini_left + n_right * gini_right`.
    children_impurity: f64,
}

fn gini(pos: usize, n: usize) -> f64 {
    if n == 0 {
        return 0.0;
    }
    let p = pos as f64 / n as f64;
    2.0 * p * (1.0 - p)
}

impl Default for DecisionTree {
    fn default() -> Self {
        Self::new(None)
    }
}

impl DecisionTree {
    pub fn new(max_depth: Option<usize>) -> Self {
        Self {
            max_depth,
            max_features: None,
            min_samples_split: 2,
            random_state: 0,
            nodes: Vec::new(),
            n_features: 0,
            feature_importances: Vec::new(),
        }
    }

    pub fn with_max_features(mut self, max_features: usize) -> Self {
        self.max_features = Some(max_features.max(1));
        self
    }

    pub fn with_random_state(mut self, seed: u64) -> Self {
        self.random_state = seed;
        self
    }

    pub fn is_fitted(&self) -> bool {
        !self.nodes.is_empty()
    }

    pub fn n_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// Number of internal (split) nodes.
    pub fn n_splits(&self) -> usize {
        self.nodes
            .iter()
            .filter(|n| matches!(n, Node::Split { .. }))
            .count()
    }

    pub fn depth(&self) -> usize {
        fn walk(nodes: &[Node], id: usize) -> usize {
            match &nodes[id] {
                Node::Leaf { .. } => 0,
                Node::Split { left, right, .. } => 1 + walk(nodes, *left).max(walk(nodes, *right)),
            }
        }
        if self.nodes.is_empty() {
            0
        } else {
            walk(&self.nodes, 0)
        }
    }

    /// Normalised impurity-decrease importances; all zero for a single leaf.
    pub fn feature_importances(&self) -> &[f64] {
        &self.feature_importances
    }

    /// Grow the tree on the rows listed in `indices`.
    ///
    /// Repeated indices act as sample weights, which is how bootstrap samples
    /// are passed in by the forest.
    pub fn fit_indices(
        &mut self,
        x: &Array2<f64>,
        y: &[u8],
        indices: &[usize],
        rng: &mut ChaCha8Rng,
    ) -> Result<()> {
        if indices.is_empty() {
            return Err(ModelError::InvalidInput(
                "cannot grow a tree on zero samples".to_string(),
            ));
        }
        self.n_features = x.ncols();
        self.nodes.clear();
        self.feature_importances = vec![0.0; self.n_features];

        let mut idx = indices.to_vec();
        self.grow(x, y, &mut idx, 0, rng);

        let total: f64 = self.feature_importances.iter().sum();
        if total > 0.0 {
            for v in self.feature_importances.iter_mut() {
                *v /= total;
            }
        }
        Ok(())
    }

    fn grow(
        &mut self,
        x: &Array2<f64>,
        y: &[u8],
        idx: &mut [usize],
        depth: usize,
        rng: &mut ChaCha8Rng,
    ) -> usize {
        let node_id = self.nodes.len();
        let n = idx.len();
        let pos = idx.iter().filter(|&&i| y[i] == 1).count();
        let value = pos as f64 / n as f64;
        let impurity = gini(pos, n);

        let stop = self.max_depth.map_or(false, |d| depth >= d)
            || n < self.min_samples_split
            || impurity <= 0.0;

        let best = if stop {
            None
        } else {
            self.best_split(x, y, idx, pos, rng)
        };

        let Some(best) = best else {
            self.nodes.push(Node::Leaf { value, n_samples: n });
            return node_id;
        };

        // placeholder, replaced once both children exist
        self.nodes.push(Node::Leaf { value, n_samples: n });

        let f = best.feature;
        idx.sort_by(|&a, &b| x[[a, f]].total_cmp(&x[[b, f]]));
        let n_left = idx.partition_point(|&i| x[[i, f]] <= best.threshold);
        self.feature_importances[f] += n as f64 * impurity - best.children_impurity;

        let (left_idx, right_idx) = idx.split_at_mut(n_left);
        let left = self.grow(x, y, left_idx, depth + 1, rng);
        let right = self.grow(x, y, right_idx, depth + 1, rng);

        self.nodes[node_id] = Node::Split {
            feature: f,
            threshold: best.threshold,
            left,
            right,
            n_samples: n,
        };
        node_id
    }

    /// Search a random subset of features for the split with the lowest
    /// weighted child impurity. Constant features do not use up the budget.
    fn best_split(
        &self,
        x: &Array2<f64>,
        y: &[u8],
        idx: &[usize],
        total_pos: usize,
        rng: &mut ChaCha8Rng,
    ) -> Option<BestSplit> {
        let budget = self
            .max_features
            .unwrap_or_else(|| sqrt_features(self.n_features))
            .min(self.n_features);
        let mut features: Vec<usize> = (0..self.n_features).collect();
        features.shuffle(rng);

        let n = idx.len();
        let mut order = idx.to_vec();
        let mut best: Option<BestSplit> = None;
        let mut visited = 0;

        for f in features {
            if visited >= budget {
                break;
            }
            order.sort_by(|&a, &b| x[[a, f]].total_cmp(&x[[b, f]]));
            let first = x[[order[0], f]];
            let last = x[[order[n - 1], f]];
            if first == last {
                continue;
            }
            visited += 1;

            let mut left_pos = 0usize;
            for k in 0..n - 1 {
                if y[order[k]] == 1 {
                    left_pos += 1;
                }
                let a = x[[order[k], f]];
                let b = x[[order[k + 1], f]];
                if a == b {
                    continue;
                }
                let n_left = k + 1;
                let n_right = n - n_left;
                let children = n_left as f64 * gini(left_pos, n_left)
                    + n_right as f64 * gini(total_pos - left_pos, n_right);

                if best.as_ref().map_or(true, |s| children < s.children_impurity) {
                    let mut threshold = a / 2.0 + b / 2.0;
                    // rounding can land the midpoint on the upper value
                    if threshold >= b || !threshold.is_finite() {
                        threshold = a;
                    }
                    best = Some(BestSplit {
                        feature: f,
                        threshold,
                        children_impurity: children,
                    });
                }
            }
        }
        best
    }

    fn leaf_value(&self, row: ArrayView1<f64>) -> f64 {
        let mut id = 0;
        loop {
            match &self.nodes[id] {
                Node::Leaf { value, .. } => return *value,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                    ..
                } => {
                    id = if row[*feature] <= *threshold { *left } else { *right };
                }
            }
        }
    }

    /// Positive-class fraction of the leaf each row falls into.
    pub fn leaf_values(&self, x: &Array2<f64>) -> Result<Vec<f64>> {
        if !self.is_fitted() {
            return Err(ModelError::NotTrained("Decision tree"));
        }
        check_predict_input(x, self.n_features)?;
        Ok(x.rows().into_iter().map(|row| self.leaf_value(row)).collect())
    }
}

impl ClassifierModel for DecisionTree {
    fn fit(&mut self, x: &Array2<f64>, y: &[u8]) -> Result<()> {
        check_fit_input(x, y)?;
        let mut rng = ChaCha8Rng::seed_from_u64(self.random_state);
        let indices: Vec<usize> = (0..x.nrows()).collect();
        self.fit_indices(x, y, &indices, &mut rng)
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Vec<u8>> {
        Ok(self
            .predict_proba(x)?
            .into_iter()
            .map(|p| u8::from(p > 0.5))
            .collect())
    }

    fn predict_proba(&self, x: &Array2<f64>) -> Result<Vec<f64>> {
        self.leaf_values(x)
    }

    fn name(&self) -> &str {
        "decision_tree"
    }
}
