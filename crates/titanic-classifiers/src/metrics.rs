//! Binary classification metrics over `0/1` labels.
//!
//! Ratios that would divide by zero (no predicted positives, no actual
//! positives) evaluate to `0.0`. ROC-AUC is the only metric that refuses
//! degenerate input: it needs both classes in `y_true`.
use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::MetricError;

/// Held-out performance of one fitted model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub roc_auc: f64,
}

impl Metrics {
    /// Column labels used in the metrics file, in value order.
    pub const HEADERS: [&'static str; 5] = ["Accuracy", "Precision", "Recall", "F1-score", "ROC-AUC"];

    /// Compute all five metrics. `y_score` is the positive-class probability.
    pub fn compute(y_true: &[u8], y_pred: &[u8], y_score: &[f64]) -> Result<Self, MetricError> {
        check_lengths(y_true, y_pred.len())?;
        Ok(Self {
            accuracy: accuracy(y_true, y_pred)?,
            precision: precision(y_true, y_pred)?,
            recall: recall(y_true, y_pred)?,
            f1: f1_score(y_true, y_pred)?,
            roc_auc: roc_auc(y_true, y_score)?,
        })
    }

    pub fn values(&self) -> [f64; 5] {
        [self.accuracy, self.precision, self.recall, self.f1, self.roc_auc]
    }
}

impl fmt::Display for Metrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = Self::HEADERS
            .iter()
            .zip(self.values())
            .map(|(name, value)| format!("{}: {:.4}", name, value))
            .collect();
        f.write_str(&parts.join(" | "))
    }
}

fn check_lengths(y_true: &[u8], other: usize) -> Result<(), MetricError> {
    if y_true.is_empty() {
        return Err(MetricError::Empty);
    }
    if y_true.len() != other {
        return Err(MetricError::LengthMismatch(y_true.len(), other));
    }
    Ok(())
}

#[derive(Default)]
struct Confusion {
    tp: usize,
    fp: usize,
    tn: usize,
    fn_: usize,
}

fn confusion(y_true: &[u8], y_pred: &[u8]) -> Result<Confusion, MetricError> {
    check_lengths(y_true, y_pred.len())?;
    let mut c = Confusion::default();
    for (&t, &p) in y_true.iter().zip(y_pred) {
        match (t == 1, p == 1) {
            (true, true) => c.tp += 1,
            (false, true) => c.fp += 1,
            (false, false) => c.tn += 1,
            (true, false) => c.fn_ += 1,
        }
    }
    Ok(c)
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64
    }
}

pub fn accuracy(y_true: &[u8], y_pred: &[u8]) -> Result<f64, MetricError> {
    let c = confusion(y_true, y_pred)?;
    Ok(ratio(c.tp + c.tn, y_true.len()))
}

pub fn precision(y_true: &[u8], y_pred: &[u8]) -> Result<f64, MetricError> {
    let c = confusion(y_true, y_pred)?;
    Ok(ratio(c.tp, c.tp + c.fp))
}

pub fn recall(y_true: &[u8], y_pred: &[u8]) -> Result<f64, MetricError> {
    let c = confusion(y_true, y_pred)?;
    Ok(ratio(c.tp, c.tp + c.fn_))
}

pub fn f1_score(y_true: &[u8], y_pred: &[u8]) -> Result<f64, MetricError> {
    let c = confusion(y_true, y_pred)?;
    Ok(ratio(2 * c.tp, 2 * c.tp + c.fp + c.fn_))
}

/// Area under the ROC curve via the Mann-Whitney rank statistic.
///
/// Tied scores share their average rank, which matches the trapezoidal
/// area under the empirical curve.
pub fn roc_auc(y_true: &[u8], y_score: &[f64]) -> Result<f64, MetricError> {
    check_lengths(y_true, y_score.len())?;

    let n_pos = y_true.iter().filter(|&&t| t == 1).count();
    let n_neg = y_true.len() - n_pos;
    if n_pos == 0 || n_neg == 0 {
        return Err(MetricError::SingleClass);
    }

    let mut order: Vec<usize> = (0..y_score.len()).collect();
    order.sort_by(|&a, &b| {
        y_score[a]
            .partial_cmp(&y_score[b])
            .unwrap_or(Ordering::Equal)
    });

    let mut rank_sum_pos = 0.0f64;
    let mut i = 0;
    while i < order.len() {
        let mut j = i + 1;
        while j < order.len() && y_score[order[j]] == y_score[order[i]] {
            j += 1;
        }
        // ranks i+1..=j share their mean
        let avg_rank = (i + 1 + j) as f64 / 2.0;
        for &idx in &order[i..j] {
            if y_true[idx] == 1 {
                rank_sum_pos += avg_rank;
            }
        }
        i = j;
    }

    let n_pos_f = n_pos as f64;
    let u = rank_sum_pos - n_pos_f * (n_pos_f + 1.0) / 2.0;
    Ok(u / (n_pos_f * n_neg as f64))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_auc_perfect_and_worst() {
        let y = [1, 1, 0, 0];
        assert_abs_diff_eq!(roc_auc(&y, &[0.9, 0.8, 0.3, 0.2]).unwrap(), 1.0);
        assert_abs_diff_eq!(roc_auc(&y, &[0.2, 0.3, 0.8, 0.9]).unwrap(), 0.0);
    }

    #[test]
    fn test_auc_ties_average() {
        let y = [1, 0, 1, 0];
        assert_abs_diff_eq!(roc_auc(&y, &[0.5; 4]).unwrap(), 0.5);
        // one positive ties with one negative, the other is ranked above both
        assert_abs_diff_eq!(roc_auc(&[1, 1, 0], &[0.9, 0.4, 0.4]).unwrap(), 0.75);
    }

    #[test]
    fn test_auc_single_class_fails() {
        assert_eq!(roc_auc(&[1, 1, 1], &[0.1, 0.2, 0.3]), Err(MetricError::SingleClass));
    }

    #[test]
    fn test_zero_division_is_zero() {
        let y_true = [1, 0, 1];
        let y_pred = [0, 0, 0];
        assert_eq!(precision(&y_true, &y_pred).unwrap(), 0.0);
        assert_eq!(f1_score(&y_true, &y_pred).unwrap(), 0.0);
        assert_eq!(recall(&[0, 0], &[1, 0]).unwrap(), 0.0);
    }

    #[test]
    fn test_compute_known_values() {
        let y_true = [1, 0, 1, 1, 0, 0];
        let y_pred = [1, 0, 0, 1, 1, 0];
        let y_score = [0.9, 0.1, 0.4, 0.8, 0.6, 0.2];
        let m = Metrics::compute(&y_true, &y_pred, &y_score).unwrap();
        assert_abs_diff_eq!(m.accuracy, 4.0 / 6.0, epsilon = 1e-12);
        assert_abs_diff_eq!(m.precision, 2.0 / 3.0, epsilon = 1e-12);
        assert_abs_diff_eq!(m.recall, 2.0 / 3.0, epsilon = 1e-12);
        assert_abs_diff_eq!(m.f1, 2.0 / 3.0, epsilon = 1e-12);
        assert_abs_diff_eq!(m.roc_auc, 8.0 / 9.0, epsilon = 1e-12);
    }

    #[test]
    fn test_length_mismatch() {
        assert_eq!(
            accuracy(&[1, 0], &[1]),
            Err(MetricError::LengthMismatch(2, 1))
        );
        assert_eq!(accuracy(&[], &[]), Err(MetricError::Empty));
    }
}
