use crate::error::{ModelError, Result};

/// A single train/test split of row indices.
#[derive(Debug, Clone, PartialEq)]
pub struct Fold {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

/// Unshuffled stratified K-fold splitter for binary labels.
///
/// Fold sizes per class are taken from a round-robin over the sorted labels,
/// so every fold gets close to the overall class ratio; within a class,
/// samples are assigned to folds in their original order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StratifiedKFold {
    pub n_splits: usize,
}

impl Default for StratifiedKFold {
    fn default() -> Self {
        Self { n_splits: 5 }
    }
}

impl StratifiedKFold {
    pub fn new(n_splits: usize) -> Self {
        Self { n_splits }
    }

    pub fn split(&self, y: &[u8]) -> Result<Vec<Fold>> {
        let k = self.n_splits;
        let n = y.len();
        if k < 2 {
            return Err(ModelError::InvalidInput(format!(
                "n_splits must be at least 2, got {}",
                k
            )));
        }
        if n < k {
            return Err(ModelError::InvalidInput(format!(
                "Cannot have number of splits n_splits={} greater than the number of samples: n_samples={}",
                k, n
            )));
        }

        let counts = [
            y.iter().filter(|&&v| v == 0).count(),
            y.iter().filter(|&&v| v == 1).count(),
        ];
        let present: Vec<usize> = counts.iter().copied().filter(|&c| c > 0).collect();
        let largest = present.iter().copied().max().unwrap_or(0);
        let smallest = present.iter().copied().min().unwrap_or(0);
        if largest < k {
            return Err(ModelError::InvalidInput(format!(
                "n_splits={} cannot be greater than the number of members in each class",
                k
            )));
        }
        if smallest < k {
            log::warn!(
                "The least populated class in y has only {} members, which is less than n_splits={}",
                smallest,
                k
            );
        }

        // sorted labels are counts[0] zeros then counts[1] ones; fold f
        // receives positions f, f + k, f + 2k, ...
        let mut allocation = vec![[0usize; 2]; k];
        for pos in 0..n {
            let class = usize::from(pos >= counts[0]);
            allocation[pos % k][class] += 1;
        }

        let mut test_fold = vec![0usize; n];
        for class in 0..2u8 {
            let mut fold_ids = allocation
                .iter()
                .enumerate()
                .flat_map(|(f, a)| std::iter::repeat(f).take(a[class as usize]));
            for (i, &label) in y.iter().enumerate() {
                if label == class {
                    // allocation for this class sums to its count
                    test_fold[i] = fold_ids.next().unwrap_or(k - 1);
                }
            }
        }

        Ok((0..k)
            .map(|f| {
                let (test, train): (Vec<usize>, Vec<usize>) =
                    (0..n).partition(|&i| test_fold[i] == f);
                Fold { train, test }
            })
            .collect())
    }
}
