//! Feature preparation: raw passenger rows to the fixed 12-column matrix.
//!
//! The column order in [`FEATURE_NAMES`] is a positional contract shared by
//! training, the persisted scaler and the HTTP layer.
use ndarray::Array2;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::error::DataError;
use crate::io::titanic_csv::RawPassenger;

pub const FEATURE_NAMES: [&str; 12] = [
    "Age", "SibSp", "Parch", "Fare", "C", "Q", "S", "female", "male", "Class_1", "Class_2",
    "Class_3",
];

pub const N_FEATURES: usize = FEATURE_NAMES.len();

/// Columns standardised by the scaler (Age, Fare).
pub const CONTINUOUS_FEATURES: [usize; 2] = [0, 3];

/// Port assumed when `Embarked` is missing.
pub const DEFAULT_EMBARKED: &str = "S";

const PORTS: [&str; 3] = ["C", "Q", "S"];
const SEXES: [&str; 2] = ["female", "male"];
const CLASSES: [i64; 3] = [1, 2, 3];

/// One fully prepared passenger, as accepted by the prediction endpoint.
#[allow(non_snake_case)]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PassengerFeatures {
    pub Age: f64,
    pub SibSp: i64,
    pub Parch: i64,
    pub Fare: f64,
    pub C: bool,
    pub Q: bool,
    pub S: bool,
    pub female: bool,
    pub male: bool,
    pub Class_1: bool,
    pub Class_2: bool,
    pub Class_3: bool,
}

fn flag(b: bool) -> f64 {
    if b {
        1.0
    } else {
        0.0
    }
}

impl PassengerFeatures {
    /// Check the invariants a prepared record must satisfy: exactly one flag
    /// per indicator group, finite non-negative numerics.
    pub fn validate(&self) -> Result<(), DataError> {
        let groups: [(&str, &[bool]); 3] = [
            ("port (C, Q, S)", &[self.C, self.Q, self.S]),
            ("sex (female, male)", &[self.female, self.male]),
            ("class (Class_1, Class_2, Class_3)", &[self.Class_1, self.Class_2, self.Class_3]),
        ];
        for (name, flags) in groups {
            let set = flags.iter().filter(|&&f| f).count();
            if set != 1 {
                return Err(DataError::InvalidRecord(format!(
                    "exactly one {} indicator must be true, found {}",
                    name, set
                )));
            }
        }

        if !self.Age.is_finite() || self.Age < 0.0 {
            return Err(DataError::InvalidRecord(format!("Age must be a non-negative number, got {}", self.Age)));
        }
        if !self.Fare.is_finite() || self.Fare < 0.0 {
            return Err(DataError::InvalidRecord(format!("Fare must be a non-negative number, got {}", self.Fare)));
        }
        if self.SibSp < 0 || self.Parch < 0 {
            return Err(DataError::InvalidRecord("SibSp and Parch must be non-negative".to_string()));
        }
        Ok(())
    }

    /// Feature values in [`FEATURE_NAMES`] order.
    pub fn to_row(&self) -> [f64; N_FEATURES] {
        [
            self.Age,
            self.SibSp as f64,
            self.Parch as f64,
            self.Fare,
            flag(self.C),
            flag(self.Q),
            flag(self.S),
            flag(self.female),
            flag(self.male),
            flag(self.Class_1),
            flag(self.Class_2),
            flag(self.Class_3),
        ]
    }
}

pub fn features_to_matrix(records: &[PassengerFeatures]) -> Array2<f64> {
    let rows: Vec<[f64; N_FEATURES]> = records.iter().map(PassengerFeatures::to_row).collect();
    Array2::from_shape_fn((rows.len(), N_FEATURES), |(i, j)| rows[i][j])
}

/// Output of [`preprocess`].
#[derive(Debug, Clone)]
pub struct PreparedData {
    pub passenger_ids: Vec<i64>,
    pub x: Array2<f64>,
    /// `None` when the input carried no `Survived` column.
    pub y: Option<Vec<u8>>,
    /// Median used to fill missing ages in this call.
    pub age_median: f64,
}

/// Median of the values, averaging the two middle elements for even counts.
fn median(values: &mut [f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(|a, b| a.total_cmp(b));
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        Some((values[mid - 1] + values[mid]) / 2.0)
    } else {
        Some(values[mid])
    }
}

fn one_hot<T: PartialEq>(value: &T, categories: &[T]) -> Option<Vec<f64>> {
    let pos = categories.iter().position(|c| c == value)?;
    Some((0..categories.len()).map(|i| flag(i == pos)).collect())
}

/// Turn raw passenger rows into the 12-column feature matrix.
///
/// Missing ages are filled with the median age of *this* input set, so
/// training and later batches may impute differently. The median used is
/// returned. Missing fares are filled the same way.
pub fn preprocess(records: &[RawPassenger]) -> Result<PreparedData, DataError> {
    if records.is_empty() {
        return Err(DataError::Empty);
    }

    let mut ages: Vec<f64> = records.iter().filter_map(|r| r.age).filter(|a| !a.is_nan()).collect();
    let age_median = median(&mut ages).ok_or(DataError::NoAgeValues)?;
    let n_missing_age = records.len() - ages.len();
    if n_missing_age > 0 {
        log::info!("Imputing {} missing Age values with median {:.2}", n_missing_age, age_median);
    }

    let mut fares: Vec<f64> = records.iter().filter_map(|r| r.fare).filter(|f| !f.is_nan()).collect();
    let fare_median = median(&mut fares).unwrap_or(0.0);
    if fares.len() < records.len() {
        log::warn!(
            "Imputing {} missing Fare values with median {:.4}",
            records.len() - fares.len(),
            fare_median
        );
    }

    let labeled = records.iter().any(|r| r.survived.is_some());
    let mut y = Vec::with_capacity(records.len());
    let mut data = Vec::with_capacity(records.len() * N_FEATURES);

    for r in records {
        let embarked = r
            .embarked
            .as_deref()
            .map(str::trim)
            .filter(|e| !e.is_empty())
            .unwrap_or(DEFAULT_EMBARKED);
        let port = one_hot(&embarked, &PORTS).ok_or_else(|| DataError::UnknownCategory {
            column: "Embarked",
            value: embarked.to_string(),
            passenger_id: r.passenger_id,
        })?;
        let sex_value = r.sex.trim().to_lowercase();
        let sex = one_hot(&sex_value.as_str(), &SEXES).ok_or_else(|| DataError::UnknownCategory {
            column: "Sex",
            value: r.sex.clone(),
            passenger_id: r.passenger_id,
        })?;
        let class = one_hot(&r.pclass, &CLASSES).ok_or_else(|| DataError::UnknownCategory {
            column: "Pclass",
            value: r.pclass.to_string(),
            passenger_id: r.passenger_id,
        })?;

        data.push(r.age.filter(|a| !a.is_nan()).unwrap_or(age_median));
        data.push(r.sibsp as f64);
        data.push(r.parch as f64);
        data.push(r.fare.filter(|f| !f.is_nan()).unwrap_or(fare_median));
        data.extend(port);
        data.extend(sex);
        data.extend(class);

        if labeled {
            match r.survived {
                Some(label @ (0 | 1)) => y.push(label),
                Some(other) => {
                    return Err(DataError::InvalidRecord(format!(
                        "Survived must be 0 or 1 for passenger {}, got {}",
                        r.passenger_id, other
                    )))
                }
                None => {
                    return Err(DataError::InvalidRecord(format!(
                        "missing Survived label for passenger {}",
                        r.passenger_id
                    )))
                }
            }
        }
    }

    let x = Array2::from_shape_vec((records.len(), N_FEATURES), data)
        .map_err(|e| DataError::InvalidRecord(e.to_string()))?;

    Ok(PreparedData {
        passenger_ids: records.iter().map(|r| r.passenger_id).collect(),
        x,
        y: labeled.then_some(y),
        age_median,
    })
}

/// Train/test partition of a labelled matrix.
#[derive(Debug, Clone)]
pub struct Split {
    pub x_train: Array2<f64>,
    pub y_train: Vec<u8>,
    pub x_test: Array2<f64>,
    pub y_test: Vec<u8>,
}

/// Seeded shuffle split; `ceil(n * test_size)` rows go to the test side.
pub fn train_test_split(
    x: &Array2<f64>,
    y: &[u8],
    test_size: f64,
    seed: u64,
) -> Result<Split, DataError> {
    if !(test_size > 0.0 && test_size < 1.0) {
        return Err(DataError::InvalidSplit(format!(
            "test_size must lie in (0, 1), got {}",
            test_size
        )));
    }
    let n = x.nrows();
    if n != y.len() {
        return Err(DataError::InvalidSplit(format!(
            "{} rows but {} labels",
            n,
            y.len()
        )));
    }
    let n_test = (n as f64 * test_size).ceil() as usize;
    if n_test == 0 || n_test >= n {
        return Err(DataError::InvalidSplit(format!(
            "{} samples cannot be split with test_size {}",
            n, test_size
        )));
    }

    let mut indices: Vec<usize> = (0..n).collect();
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    indices.shuffle(&mut rng);
    let (test_idx, train_idx) = indices.split_at(n_test);

    Ok(Split {
        x_train: x.select(ndarray::Axis(0), train_idx),
        y_train: train_idx.iter().map(|&i| y[i]).collect(),
        x_test: x.select(ndarray::Axis(0), test_idx),
        y_test: test_idx.iter().map(|&i| y[i]).collect(),
    })
}
