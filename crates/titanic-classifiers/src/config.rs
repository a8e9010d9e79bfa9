use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ModelError;

/// The two supported classifier families, keyed by their short tag.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModelType {
    #[serde(rename = "rf")]
    RandomForest,
    #[serde(rename = "svc")]
    Svc,
}

impl ModelType {
    pub const ALL: [ModelType; 2] = [ModelType::RandomForest, ModelType::Svc];

    /// Tag used on the command line, in query strings and in artifact names.
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelType::RandomForest => "rf",
            ModelType::Svc => "svc",
        }
    }

    /// Label written to the metrics file.
    pub fn display_name(&self) -> &'static str {
        match self {
            ModelType::RandomForest => "Random Forest",
            ModelType::Svc => "SVC",
        }
    }
}

impl Default for ModelType {
    fn default() -> Self {
        ModelType::RandomForest
    }
}

impl fmt::Display for ModelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModelType {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "rf" => Ok(ModelType::RandomForest),
            "svc" => Ok(ModelType::Svc),
            _ => Err(ModelError::InvalidModelType(s.to_string())),
        }
    }
}

/// SVC kernel function.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Kernel {
    Linear,
    Rbf,
}

impl fmt::Display for Kernel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Kernel::Linear => f.write_str("linear"),
            Kernel::Rbf => f.write_str("rbf"),
        }
    }
}

/// One point of a hyperparameter grid.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(tag = "model", rename_all = "snake_case")]
pub enum HyperParams {
    RandomForest {
        n_estimators: usize,
        max_depth: Option<usize>,
    },
    Svc {
        c: f64,
        kernel: Kernel,
    },
}

impl HyperParams {
    pub fn model_type(&self) -> ModelType {
        match self {
            HyperParams::RandomForest { .. } => ModelType::RandomForest,
            HyperParams::Svc { .. } => ModelType::Svc,
        }
    }
}

impl fmt::Display for HyperParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HyperParams::RandomForest {
                n_estimators,
                max_depth,
            } => {
                let depth = max_depth.map_or_else(|| "None".to_string(), |d| d.to_string());
                write!(f, "{{max_depth: {}, n_estimators: {}}}", depth, n_estimators)
            }
            HyperParams::Svc { c, kernel } => write!(f, "{{C: {}, kernel: {}}}", c, kernel),
        }
    }
}

/// Random forest search space.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct RandomForestGrid {
    pub n_estimators: Vec<usize>,
    /// `None` grows trees until the leaves are pure.
    pub max_depth: Vec<Option<usize>>,
}

impl Default for RandomForestGrid {
    fn default() -> Self {
        Self {
            n_estimators: vec![100, 200, 300],
            max_depth: vec![Some(4), Some(6), Some(8), None],
        }
    }
}

/// SVC search space.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct SvcGrid {
    pub c: Vec<f64>,
    pub kernel: Vec<Kernel>,
}

impl Default for SvcGrid {
    fn default() -> Self {
        Self {
            c: vec![0.01, 0.1, 1.0, 10.0],
            kernel: vec![Kernel::Linear, Kernel::Rbf],
        }
    }
}

/// Grid search settings shared by both model families.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct SearchConfig {
    pub cv_folds: usize,
    pub random_state: u64,
    pub random_forest: RandomForestGrid,
    pub svc: SvcGrid,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            cv_folds: 5,
            random_state: 42,
            random_forest: RandomForestGrid::default(),
            svc: SvcGrid::default(),
        }
    }
}

impl SearchConfig {
    /// Enumerate the candidates for one family.
    ///
    /// Parameter names are iterated in alphabetical order with the first name
    /// as the outer loop (`max_depth` then `n_estimators`; `C` then `kernel`),
    /// which fixes the tie-break order of the search.
    pub fn candidates(&self, model_type: ModelType) -> Vec<HyperParams> {
        match model_type {
            ModelType::RandomForest => {
                let grid = &self.random_forest;
                grid.max_depth
                    .iter()
                    .flat_map(|&max_depth| {
                        grid.n_estimators
                            .iter()
                            .map(move |&n_estimators| HyperParams::RandomForest {
                                n_estimators,
                                max_depth,
                            })
                    })
                    .collect()
            }
            ModelType::Svc => {
                let grid = &self.svc;
                grid.c
                    .iter()
                    .flat_map(|&c| {
                        grid.kernel
                            .iter()
                            .map(move |&kernel| HyperParams::Svc { c, kernel })
                    })
                    .collect()
            }
        }
    }
}
