use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Partitioning strategy for a cross-validation run.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CvStrategy {
    LeaveOneOut,
    StratifiedKFold { folds: usize },
}

impl Default for CvStrategy {
    fn default() -> Self {
        CvStrategy::StratifiedKFold { folds: 5 }
    }
}

impl FromStr for CvStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "loo" | "leave_one_out" | "leaveoneout" => Ok(CvStrategy::LeaveOneOut),
            "5fold" | "5_fold" | "cv5" => Ok(CvStrategy::StratifiedKFold { folds: 5 }),
            "10fold" | "10_fold" | "cv10" => Ok(CvStrategy::StratifiedKFold { folds: 10 }),
            _ => Err(format!(
                "Unknown cross-validation strategy: {}. Expected one of 'loo', '5fold', '10fold'",
                s
            )),
        }
    }
}

/// Central configuration for classifier models in the crate.
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct ModelConfig {
    pub learning_rate: f32,

    #[serde(flatten)]
    pub model_type: ModelType,
}

/// Supported model types and their hyper-parameters.
#[derive(Deserialize, Serialize, Debug, Clone)]
pub enum ModelType {
    GBDT {
        max_depth: u32,
        num_boost_round: u32,
        debug: bool,
        training_optimization_level: u8,
        loss_type: String,
    },
}

impl Default for ModelType {
    fn default() -> Self {
        ModelType::GBDT {
            max_depth: 6,
            num_boost_round: 50,
            debug: false,
            training_optimization_level: 2,
            loss_type: "LogLikelyhood".to_string(),
        }
    }
}

impl FromStr for ModelType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "gbdt" => Ok(ModelType::default()),
            _ => Err(format!("Unknown model type: {}", s)),
        }
    }
}

impl ModelConfig {
    pub fn new(learning_rate: f32, model_type: ModelType) -> Self {
        Self {
            learning_rate,
            model_type,
        }
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            learning_rate: 0.1,
            model_type: ModelType::default(),
        }
    }
}
