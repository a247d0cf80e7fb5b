use std::path::Path;

use gbdt::config::Config;
use gbdt::decision_tree::{Data, DataVec};
use gbdt::gradient_boost::GBDT;
use ndarray::Array2;

use crate::config::{ModelConfig, ModelType};
use crate::error::CvError;
use crate::models::classifier_trait::ClassifierModel;

/// Gradient Boosting Decision Tree (GBDT) classifier.
pub struct GbdtClassifier {
    model: Option<GBDT>,
    config: ModelConfig,
}

impl GbdtClassifier {
    pub fn new(config: ModelConfig) -> Self {
        GbdtClassifier {
            model: None,
            config,
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(ModelConfig::default())
    }
}

impl ClassifierModel for GbdtClassifier {
    fn fit(&mut self, x: &Array2<f32>, y: &[u8]) -> Result<(), CvError> {
        if y.len() != x.nrows() {
            return Err(CvError::ShapeMismatch {
                expected: x.nrows(),
                got: y.len(),
                what: "label vector",
            });
        }

        let ModelType::GBDT {
            max_depth,
            num_boost_round,
            debug,
            training_optimization_level,
            loss_type,
        } = &self.config.model_type;

        let mut config = Config::new();
        config.set_feature_size(x.ncols());
        config.set_shrinkage(self.config.learning_rate);
        config.set_max_depth(*max_depth);
        config.set_iterations(*num_boost_round as usize);
        config.set_debug(*debug);
        config.set_training_optimization_level(*training_optimization_level);
        config.set_loss(loss_type);

        let mut gbdt = GBDT::new(&config);

        let mut train_x = DataVec::new();
        for (row, &label) in x.rows().into_iter().zip(y) {
            // The LogLikelyhood loss expects labels in {-1, 1}.
            let target = if label == 1 { 1.0 } else { -1.0 };
            train_x.push(Data::new_training_data(row.to_vec(), 1.0, target, None));
        }

        gbdt.fit(&mut train_x);
        self.model = Some(gbdt);
        Ok(())
    }

    fn predict(&self, x: &Array2<f32>) -> Result<Vec<f32>, CvError> {
        let model = self
            .model
            .as_ref()
            .ok_or_else(|| CvError::ClassifierFailure("predict called before fit".to_string()))?;

        let mut test_x = DataVec::new();
        for row in x.rows() {
            test_x.push(Data::new_training_data(row.to_vec(), 1.0, 0.0, None));
        }
        // With the LogLikelyhood loss, predict yields probabilities in (0, 1).
        Ok(model.predict(&test_x))
    }

    fn save(&self, store_dir: &Path) -> Result<(), CvError> {
        let model = self
            .model
            .as_ref()
            .ok_or_else(|| CvError::ClassifierFailure("save called before fit".to_string()))?;

        let path = store_dir.join("model.json");
        let path = path
            .to_str()
            .ok_or_else(|| CvError::Storage("model path is not valid UTF-8".to_string()))?;
        model
            .save_model(path)
            .map_err(|err| CvError::Storage(err.to_string()))
    }

    fn name(&self) -> &str {
        "GBDT"
    }
}
