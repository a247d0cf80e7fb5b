use crate::config::ModelConfig;
use crate::models::classifier_trait::ClassifierModel;
use crate::models::gbdt::GbdtClassifier;

/// Build a boxed classifier model from a `ModelConfig`.
/// Currently this is a thin factory implemented as a single function.
pub fn build_model(config: ModelConfig) -> Box<dyn ClassifierModel> {
    match config.model_type {
        crate::config::ModelType::GBDT { .. } => Box::new(GbdtClassifier::new(config)),
    }
}
