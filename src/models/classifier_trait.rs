use std::path::Path;

use ndarray::Array2;

use crate::error::CvError;

/// The classifier contract the cross-validation runner consumes.
///
/// `fit` replaces any previously fitted state; the runner refits once per
/// fold and a final time on the full dataset, so callers must not assume a
/// stable fit after a run completes. `predict` must be deterministic given
/// the fitted state and return one score in [0, 1] per row.
pub trait ClassifierModel {
    /// Fit on `x` (cases x features) with binary labels (0/1).
    fn fit(&mut self, x: &Array2<f32>, y: &[u8]) -> Result<(), CvError>;

    /// Score every row of `x`.
    fn predict(&self, x: &Array2<f32>) -> Result<Vec<f32>, CvError>;

    /// Persist the fitted state under `store_dir`.
    fn save(&self, store_dir: &Path) -> Result<(), CvError>;

    /// Optional human readable name for the model
    fn name(&self) -> &str {
        "classifier"
    }
}
