//! Case-aligned dataset container consumed by the cross-validation runner.
//!
//! A `Dataset` holds the feature matrix, the binary label vector, and the
//! case identifiers for one cohort. Row order is significant: partitions,
//! fold records, and pooled predictions all refer to cases by row index.
use ndarray::{Array2, Axis};

use crate::error::CvError;

#[derive(Debug, Clone)]
pub struct Dataset {
    x: Array2<f32>,
    labels: Vec<u8>,
    case_names: Vec<String>,
}

impl Dataset {
    /// Build a dataset, enforcing the row-alignment invariants: one label and
    /// one case name per feature row, and labels restricted to {0, 1}.
    pub fn new(x: Array2<f32>, labels: Vec<u8>, case_names: Vec<String>) -> Result<Self, CvError> {
        if labels.len() != x.nrows() {
            return Err(CvError::ShapeMismatch {
                expected: x.nrows(),
                got: labels.len(),
                what: "label vector",
            });
        }
        if case_names.len() != x.nrows() {
            return Err(CvError::ShapeMismatch {
                expected: x.nrows(),
                got: case_names.len(),
                what: "case name vector",
            });
        }
        for (case, &label) in labels.iter().enumerate() {
            if label > 1 {
                return Err(CvError::InvalidLabel { case, value: label });
            }
        }
        Ok(Dataset {
            x,
            labels,
            case_names,
        })
    }

    pub fn features(&self) -> &Array2<f32> {
        &self.x
    }

    pub fn labels(&self) -> &[u8] {
        &self.labels
    }

    pub fn case_names(&self) -> &[String] {
        &self.case_names
    }

    pub fn n_cases(&self) -> usize {
        self.x.nrows()
    }

    pub fn n_features(&self) -> usize {
        self.x.ncols()
    }

    pub fn is_empty(&self) -> bool {
        self.x.nrows() == 0
    }

    pub fn positives(&self) -> usize {
        self.labels.iter().filter(|&&l| l == 1).count()
    }

    pub fn negatives(&self) -> usize {
        self.labels.len() - self.positives()
    }

    /// Extract the subset of cases at `indices`, preserving the given order.
    pub fn select(&self, indices: &[usize]) -> Dataset {
        Dataset {
            x: self.x.select(Axis(0), indices),
            labels: indices.iter().map(|&i| self.labels[i]).collect(),
            case_names: indices.iter().map(|&i| self.case_names[i].clone()).collect(),
        }
    }

    pub fn log_summary(&self) {
        log::info!(
            "Dataset: {} cases ({} positive, {} negative), {} features",
            self.n_cases(),
            self.positives(),
            self.negatives(),
            self.n_features()
        );
    }
}
