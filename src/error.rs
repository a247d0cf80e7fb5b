use std::error::Error;
use std::fmt;

/// Error type for partitioning, metric estimation, and cross-validation runs.
#[derive(Debug)]
pub enum CvError {
    /// Not enough cases (or class members) for the chosen partition strategy.
    InsufficientData {
        needed: usize,
        got: usize,
        detail: &'static str,
    },
    /// Fewer than two label classes present where ROC/AUC is required.
    DegenerateLabels,
    /// Every bootstrap resample lacked one of the two classes.
    InsufficientBootstrapSamples,
    /// A label outside {0, 1}.
    InvalidLabel { case: usize, value: u8 },
    /// Row-aligned inputs disagree in length.
    ShapeMismatch {
        expected: usize,
        got: usize,
        what: &'static str,
    },
    /// Propagated unchanged from the injected classifier.
    ClassifierFailure(String),
    /// Failure creating or writing to the persistence target.
    Storage(String),
}

impl fmt::Display for CvError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            CvError::InsufficientData { needed, got, detail } => {
                write!(f, "Insufficient data: {} (needed {}, got {})", detail, needed, got)
            }
            CvError::DegenerateLabels => {
                write!(f, "Labels contain fewer than two classes; ROC/AUC is undefined")
            }
            CvError::InsufficientBootstrapSamples => {
                write!(f, "Every bootstrap resample lacked one of the classes")
            }
            CvError::InvalidLabel { case, value } => {
                write!(f, "Label {} at case {} is not binary (expected 0 or 1)", value, case)
            }
            CvError::ShapeMismatch { expected, got, what } => {
                write!(f, "{}: expected length {}, got {}", what, expected, got)
            }
            CvError::ClassifierFailure(msg) => write!(f, "Classifier failure: {}", msg),
            CvError::Storage(msg) => write!(f, "Storage failure: {}", msg),
        }
    }
}

impl Error for CvError {}

impl From<std::io::Error> for CvError {
    fn from(err: std::io::Error) -> Self {
        CvError::Storage(err.to_string())
    }
}

impl From<csv::Error> for CvError {
    fn from(err: csv::Error) -> Self {
        CvError::Storage(err.to_string())
    }
}
