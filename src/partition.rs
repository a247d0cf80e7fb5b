//! Partitioning strategies for cross-validation.
//!
//! A `Partitioner` turns the label vector of a dataset into a finite
//! sequence of train/validation index splits. Both strategies here are
//! deterministic: leave-one-out enumerates cases in order, and the
//! stratified k-fold assigns each class's members to folds in dataset
//! order without shuffling, so repeated runs see identical folds.
use crate::config::CvStrategy;
use crate::error::CvError;

/// One train/validation split over case indices. The two sets are disjoint;
/// for k-fold strategies their union covers the whole dataset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Partition {
    pub train: Vec<usize>,
    pub validation: Vec<usize>,
}

pub trait Partitioner {
    /// Produce the full sequence of splits for `labels`.
    fn split(&self, labels: &[u8]) -> Result<Vec<Partition>, CvError>;

    fn name(&self) -> String;

    /// Tag used in fold-record file names (`train_cv<tag>_info.csv`).
    fn fold_tag(&self) -> String;

    /// Whether fold records carry a Group column.
    fn records_group(&self) -> bool;

    /// Sentence describing the scheme for method reports.
    fn description(&self, with_test: bool) -> String {
        if with_test {
            format!(
                "To determine the hyper-parameters of the model, {} cross validation \
                 was applied on the training data set and the model was selected \
                 according to its performance on the validation folds. ",
                self.name()
            )
        } else {
            format!(
                "To prove the performance of the model, {} cross validation was \
                 applied on the data set. ",
                self.name()
            )
        }
    }
}

/// Build a boxed partitioner from a `CvStrategy`.
pub fn build_partitioner(strategy: &CvStrategy) -> Box<dyn Partitioner> {
    match strategy {
        CvStrategy::LeaveOneOut => Box::new(LeaveOneOut),
        CvStrategy::StratifiedKFold { folds } => Box::new(StratifiedKFold::new(*folds)),
    }
}

/// Leave-one-out: N partitions, each validating on a single case.
#[derive(Debug, Clone, Copy)]
pub struct LeaveOneOut;

impl Partitioner for LeaveOneOut {
    fn split(&self, labels: &[u8]) -> Result<Vec<Partition>, CvError> {
        let n = labels.len();
        if n < 2 {
            return Err(CvError::InsufficientData {
                needed: 2,
                got: n,
                detail: "leave-one-out needs at least two cases",
            });
        }
        Ok((0..n)
            .map(|held_out| Partition {
                train: (0..n).filter(|&i| i != held_out).collect(),
                validation: vec![held_out],
            })
            .collect())
    }

    fn name(&self) -> String {
        "LeaveOneOut".to_string()
    }

    fn fold_tag(&self) -> String {
        "loo".to_string()
    }

    fn records_group(&self) -> bool {
        false
    }
}

/// Stratified k-fold without shuffling.
///
/// Each class's members are chunked into k contiguous runs in dataset
/// order; the first `n_c % k` folds receive one extra member. Every fold's
/// label ratio therefore differs from the global ratio by at most one
/// case's worth of rounding.
#[derive(Debug, Clone, Copy)]
pub struct StratifiedKFold {
    folds: usize,
}

impl StratifiedKFold {
    pub fn new(folds: usize) -> Self {
        assert!(folds >= 2, "stratified k-fold needs at least two folds");
        StratifiedKFold { folds }
    }

    pub fn folds(&self) -> usize {
        self.folds
    }
}

impl Partitioner for StratifiedKFold {
    fn split(&self, labels: &[u8]) -> Result<Vec<Partition>, CvError> {
        let n = labels.len();
        if n < self.folds {
            return Err(CvError::InsufficientData {
                needed: self.folds,
                got: n,
                detail: "fewer cases than folds",
            });
        }

        let negatives: Vec<usize> = (0..n).filter(|&i| labels[i] == 0).collect();
        let positives: Vec<usize> = (0..n).filter(|&i| labels[i] == 1).collect();
        for class in [&negatives, &positives] {
            if class.len() < self.folds {
                return Err(CvError::InsufficientData {
                    needed: self.folds,
                    got: class.len(),
                    detail: "each label class needs at least one case per fold",
                });
            }
        }

        let mut validation_sets = vec![Vec::new(); self.folds];
        for class in [&negatives, &positives] {
            let base = class.len() / self.folds;
            let extra = class.len() % self.folds;
            let mut offset = 0;
            for (fold, validation) in validation_sets.iter_mut().enumerate() {
                let take = base + usize::from(fold < extra);
                validation.extend_from_slice(&class[offset..offset + take]);
                offset += take;
            }
        }

        Ok(validation_sets
            .into_iter()
            .map(|mut validation| {
                validation.sort_unstable();
                let train = (0..n).filter(|i| !validation.contains(i)).collect();
                Partition { train, validation }
            })
            .collect())
    }

    fn name(&self) -> String {
        format!("{}-Fold", self.folds)
    }

    fn fold_tag(&self) -> String {
        self.folds.to_string()
    }

    fn records_group(&self) -> bool {
        true
    }
}
