//! ROC analysis, bootstrap confidence intervals, and the metric estimator.
//!
//! `estimate_metrics` is the single entry point the runner uses for each
//! evaluation pool: it derives the ROC curve, picks the operating threshold
//! by the Youden criterion, fills the confusion-derived ratios, and attaches
//! the bootstrap confidence interval for the AUC.
use std::cmp::Ordering;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use statrs::statistics::Statistics;

use crate::error::CvError;
use crate::report::{MetricKey, MetricReport, MetricValue};

pub const N_BOOTSTRAPS: usize = 1000;
pub const BOOTSTRAP_SEED: u64 = 42;
pub const DEFAULT_CONFIDENCE: f64 = 0.95;

/// Row/column sums below this are treated as empty when deriving ratios.
const RATE_EPS: f64 = 1e-6;

/// A single point on the ROC curve.
#[derive(Debug, Clone)]
pub struct RocPoint {
    /// False positive rate: FP / (FP + TN).
    pub fpr: f64,
    /// True positive rate: TP / (TP + FN).
    pub tpr: f64,
    /// Score threshold at which this point is computed; binarization uses
    /// `score >= threshold`.
    pub threshold: f64,
}

#[derive(Debug, Clone)]
pub struct RocCurve {
    /// Points from (0, 0) at threshold +inf, walking thresholds in
    /// descending score order with tied scores grouped.
    pub points: Vec<RocPoint>,
}

/// Compute the ROC curve from prediction scores and binary labels.
pub fn roc_curve(predictions: &[f32], labels: &[u8]) -> Result<RocCurve, CvError> {
    if predictions.len() != labels.len() {
        return Err(CvError::ShapeMismatch {
            expected: labels.len(),
            got: predictions.len(),
            what: "prediction vector",
        });
    }
    let positives = labels.iter().filter(|&&l| l == 1).count();
    let negatives = labels.len() - positives;
    if positives == 0 || negatives == 0 {
        return Err(CvError::DegenerateLabels);
    }

    let mut order: Vec<usize> = (0..predictions.len()).collect();
    order.sort_by(|&a, &b| {
        predictions[b]
            .partial_cmp(&predictions[a])
            .unwrap_or(Ordering::Equal)
    });

    let mut points = vec![RocPoint {
        fpr: 0.0,
        tpr: 0.0,
        threshold: f64::INFINITY,
    }];

    let mut tp = 0usize;
    let mut fp = 0usize;
    let mut i = 0;
    while i < order.len() {
        let score = predictions[order[i]];
        while i < order.len() && predictions[order[i]] == score {
            if labels[order[i]] == 1 {
                tp += 1;
            } else {
                fp += 1;
            }
            i += 1;
        }
        points.push(RocPoint {
            fpr: fp as f64 / negatives as f64,
            tpr: tp as f64 / positives as f64,
            threshold: score as f64,
        });
    }

    Ok(RocCurve { points })
}

impl RocCurve {
    /// Area under the curve by the trapezoidal rule.
    pub fn auc(&self) -> f64 {
        self.points
            .windows(2)
            .map(|w| (w[1].fpr - w[0].fpr) * (w[0].tpr + w[1].tpr) / 2.0)
            .sum()
    }

    /// Index of the operating point maximising `(1 - fpr) + tpr`.
    ///
    /// Ties keep the first occurrence in curve enumeration order.
    pub fn youden_index(&self) -> usize {
        let mut best = 0;
        let mut best_score = f64::NEG_INFINITY;
        for (i, point) in self.points.iter().enumerate() {
            let score = (1.0 - point.fpr) + point.tpr;
            if score > best_score {
                best_score = score;
                best = i;
            }
        }
        best
    }
}

/// 2x2 confusion matrix with fixed label order [positive = 1, negative = 0]:
/// row 0 is the true positive class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfusionMatrix {
    pub true_positive: usize,
    pub false_negative: usize,
    pub false_positive: usize,
    pub true_negative: usize,
}

/// Binarize `predictions` at `threshold` (`>=` is positive) and tabulate
/// against `labels`.
pub fn confusion_matrix(predictions: &[f32], labels: &[u8], threshold: f64) -> ConfusionMatrix {
    let mut matrix = ConfusionMatrix {
        true_positive: 0,
        false_negative: 0,
        false_positive: 0,
        true_negative: 0,
    };
    for (&score, &label) in predictions.iter().zip(labels) {
        let predicted_positive = (score as f64) >= threshold;
        match (label == 1, predicted_positive) {
            (true, true) => matrix.true_positive += 1,
            (true, false) => matrix.false_negative += 1,
            (false, true) => matrix.false_positive += 1,
            (false, false) => matrix.true_negative += 1,
        }
    }
    matrix
}

impl ConfusionMatrix {
    fn guarded(numerator: usize, denominator: usize) -> f64 {
        if (denominator as f64) < RATE_EPS {
            0.0
        } else {
            numerator as f64 / denominator as f64
        }
    }

    pub fn total(&self) -> usize {
        self.true_positive + self.false_negative + self.false_positive + self.true_negative
    }

    pub fn accuracy(&self) -> f64 {
        Self::guarded(self.true_positive + self.true_negative, self.total())
    }

    /// Recall on the positive row; 0 when the row is empty.
    pub fn sensitivity(&self) -> f64 {
        Self::guarded(self.true_positive, self.true_positive + self.false_negative)
    }

    /// Recall on the negative row; 0 when the row is empty.
    pub fn specificity(&self) -> f64 {
        Self::guarded(self.true_negative, self.true_negative + self.false_positive)
    }

    /// Precision on the positive column; 0 when the column is empty.
    pub fn positive_predictive_value(&self) -> f64 {
        Self::guarded(self.true_positive, self.true_positive + self.false_positive)
    }

    /// Precision on the negative column; 0 when the column is empty.
    pub fn negative_predictive_value(&self) -> f64 {
        Self::guarded(self.true_negative, self.true_negative + self.false_negative)
    }
}

/// Point AUC with its bootstrap confidence interval.
#[derive(Debug, Clone, PartialEq)]
pub struct BootstrapAuc {
    pub auc: f64,
    pub lower: f64,
    pub upper: f64,
    /// Realized resample AUCs, sorted ascending. Resamples missing a class
    /// are discarded, so this can hold fewer than `N_BOOTSTRAPS` entries.
    pub scores: Vec<f64>,
}

/// Estimate a bootstrap confidence interval for the AUC.
///
/// Draws `N_BOOTSTRAPS` resamples with replacement using a fixed seed. The
/// index draws are generated sequentially from the seeded generator and the
/// per-resample AUCs are evaluated in parallel, so the result is identical
/// across runs and thread counts.
pub fn bootstrap_auc(
    predictions: &[f32],
    labels: &[u8],
    confidence: f64,
) -> Result<BootstrapAuc, CvError> {
    let point = roc_curve(predictions, labels)?.auc();

    let n = predictions.len();
    let mut rng = StdRng::seed_from_u64(BOOTSTRAP_SEED);
    let draws: Vec<Vec<usize>> = (0..N_BOOTSTRAPS)
        .map(|_| (0..n).map(|_| rng.gen_range(0..n)).collect())
        .collect();

    let mut scores: Vec<f64> = draws
        .par_iter()
        .filter_map(|indices| {
            let resampled_labels: Vec<u8> = indices.iter().map(|&i| labels[i]).collect();
            let resampled_preds: Vec<f32> = indices.iter().map(|&i| predictions[i]).collect();
            // Single-class resamples have no defined AUC and are discarded.
            roc_curve(&resampled_preds, &resampled_labels)
                .ok()
                .map(|curve| curve.auc())
        })
        .collect();

    if scores.is_empty() {
        return Err(CvError::InsufficientBootstrapSamples);
    }
    scores.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));

    let realized = scores.len();
    let alpha = (1.0 - confidence) / 2.0;
    let lower = scores[((alpha * realized as f64).floor() as usize).min(realized - 1)];
    let upper = scores[(((1.0 - alpha) * realized as f64).floor() as usize).min(realized - 1)];

    log::debug!(
        "bootstrap AUC: kept {}/{} resamples, mean {:.4}",
        realized,
        N_BOOTSTRAPS,
        (&scores).mean()
    );

    Ok(BootstrapAuc {
        auc: point,
        lower,
        upper,
        scores,
    })
}

/// Compute the full metric report for one evaluation pool.
///
/// The operating threshold is the Youden optimum of the pool's ROC curve;
/// the AUC and its interval are threshold-independent.
pub fn estimate_metrics(
    predictions: &[f32],
    labels: &[u8],
    prefix: &str,
) -> Result<MetricReport, CvError> {
    if predictions.len() != labels.len() {
        return Err(CvError::ShapeMismatch {
            expected: labels.len(),
            got: predictions.len(),
            what: "prediction vector",
        });
    }

    let mut report = MetricReport::new(prefix);
    let positives = labels.iter().filter(|&&l| l == 1).count();
    report.insert(MetricKey::SampleNumber, MetricValue::Count(labels.len()));
    report.insert(MetricKey::PositiveNumber, MetricValue::Count(positives));
    report.insert(
        MetricKey::NegativeNumber,
        MetricValue::Count(labels.len() - positives),
    );

    let curve = roc_curve(predictions, labels)?;
    let operating = &curve.points[curve.youden_index()];
    report.insert(
        MetricKey::YoudenIndex,
        MetricValue::Ratio(operating.threshold),
    );

    let matrix = confusion_matrix(predictions, labels, operating.threshold);
    report.insert(MetricKey::Accuracy, MetricValue::Ratio(matrix.accuracy()));
    report.insert(
        MetricKey::Sensitivity,
        MetricValue::Ratio(matrix.sensitivity()),
    );
    report.insert(
        MetricKey::Specificity,
        MetricValue::Ratio(matrix.specificity()),
    );
    report.insert(
        MetricKey::PositivePredictiveValue,
        MetricValue::Ratio(matrix.positive_predictive_value()),
    );
    report.insert(
        MetricKey::NegativePredictiveValue,
        MetricValue::Ratio(matrix.negative_predictive_value()),
    );

    let bootstrap = bootstrap_auc(predictions, labels, DEFAULT_CONFIDENCE)?;
    report.insert(MetricKey::Auc, MetricValue::Ratio(bootstrap.auc));
    report.insert(
        MetricKey::AucCi,
        MetricValue::Interval(bootstrap.lower, bootstrap.upper),
    );

    Ok(report)
}
