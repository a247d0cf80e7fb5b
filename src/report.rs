//! Typed metric report produced by the estimator.
//!
//! Reports used to be free-form string maps; keys collided silently between
//! the train/val/test prefixes. `MetricReport` keeps a closed key set and a
//! single prefix per report, and only renders the prefixed string form when
//! rows are written out.
use std::fmt;

/// The closed set of metrics a report can carry.
///
/// `as_str` yields the historical spellings (including `Yorden Index`) so
/// that `result.csv` stays readable by downstream tooling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricKey {
    SampleNumber,
    PositiveNumber,
    NegativeNumber,
    Accuracy,
    Sensitivity,
    Specificity,
    PositivePredictiveValue,
    NegativePredictiveValue,
    Auc,
    AucCi,
    YoudenIndex,
}

impl MetricKey {
    pub const ALL: [MetricKey; 11] = [
        MetricKey::SampleNumber,
        MetricKey::PositiveNumber,
        MetricKey::NegativeNumber,
        MetricKey::Accuracy,
        MetricKey::Sensitivity,
        MetricKey::Specificity,
        MetricKey::PositivePredictiveValue,
        MetricKey::NegativePredictiveValue,
        MetricKey::Auc,
        MetricKey::AucCi,
        MetricKey::YoudenIndex,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MetricKey::SampleNumber => "sample_number",
            MetricKey::PositiveNumber => "positive_number",
            MetricKey::NegativeNumber => "negative_number",
            MetricKey::Accuracy => "accuracy",
            MetricKey::Sensitivity => "sensitivity",
            MetricKey::Specificity => "specificity",
            MetricKey::PositivePredictiveValue => "positive predictive value",
            MetricKey::NegativePredictiveValue => "negative predictive value",
            MetricKey::Auc => "auc",
            MetricKey::AucCi => "auc 95% CIs",
            MetricKey::YoudenIndex => "Yorden Index",
        }
    }
}

impl fmt::Display for MetricKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A metric value. Counts stay numeric; ratios render to four decimal
/// digits; intervals render as `[lower-upper]`.
#[derive(Debug, Clone, PartialEq)]
pub enum MetricValue {
    Count(usize),
    Ratio(f64),
    Interval(f64, f64),
}

impl MetricValue {
    pub fn as_count(&self) -> Option<usize> {
        match self {
            MetricValue::Count(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_ratio(&self) -> Option<f64> {
        match self {
            MetricValue::Ratio(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_interval(&self) -> Option<(f64, f64)> {
        match self {
            MetricValue::Interval(lower, upper) => Some((*lower, *upper)),
            _ => None,
        }
    }
}

impl fmt::Display for MetricValue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            MetricValue::Count(n) => write!(f, "{}", n),
            MetricValue::Ratio(v) => write!(f, "{:.4}", v),
            MetricValue::Interval(lower, upper) => write!(f, "[{:.4}-{:.4}]", lower, upper),
        }
    }
}

/// One report per evaluation pool (train / val / test), keyed by `MetricKey`
/// and carrying the pool prefix exactly once.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricReport {
    prefix: String,
    entries: Vec<(MetricKey, MetricValue)>,
}

impl MetricReport {
    pub fn new(prefix: impl Into<String>) -> Self {
        MetricReport {
            prefix: prefix.into(),
            entries: Vec::new(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Insert or replace the value for `key`, keeping insertion order.
    pub fn insert(&mut self, key: MetricKey, value: MetricValue) {
        if let Some(entry) = self.entries.iter_mut().find(|(k, _)| *k == key) {
            entry.1 = value;
        } else {
            self.entries.push((key, value));
        }
    }

    pub fn get(&self, key: MetricKey) -> Option<&MetricValue> {
        self.entries
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &(MetricKey, MetricValue)> {
        self.entries.iter()
    }

    /// Key as written to summary files: `<prefix>_<key>`, or the bare key
    /// when the prefix is empty.
    pub fn prefixed_key(&self, key: MetricKey) -> String {
        if self.prefix.is_empty() {
            key.as_str().to_string()
        } else {
            format!("{}_{}", self.prefix, key.as_str())
        }
    }

    /// Render all entries as `(prefixed key, value)` string rows.
    pub fn rows(&self) -> Vec<(String, String)> {
        self.entries
            .iter()
            .map(|(key, value)| (self.prefixed_key(*key), value.to_string()))
            .collect()
    }
}
