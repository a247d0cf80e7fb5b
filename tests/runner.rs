//! End-to-end tests for the cross-validation runner and artifact storage.

use std::fs;
use std::path::Path;

use ndarray::Array2;

use crossval_eval::config::CvStrategy;
use crossval_eval::cross_validation::CrossValidationRunner;
use crossval_eval::data_handling::Dataset;
use crossval_eval::error::CvError;
use crossval_eval::models::classifier_trait::ClassifierModel;
use crossval_eval::report::{MetricKey, MetricValue};

fn init_logs() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Probe classifier: scores each case by its first feature and records
/// every fit so tests can observe the runner's refit sequence.
#[derive(Default)]
struct ProbeModel {
    fit_sizes: Vec<usize>,
    fail_fit: bool,
}

impl ClassifierModel for ProbeModel {
    fn fit(&mut self, x: &Array2<f32>, y: &[u8]) -> Result<(), CvError> {
        if self.fail_fit {
            return Err(CvError::ClassifierFailure("probe model refused".to_string()));
        }
        assert_eq!(x.nrows(), y.len());
        self.fit_sizes.push(x.nrows());
        Ok(())
    }

    fn predict(&self, x: &Array2<f32>) -> Result<Vec<f32>, CvError> {
        Ok(x.column(0).iter().map(|v| v.clamp(0.0, 1.0)).collect())
    }

    fn save(&self, store_dir: &Path) -> Result<(), CvError> {
        fs::write(store_dir.join("probe_model.txt"), "probe")?;
        Ok(())
    }

    fn name(&self) -> &str {
        "probe"
    }
}

/// Balanced 20-case dataset with 4 features; the first feature carries the
/// class (0.9 for positives, 0.1 for negatives).
fn cohort() -> Dataset {
    build_dataset(20, "case")
}

fn build_dataset(n: usize, name_prefix: &str) -> Dataset {
    let mut values = Vec::with_capacity(n * 4);
    let mut labels = Vec::with_capacity(n);
    let mut names = Vec::with_capacity(n);
    for i in 0..n {
        let label = (i % 2) as u8;
        let lead = if label == 1 { 0.9 } else { 0.1 };
        values.extend_from_slice(&[lead, i as f32, (i * i) as f32, 1.0]);
        labels.push(label);
        names.push(format!("{}_{}", name_prefix, i));
    }
    let x = Array2::from_shape_vec((n, 4), values).unwrap();
    Dataset::new(x, labels, names).unwrap()
}

// ---------------------------------------------------------------------------
// Reports
// ---------------------------------------------------------------------------

#[test]
fn five_fold_run_reports_all_pools() {
    init_logs();
    let data = cohort();
    let runner = CrossValidationRunner::new(CvStrategy::StratifiedKFold { folds: 5 });
    let mut model = ProbeModel::default();

    let reports = runner.run(&mut model, &data, None, None).unwrap();

    for key in MetricKey::ALL {
        assert!(reports.train.get(key).is_some(), "train missing {}", key);
        assert!(reports.validation.get(key).is_some(), "val missing {}", key);
    }
    // Every case validates exactly once; with 5 folds each case trains in
    // the other 4.
    assert_eq!(
        reports.validation.get(MetricKey::SampleNumber),
        Some(&MetricValue::Count(20))
    );
    assert_eq!(
        reports.train.get(MetricKey::SampleNumber),
        Some(&MetricValue::Count(80))
    );
    assert_eq!(
        reports.validation.get(MetricKey::PositiveNumber),
        Some(&MetricValue::Count(10))
    );
    assert!(reports.test.is_empty());

    // 5 fold fits plus the final refit on all 20 cases.
    assert_eq!(model.fit_sizes.len(), 6);
    assert_eq!(model.fit_sizes[..5], [16, 16, 16, 16, 16]);
    assert_eq!(*model.fit_sizes.last().unwrap(), 20);
}

#[test]
fn test_dataset_yields_a_third_report() {
    let data = cohort();
    let test = build_dataset(5, "ext");
    let runner = CrossValidationRunner::new(CvStrategy::StratifiedKFold { folds: 5 });
    let mut model = ProbeModel::default();

    let reports = runner.run(&mut model, &data, Some(&test), None).unwrap();

    assert!(!reports.test.is_empty());
    assert_eq!(
        reports.test.get(MetricKey::SampleNumber),
        Some(&MetricValue::Count(5))
    );
    assert_eq!(reports.test.prefixed_key(MetricKey::SampleNumber), "test_sample_number");
}

#[test]
fn empty_test_dataset_is_skipped() {
    let data = cohort();
    let empty = Dataset::new(Array2::zeros((0, 4)), Vec::new(), Vec::new()).unwrap();
    let runner = CrossValidationRunner::new(CvStrategy::StratifiedKFold { folds: 5 });
    let mut model = ProbeModel::default();

    let reports = runner.run(&mut model, &data, Some(&empty), None).unwrap();
    assert!(reports.test.is_empty());
}

#[test]
fn loo_run_pools_every_case_once() {
    let data = build_dataset(8, "case");
    let runner = CrossValidationRunner::new(CvStrategy::LeaveOneOut);
    let mut model = ProbeModel::default();

    let reports = runner.run(&mut model, &data, None, None).unwrap();
    assert_eq!(
        reports.validation.get(MetricKey::SampleNumber),
        Some(&MetricValue::Count(8))
    );
    // 8 folds of 7 training cases each, then the full refit.
    assert_eq!(model.fit_sizes.len(), 9);
    assert_eq!(*model.fit_sizes.last().unwrap(), 8);
}

#[test]
fn classifier_failures_propagate_unchanged() {
    let data = cohort();
    let runner = CrossValidationRunner::new(CvStrategy::StratifiedKFold { folds: 5 });
    let mut model = ProbeModel {
        fail_fit: true,
        ..Default::default()
    };

    let result = runner.run(&mut model, &data, None, None);
    match result {
        Err(CvError::ClassifierFailure(msg)) => assert!(msg.contains("probe model refused")),
        other => panic!("expected ClassifierFailure, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn insufficient_data_surfaces_from_run() {
    let data = build_dataset(4, "case");
    let runner = CrossValidationRunner::new(CvStrategy::StratifiedKFold { folds: 5 });
    let mut model = ProbeModel::default();

    assert!(matches!(
        runner.run(&mut model, &data, None, None),
        Err(CvError::InsufficientData { .. })
    ));
}

// ---------------------------------------------------------------------------
// Storage side effects
// ---------------------------------------------------------------------------

#[test]
fn storage_writes_the_full_artifact_set() {
    init_logs();
    let dir = tempfile::tempdir().unwrap();
    let store = dir.path().join("results");

    let data = cohort();
    let test = build_dataset(6, "ext");
    let runner = CrossValidationRunner::new(CvStrategy::StratifiedKFold { folds: 5 });
    let mut model = ProbeModel::default();

    let reports = runner
        .run(&mut model, &data, Some(&test), Some(&store))
        .unwrap();

    for name in [
        "train_predict.bin",
        "val_predict.bin",
        "train_label.bin",
        "val_label.bin",
        "test_predict.bin",
        "test_label.bin",
        "train_cv5_info.csv",
        "val_cv5_info.csv",
        "test_info.csv",
        "probe_model.txt",
        "result.csv",
    ] {
        assert!(store.join(name).exists(), "missing artifact {}", name);
    }

    // Pooled binary arrays decode back to the validation pool.
    let bytes = fs::read(store.join("val_predict.bin")).unwrap();
    let val_predictions: Vec<f32> = bincode::deserialize(&bytes).unwrap();
    assert_eq!(val_predictions.len(), 20);

    let bytes = fs::read(store.join("val_label.bin")).unwrap();
    let val_labels: Vec<u8> = bincode::deserialize(&bytes).unwrap();
    assert_eq!(val_labels.iter().filter(|&&l| l == 1).count(), 10);

    // Fold records: header plus one row per case per phase.
    let val_info = fs::read_to_string(store.join("val_cv5_info.csv")).unwrap();
    let mut lines = val_info.lines();
    assert_eq!(lines.next(), Some("CaseName,Group,Pred,Label"));
    assert_eq!(lines.count(), 20);

    let train_info = fs::read_to_string(store.join("train_cv5_info.csv")).unwrap();
    assert_eq!(train_info.lines().count(), 81);

    let test_info = fs::read_to_string(store.join("test_info.csv")).unwrap();
    assert_eq!(test_info.lines().next(), Some("CaseName,Pred,Label"));
    assert_eq!(test_info.lines().count(), 7);

    // Summary rows are sorted by key and cover all three reports.
    let summary = fs::read_to_string(store.join("result.csv")).unwrap();
    let keys: Vec<&str> = summary
        .lines()
        .map(|line| line.split(',').next().unwrap())
        .collect();
    let mut sorted = keys.clone();
    sorted.sort();
    assert_eq!(keys, sorted);
    assert_eq!(
        keys.len(),
        reports.train.len() + reports.validation.len() + reports.test.len()
    );
    assert!(keys.contains(&"val_sample_number"));
    assert!(keys.contains(&"test_sample_number"));
}

#[test]
fn loo_storage_uses_the_loo_tag_without_groups() {
    let dir = tempfile::tempdir().unwrap();
    let store = dir.path().join("loo");

    let data = build_dataset(8, "case");
    let runner = CrossValidationRunner::new(CvStrategy::LeaveOneOut);
    let mut model = ProbeModel::default();

    runner.run(&mut model, &data, None, Some(&store)).unwrap();

    assert!(store.join("train_cvloo_info.csv").exists());
    let val_info = fs::read_to_string(store.join("val_cvloo_info.csv")).unwrap();
    assert_eq!(val_info.lines().next(), Some("CaseName,Pred,Label"));
    assert!(!store.join("test_predict.bin").exists());
}
