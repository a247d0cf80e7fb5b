//! Cross-validation driver.
//!
//! `CrossValidationRunner` walks the partitions of one strategy, refitting
//! the injected classifier per fold and pooling train/validation
//! predictions across folds. The classifier's fitted state is mutated in
//! place and reused immediately, so folds are strictly sequential; the
//! exclusive `&mut` borrow for the duration of `run` keeps other callers
//! out. The run leaves the classifier fit on the entire input dataset.
use std::fs;
use std::path::Path;

use crate::config::CvStrategy;
use crate::data_handling::Dataset;
use crate::error::CvError;
use crate::models::classifier_trait::ClassifierModel;
use crate::partition::{build_partitioner, Partitioner};
use crate::report::MetricReport;
use crate::stats::estimate_metrics;

/// One per-case prediction row accumulated during the fold loop.
#[derive(Debug, Clone)]
pub struct FoldRecord {
    pub case_name: String,
    /// 1-based fold number; absent for leave-one-out records.
    pub group: Option<usize>,
    pub pred: f32,
    pub label: u8,
}

/// Reports for the three evaluation pools. `test` is empty when no test
/// dataset was supplied.
#[derive(Debug, Clone, PartialEq)]
pub struct RunReports {
    pub train: MetricReport,
    pub validation: MetricReport,
    pub test: MetricReport,
}

/// Predictions and fold records pooled across all folds for one phase.
struct PooledPhase {
    predictions: Vec<f32>,
    labels: Vec<u8>,
    records: Vec<FoldRecord>,
}

impl PooledPhase {
    fn new() -> Self {
        PooledPhase {
            predictions: Vec::new(),
            labels: Vec::new(),
            records: Vec::new(),
        }
    }

    fn extend(&mut self, data: &Dataset, indices: &[usize], scores: &[f32], group: Option<usize>) {
        for (&idx, &score) in indices.iter().zip(scores) {
            self.records.push(FoldRecord {
                case_name: data.case_names()[idx].clone(),
                group,
                pred: score,
                label: data.labels()[idx],
            });
            self.predictions.push(score);
            self.labels.push(data.labels()[idx]);
        }
    }
}

struct TestEvaluation {
    predictions: Vec<f32>,
    labels: Vec<u8>,
    records: Vec<FoldRecord>,
    report: MetricReport,
}

pub struct CrossValidationRunner {
    partitioner: Box<dyn Partitioner>,
}

impl CrossValidationRunner {
    pub fn new(strategy: CvStrategy) -> Self {
        CrossValidationRunner {
            partitioner: build_partitioner(&strategy),
        }
    }

    pub fn with_partitioner(partitioner: Box<dyn Partitioner>) -> Self {
        CrossValidationRunner { partitioner }
    }

    pub fn partitioner(&self) -> &dyn Partitioner {
        self.partitioner.as_ref()
    }

    /// Run the full cross-validation: fold loop, pooled metric estimation,
    /// final refit on the whole dataset, optional test evaluation, and
    /// optional artifact storage.
    ///
    /// A missing or empty `test_data` skips the test evaluation (the test
    /// report comes back empty); any classifier or storage failure aborts
    /// the run.
    pub fn run(
        &self,
        model: &mut dyn ClassifierModel,
        data: &Dataset,
        test_data: Option<&Dataset>,
        store_dir: Option<&Path>,
    ) -> Result<RunReports, CvError> {
        data.log_summary();
        let partitions = self.partitioner.split(data.labels())?;

        let mut train = PooledPhase::new();
        let mut val = PooledPhase::new();

        for (fold, partition) in partitions.iter().enumerate() {
            let group = self.partitioner.records_group().then_some(fold + 1);
            log::trace!(
                "fold {}/{}: {} train cases, {} validation cases",
                fold + 1,
                partitions.len(),
                partition.train.len(),
                partition.validation.len()
            );

            let train_set = data.select(&partition.train);
            let val_set = data.select(&partition.validation);

            model.fit(train_set.features(), train_set.labels())?;
            let train_scores = model.predict(train_set.features())?;
            let val_scores = model.predict(val_set.features())?;

            train.extend(data, &partition.train, &train_scores, group);
            val.extend(data, &partition.validation, &val_scores, group);
        }

        let train_report = estimate_metrics(&train.predictions, &train.labels, "train")?;
        let val_report = estimate_metrics(&val.predictions, &val.labels, "val")?;

        // Final refit: the classifier leaves this call fit on the entire
        // input dataset, not on the last fold.
        model.fit(data.features(), data.labels())?;

        let test_eval = match test_data {
            Some(test) if !test.is_empty() => {
                let predictions = model.predict(test.features())?;
                let report = estimate_metrics(&predictions, test.labels(), "test")?;
                let records = test
                    .case_names()
                    .iter()
                    .zip(&predictions)
                    .zip(test.labels())
                    .map(|((case_name, &pred), &label)| FoldRecord {
                        case_name: case_name.clone(),
                        group: None,
                        pred,
                        label,
                    })
                    .collect();
                Some(TestEvaluation {
                    predictions,
                    labels: test.labels().to_vec(),
                    records,
                    report,
                })
            }
            _ => None,
        };

        if let Some(dir) = store_dir {
            self.store_artifacts(
                dir,
                model,
                &train,
                &val,
                test_eval.as_ref(),
                &train_report,
                &val_report,
            )?;
        }

        log::info!(
            "cross-validation run ({}) completed at {}",
            self.partitioner.name(),
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
        );

        let test_report = match test_eval {
            Some(eval) => eval.report,
            None => MetricReport::new("test"),
        };

        Ok(RunReports {
            train: train_report,
            validation: val_report,
            test: test_report,
        })
    }

    fn store_artifacts(
        &self,
        dir: &Path,
        model: &dyn ClassifierModel,
        train: &PooledPhase,
        val: &PooledPhase,
        test: Option<&TestEvaluation>,
        train_report: &MetricReport,
        val_report: &MetricReport,
    ) -> Result<(), CvError> {
        fs::create_dir_all(dir)?;

        write_binary(&dir.join("train_predict.bin"), &train.predictions)?;
        write_binary(&dir.join("val_predict.bin"), &val.predictions)?;
        write_binary(&dir.join("train_label.bin"), &train.labels)?;
        write_binary(&dir.join("val_label.bin"), &val.labels)?;

        let tag = self.partitioner.fold_tag();
        let with_group = self.partitioner.records_group();
        write_fold_records(
            &dir.join(format!("train_cv{}_info.csv", tag)),
            &train.records,
            with_group,
        )?;
        write_fold_records(
            &dir.join(format!("val_cv{}_info.csv", tag)),
            &val.records,
            with_group,
        )?;

        let mut rows: Vec<(String, String)> = Vec::new();
        rows.extend(train_report.rows());
        rows.extend(val_report.rows());

        if let Some(eval) = test {
            write_binary(&dir.join("test_predict.bin"), &eval.predictions)?;
            write_binary(&dir.join("test_label.bin"), &eval.labels)?;
            write_fold_records(&dir.join("test_info.csv"), &eval.records, false)?;
            rows.extend(eval.report.rows());
        }

        model.save(dir)?;

        rows.sort();
        let mut writer = csv::Writer::from_path(dir.join("result.csv"))?;
        for (key, value) in &rows {
            writer.write_record([key.as_str(), value.as_str()])?;
        }
        writer.flush()?;

        Ok(())
    }
}

fn write_binary<T: serde::Serialize>(path: &Path, data: &T) -> Result<(), CvError> {
    let bytes = bincode::serialize(data).map_err(|err| CvError::Storage(err.to_string()))?;
    fs::write(path, bytes)?;
    Ok(())
}

fn write_fold_records(
    path: &Path,
    records: &[FoldRecord],
    with_group: bool,
) -> Result<(), CvError> {
    let mut writer = csv::Writer::from_path(path)?;
    if with_group {
        writer.write_record(["CaseName", "Group", "Pred", "Label"])?;
    } else {
        writer.write_record(["CaseName", "Pred", "Label"])?;
    }
    for record in records {
        let pred = record.pred.to_string();
        let label = record.label.to_string();
        if with_group {
            let group = record.group.unwrap_or(0).to_string();
            writer.write_record([
                record.case_name.as_str(),
                group.as_str(),
                pred.as_str(),
                label.as_str(),
            ])?;
        } else {
            writer.write_record([record.case_name.as_str(), pred.as_str(), label.as_str()])?;
        }
    }
    writer.flush()?;
    Ok(())
}
