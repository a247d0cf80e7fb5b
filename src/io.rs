//! CSV dataset reader.
//!
//! Loads a case table with a case-name column, a binary label column, and
//! feature columns into a `Dataset`. The runner itself never reads files;
//! this is a convenience for callers that keep cohorts as CSV.
use std::collections::HashSet;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use csv::StringRecord;
use ndarray::Array2;

use crate::data_handling::Dataset;

/// Configuration for reading a case/label/feature CSV table.
#[derive(Debug, Clone)]
pub struct DatasetReaderConfig {
    /// Column name holding case identifiers.
    pub case_column: String,
    /// Column name holding binary labels (0 / 1).
    pub label_column: String,
    /// Optional list of feature columns to load (in order).
    /// When `None`, all remaining columns are treated as features.
    pub feature_columns: Option<Vec<String>>,
    /// Columns to ignore when auto-selecting features.
    pub ignore_columns: Vec<String>,
}

impl Default for DatasetReaderConfig {
    fn default() -> Self {
        Self {
            case_column: "CaseName".to_string(),
            label_column: "label".to_string(),
            feature_columns: None,
            ignore_columns: Vec::new(),
        }
    }
}

/// Read a dataset CSV with the default column layout.
pub fn read_dataset_csv<P: AsRef<Path>>(path: P) -> Result<Dataset> {
    read_dataset_csv_with_config(path, &DatasetReaderConfig::default())
}

/// Read a dataset CSV using a custom configuration.
pub fn read_dataset_csv_with_config<P: AsRef<Path>>(
    path: P,
    config: &DatasetReaderConfig,
) -> Result<Dataset> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(&path)
        .with_context(|| format!("Failed to open dataset file: {}", path.as_ref().display()))?;

    let headers = reader
        .headers()
        .context("Failed to read dataset header row")?
        .clone();

    let case_idx = find_column(&headers, &config.case_column)
        .ok_or_else(|| anyhow!("Missing case column '{}'", config.case_column))?;
    let label_idx = find_column(&headers, &config.label_column)
        .ok_or_else(|| anyhow!("Missing label column '{}'", config.label_column))?;

    let feature_indices = resolve_feature_indices(&headers, config, case_idx, label_idx)?;
    if feature_indices.is_empty() {
        return Err(anyhow!("No feature columns detected in dataset header"));
    }

    let mut features = Vec::new();
    let mut labels = Vec::new();
    let mut case_names = Vec::new();

    for (row_idx, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("Failed to read row {}", row_idx + 1))?;

        let case_name = record
            .get(case_idx)
            .ok_or_else(|| anyhow!("Missing case name at row {}", row_idx + 1))?;
        case_names.push(case_name.to_string());

        let label = record
            .get(label_idx)
            .ok_or_else(|| anyhow!("Missing label value at row {}", row_idx + 1))?
            .trim()
            .parse::<u8>()
            .with_context(|| format!("Invalid label at row {}", row_idx + 1))?;
        labels.push(label);

        for &idx in &feature_indices {
            let value = record
                .get(idx)
                .ok_or_else(|| anyhow!("Missing feature value at row {}", row_idx + 1))?;
            let parsed = value.trim().parse::<f32>().with_context(|| {
                format!(
                    "Invalid feature '{}' at row {}",
                    headers.get(idx).unwrap_or(""),
                    row_idx + 1
                )
            })?;
            features.push(parsed);
        }
    }

    let n_cases = labels.len();
    let n_features = feature_indices.len();
    let x = Array2::from_shape_vec((n_cases, n_features), features)
        .context("Failed to build feature matrix")?;

    Ok(Dataset::new(x, labels, case_names)?)
}

fn find_column(headers: &StringRecord, name: &str) -> Option<usize> {
    headers
        .iter()
        .position(|header| header.eq_ignore_ascii_case(name))
}

fn resolve_feature_indices(
    headers: &StringRecord,
    config: &DatasetReaderConfig,
    case_idx: usize,
    label_idx: usize,
) -> Result<Vec<usize>> {
    if let Some(names) = &config.feature_columns {
        let mut indices = Vec::with_capacity(names.len());
        for name in names {
            let idx = find_column(headers, name)
                .ok_or_else(|| anyhow!("Missing feature column '{}'", name))?;
            indices.push(idx);
        }
        return Ok(indices);
    }

    let ignore: HashSet<String> = config
        .ignore_columns
        .iter()
        .map(|name| name.to_ascii_lowercase())
        .collect();

    Ok(headers
        .iter()
        .enumerate()
        .filter(|(idx, header)| {
            *idx != case_idx && *idx != label_idx && !ignore.contains(&header.to_ascii_lowercase())
        })
        .map(|(idx, _)| idx)
        .collect())
}
