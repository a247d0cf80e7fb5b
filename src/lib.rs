//! crossval-eval: cross-validated evaluation of binary classifiers.
//!
//! This crate runs leave-one-out or stratified k-fold cross-validation over
//! a fixed feature matrix, pools per-fold predictions, and estimates
//! bootstrap-based performance metrics (AUC with confidence interval,
//! sensitivity, specificity, predictive values, accuracy) at the operating
//! point chosen by the Youden index. Classifiers are injected behind a small
//! fit/predict trait; a GBDT-backed default implementation is included.
//!
//! The design favors small, testable modules: partitioning strategies and
//! the metric estimator are usable on their own, and the runner only wires
//! them together and handles optional artifact storage.
pub mod config;
pub mod cross_validation;
pub mod data_handling;
pub mod error;
pub mod io;
pub mod models;
pub mod partition;
pub mod report;
pub mod stats;
