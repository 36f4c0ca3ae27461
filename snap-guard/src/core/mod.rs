//! Core validation types.
//!
//! ## Overview
//!
//! - **[`Dataset`]**: one loaded table, queried through its own DataFusion session
//! - **[`Check`]**: a validation routine producing [`Finding`]s
//! - **[`ValidationRun`]**: one load-then-check pass over a single file
//! - **[`DataValidator`]**: runs dataset profiles against files and batches
//! - **[`ValidationReport`]**: the ordered findings of a run and its [`ReportStatus`]
//!
//! ## Pipeline
//!
//! ```text
//! Load ──► Schema ─► Dates ─► Numeric ─► Coordinates ─► Integrity ─► Currency ──► Render
//!  │                (each check skips itself when its columns are absent)
//!  └─ failure: a single Issue, remaining checks are no-ops
//! ```
//!
//! ## Example
//!
//! ```rust,no_run
//! use snap_guard::core::ValidationRun;
//! use snap_guard::config::ValidatorConfig;
//!
//! # async fn example() {
//! let config = ValidatorConfig::default();
//! let mut run = ValidationRun::load("Data/Statewide Monthly SNAP FY 89-22.csv", &config).await;
//! run.validate_columns(Some(&["Date".to_string(), "Cost".to_string()])).await;
//! run.validate_dates("Date").await;
//! run.validate_numeric_columns(None).await;
//! run.check_data_currency("Date").await;
//!
//! let report = run.finish();
//! println!("{}", report.status());
//! # }
//! ```

mod check;
mod dataset;
mod report;
mod run;
mod severity;
mod validator;

pub use check::{BoxedCheck, Check};
pub use dataset::{Dataset, TABLE_NAME};
pub(crate) use dataset::{column_as_f64, column_as_strings, scalar_count, scalar_f64};
pub use report::{BatchReport, DatasetOutcome, Finding, ReportStatus, ValidationReport};
pub use run::ValidationRun;
pub use severity::Severity;
pub use validator::DataValidator;
