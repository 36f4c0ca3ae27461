//! # snap-guard - Data quality validation for SNAP participation datasets
//!
//! snap-guard loads the published Hawaii SNAP CSV files (statewide monthly
//! series, county bi-annual table, retailer listing), runs a fixed battery of
//! quality checks against them, and renders a report classifying every
//! finding as an `Issue`, a `Warning` or `Info`. Checks run as SQL over a
//! DataFusion table, so files of any size are read once into Arrow batches.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use snap_guard::prelude::*;
//! use snap_guard::formatters::HumanFormatter;
//!
//! # async fn example() -> snap_guard::prelude::Result<()> {
//! let validator = DataValidator::new(ValidatorConfig::default().with_data_dir("Data"))?;
//!
//! let (profile, report) = validator
//!     .validate_file("Data/Statewide Monthly SNAP FY 89-22.csv", None)
//!     .await?;
//!
//! println!("validated with the {profile} profile");
//! print!("{}", HumanFormatter::new().format(&report)?);
//! # Ok(())
//! # }
//! ```
//!
//! ## Checks
//!
//! | Check | Module |
//! |-------|--------|
//! | expected and empty columns | [`checks::SchemaCheck`] |
//! | date parsing, range, gaps, duplicates | [`checks::DateCheck`] |
//! | negatives, zeros, missing values, summary statistics | [`checks::NumericCheck`] |
//! | coordinates inside Hawaii | [`checks::CoordinateCheck`] |
//! | totals equal the sum of their parts | [`checks::IntegrityCheck`] |
//! | age of the newest record | [`checks::CurrencyCheck`] |
//! | top values of a category | [`checks::DistributionCheck`] |
//! | distinct values against an expected count | [`checks::CoverageCheck`] |
//!
//! Which checks run for which file is declared by a
//! [`DatasetProfile`](profiles::DatasetProfile). The built-in catalog knows
//! the three published files and falls back to a generic profile.
//!
//! ## Architecture
//!
//! - **`sources`**: registers CSV files with a DataFusion session
//! - **`core`**: datasets, the `Check` trait, runs, reports, the validator
//! - **`checks`**: the check implementations
//! - **`profiles`**: dataset profiles and the profile catalog
//! - **`config`**: validator configuration and configuration files
//! - **`formatters`**: human, JSON and Markdown rendering
//! - **`logging`**: `tracing` subscriber setup
//! - **`security`**: SQL identifier escaping

pub mod checks;
pub mod config;
pub mod core;
pub mod error;
pub mod formatters;
pub mod logging;
pub mod prelude;
pub mod profiles;
pub mod security;
pub mod sources;
