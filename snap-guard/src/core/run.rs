//! A single load-then-check pass over one file.

use super::{Check, Dataset, Finding, ValidationReport};
use crate::checks::{
    group_thousands, CoordinateCheck, CurrencyCheck, DateCheck, IntegrityCheck, IntegrityRule,
    NumericCheck, SchemaCheck,
};
use crate::config::{Thresholds, ValidatorConfig};
use chrono::NaiveDate;
use std::path::Path;
use tracing::{info, instrument, warn};

/// Accumulates the findings of one validation run.
///
/// Loading never fails outright: a load error becomes an `Issue` and every
/// later check is a no-op. Check errors become `Warning`s so the remaining
/// checks still run.
#[derive(Debug)]
pub struct ValidationRun {
    dataset: Option<Dataset>,
    report: ValidationReport,
    thresholds: Thresholds,
    as_of: NaiveDate,
}

impl ValidationRun {
    /// Loads a file and records the outcome as the first finding.
    #[instrument(skip(config), fields(path = %path.as_ref().display()))]
    pub async fn load(path: impl AsRef<Path>, config: &ValidatorConfig) -> Self {
        let path = path.as_ref();
        let display_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let mut report = ValidationReport::new(display_name);

        let dataset = match Dataset::load(path, &config.csv).await {
            Ok(dataset) => {
                info!(rows = dataset.row_count(), "Loaded dataset");
                report.push(Finding::info(
                    "load",
                    format!(
                        "Loaded {} records from {}",
                        group_thousands(dataset.row_count() as f64),
                        dataset.name()
                    ),
                ));
                Some(dataset)
            }
            Err(e) => {
                warn!(error = %e, "Failed to load dataset");
                report.push(Finding::issue("load", format!("Failed to load file: {e}")));
                None
            }
        };

        Self {
            dataset,
            report,
            thresholds: config.thresholds.clone(),
            as_of: config.reference_date(),
        }
    }

    /// Starts a run over an already loaded dataset.
    pub fn from_dataset(dataset: Dataset, config: &ValidatorConfig) -> Self {
        let mut report = ValidationReport::new(dataset.name());
        report.push(Finding::info(
            "load",
            format!(
                "Loaded {} records from {}",
                group_thousands(dataset.row_count() as f64),
                dataset.name()
            ),
        ));
        Self {
            dataset: Some(dataset),
            report,
            thresholds: config.thresholds.clone(),
            as_of: config.reference_date(),
        }
    }

    /// Returns true if the dataset loaded.
    pub fn is_loaded(&self) -> bool {
        self.dataset.is_some()
    }

    /// Returns the loaded dataset.
    pub fn dataset(&self) -> Option<&Dataset> {
        self.dataset.as_ref()
    }

    /// Returns the findings so far.
    pub fn report(&self) -> &ValidationReport {
        &self.report
    }

    /// Runs one check and appends its findings.
    pub async fn run_check(&mut self, check: &dyn Check) {
        let Some(dataset) = &self.dataset else {
            return;
        };

        match check.evaluate(dataset).await {
            Ok(findings) => self.report.extend(findings),
            Err(e) => {
                warn!(check = check.name(), error = %e, "Check failed");
                self.report.push(Finding::warning(
                    check.name(),
                    format!("{} check failed: {e}", check.name()),
                ));
            }
        }
    }

    /// Checks expected columns and scans for empty ones.
    pub async fn validate_columns(&mut self, expected: Option<&[String]>) {
        let check = match expected {
            Some(columns) => SchemaCheck::expecting(columns.iter().cloned()),
            None => SchemaCheck::new(),
        };
        self.run_check(&check).await;
    }

    /// Validates a date column.
    pub async fn validate_dates(&mut self, column: &str) {
        let check = DateCheck::new(column, self.thresholds.max_gap_days);
        self.run_check(&check).await;
    }

    /// Profiles the listed numeric columns, or every numeric column.
    pub async fn validate_numeric_columns(&mut self, columns: Option<&[String]>) {
        let check = match columns {
            Some(columns) => {
                NumericCheck::columns(columns.iter().cloned(), self.thresholds.zero_ratio)
            }
            None => NumericCheck::auto(self.thresholds.zero_ratio),
        };
        self.run_check(&check).await;
    }

    /// Checks coordinates against a region's bounds.
    pub async fn validate_coordinates(&mut self, check: &CoordinateCheck) {
        self.run_check(check).await;
    }

    /// Evaluates total-equals-sum-of-parts rules.
    pub async fn validate_referential_integrity(&mut self, rules: &[IntegrityRule]) {
        let check = IntegrityCheck::new(rules.to_vec());
        self.run_check(&check).await;
    }

    /// Reports how current the newest date is.
    pub async fn check_data_currency(&mut self, column: &str) {
        let check = CurrencyCheck::new(column, self.as_of)
            .with_limits(self.thresholds.stale_days, self.thresholds.outdated_days);
        self.run_check(&check).await;
    }

    /// Ends the run and returns its report.
    pub fn finish(self) -> ValidationReport {
        self.report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{ReportStatus, Severity};
    use crate::prelude::*;
    use async_trait::async_trait;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[derive(Debug)]
    struct FailingCheck;

    #[async_trait]
    impl Check for FailingCheck {
        async fn evaluate(&self, _dataset: &Dataset) -> Result<Vec<Finding>> {
            Err(GuardError::Internal("boom".to_string()))
        }

        fn name(&self) -> &str {
            "failing"
        }
    }

    fn csv(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::with_suffix(".csv").unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[tokio::test]
    async fn test_load_records_info() {
        let file = csv("Date,Household\n2020-01-01,10\n2020-02-01,12\n");
        let run = ValidationRun::load(file.path(), &ValidatorConfig::default()).await;

        assert!(run.is_loaded());
        let findings = &run.report().findings;
        assert_eq!(findings.len(), 1);
        assert!(findings[0].message.starts_with("Loaded 2 records from "));
    }

    #[tokio::test]
    async fn test_failed_load_short_circuits() {
        let mut run =
            ValidationRun::load("/no/such/file.csv", &ValidatorConfig::default()).await;
        run.validate_columns(Some(&["Date".to_string()])).await;
        run.validate_dates("Date").await;
        run.validate_numeric_columns(None).await;

        let report = run.finish();
        assert_eq!(report.findings.len(), 1);
        assert_eq!(report.findings[0].severity, Severity::Issue);
        assert!(report.findings[0].message.starts_with("Failed to load file: "));
        assert_eq!(
            report.status(),
            ReportStatus::IssuesFound {
                issues: 1,
                warnings: 0
            }
        );
    }

    #[tokio::test]
    async fn test_check_error_becomes_warning() {
        let file = csv("Date,Household\n2020-01-01,10\n");
        let mut run = ValidationRun::load(file.path(), &ValidatorConfig::default()).await;
        run.run_check(&FailingCheck).await;
        run.validate_dates("Date").await;

        let report = run.finish();
        assert_eq!(report.findings[1].severity, Severity::Warning);
        assert_eq!(
            report.findings[1].message,
            "failing check failed: Internal error: boom"
        );
        assert!(report
            .findings
            .iter()
            .any(|f| f.message == "All dates valid"));
    }
}
