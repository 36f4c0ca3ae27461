//! Profile-driven validation of single files and whole data directories.

use super::{BatchReport, DatasetOutcome, ValidationReport, ValidationRun};
use crate::config::ValidatorConfig;
use crate::prelude::*;
use crate::profiles::DatasetProfile;
use std::path::Path;
use tracing::{info, instrument, warn};

/// Runs dataset profiles against files.
///
/// # Examples
///
/// ```rust,no_run
/// use snap_guard::config::ValidatorConfig;
/// use snap_guard::core::DataValidator;
///
/// # async fn example() -> snap_guard::prelude::Result<()> {
/// let validator = DataValidator::new(ValidatorConfig::default().with_data_dir("Data"))?;
///
/// let (profile, report) = validator
///     .validate_file("Data/County Bi-Annual SNAP 89-21.csv", None)
///     .await?;
/// assert_eq!(profile, "county");
/// println!("{}", report.status());
///
/// let batch = validator.validate_all().await;
/// println!("{} datasets validated", batch.reports().count());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct DataValidator {
    config: ValidatorConfig,
}

impl DataValidator {
    /// Creates a validator after checking the configuration.
    pub fn new(config: ValidatorConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Returns the configuration.
    pub fn config(&self) -> &ValidatorConfig {
        &self.config
    }

    /// Validates a file with an explicit profile.
    #[instrument(skip(self, profile), fields(path = %path.as_ref().display(), profile = %profile.name))]
    pub async fn validate(
        &self,
        path: impl AsRef<Path>,
        profile: &DatasetProfile,
    ) -> ValidationReport {
        let mut run = ValidationRun::load(path, &self.config).await;
        if run.is_loaded() {
            for check in profile.checks(&self.config) {
                run.run_check(check.as_ref()).await;
            }
        }

        let report = run.finish();
        info!(status = %report.status(), findings = report.findings.len(), "Validation finished");
        report
    }

    /// Validates a file, choosing the profile by name or by file name.
    ///
    /// Returns the name of the profile used alongside the report. An unknown
    /// profile name is a configuration error.
    pub async fn validate_file(
        &self,
        path: impl AsRef<Path>,
        profile_name: Option<&str>,
    ) -> Result<(String, ValidationReport)> {
        let path = path.as_ref();
        let profile = match profile_name {
            Some(name) => self.config.profiles.get(name).cloned().ok_or_else(|| {
                GuardError::Configuration(format!("Unknown profile '{name}'"))
            })?,
            None => {
                let file_name = path
                    .file_name()
                    .map(|name| name.to_string_lossy())
                    .unwrap_or_default();
                self.config.profiles.select(&file_name)
            }
        };

        let report = self.validate(path, &profile).await;
        Ok((profile.name, report))
    }

    /// Validates every catalog profile that names a file in the data directory.
    ///
    /// Files that do not exist are recorded as missing rather than failing
    /// the batch.
    #[instrument(skip(self), fields(data_dir = %self.config.data_dir.display()))]
    pub async fn validate_all(&self) -> BatchReport {
        let mut batch = BatchReport::new();

        for profile in self.config.profiles.profiles() {
            let Some(file_name) = &profile.file_name else {
                continue;
            };

            let path = self.config.data_path(file_name);
            if !path.is_file() {
                warn!(file = %file_name, "Dataset file not found; skipping");
                batch.push(DatasetOutcome::Missing {
                    file_name: file_name.clone(),
                });
                continue;
            }

            let report = self.validate(&path, profile).await;
            batch.push(DatasetOutcome::Validated {
                profile: profile.name.clone(),
                report,
            });
        }

        batch
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Severity;
    use crate::profiles::ProfileCatalog;
    use chrono::NaiveDate;
    use std::fs;
    use tempfile::TempDir;

    fn config(dir: &TempDir) -> ValidatorConfig {
        ValidatorConfig::default()
            .with_data_dir(dir.path())
            .with_as_of(NaiveDate::from_ymd_opt(2022, 10, 1).unwrap())
    }

    fn write_monthly(dir: &TempDir) {
        fs::write(
            dir.path().join("Statewide Monthly SNAP FY 89-22.csv"),
            "Date,Household,Persons,Per Household,Per Person,Cost\n\
             2022-07-01,90000,160000,300.5,170.2,27000000\n\
             2022-08-01,91000,161000,301.5,171.2,27500000\n\
             2022-09-01,92000,162000,302.5,172.2,28000000\n",
        )
        .unwrap();
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let config = ValidatorConfig::default().with_profiles(ProfileCatalog::new(vec![
            DatasetProfile::generic(),
            DatasetProfile::generic(),
        ]));
        assert!(DataValidator::new(config).is_err());
    }

    #[tokio::test]
    async fn test_validate_file_selects_profile() {
        let dir = TempDir::new().unwrap();
        write_monthly(&dir);
        let validator = DataValidator::new(config(&dir)).unwrap();

        let (profile, report) = validator
            .validate_file(dir.path().join("Statewide Monthly SNAP FY 89-22.csv"), None)
            .await
            .unwrap();

        assert_eq!(profile, "monthly");
        assert!(!report.has_issues());
        assert!(!report.has_warnings(), "{:?}", report.findings);
        assert!(report
            .findings_by_severity(Severity::Info)
            .any(|f| f.message == "Data is current (latest: 2022-09-01)"));
    }

    #[tokio::test]
    async fn test_unknown_profile_name() {
        let dir = TempDir::new().unwrap();
        let validator = DataValidator::new(config(&dir)).unwrap();
        let result = validator
            .validate_file(dir.path().join("x.csv"), Some("weekly"))
            .await;
        assert!(matches!(result, Err(GuardError::Configuration(_))));
    }

    #[tokio::test]
    async fn test_validate_all_notes_missing_files() {
        let dir = TempDir::new().unwrap();
        write_monthly(&dir);
        let validator = DataValidator::new(config(&dir)).unwrap();

        let batch = validator.validate_all().await;

        assert_eq!(batch.outcomes.len(), 3);
        assert!(matches!(
            &batch.outcomes[0],
            DatasetOutcome::Validated { profile, .. } if profile == "monthly"
        ));
        assert!(matches!(&batch.outcomes[1], DatasetOutcome::Missing { .. }));
        assert!(matches!(&batch.outcomes[2], DatasetOutcome::Missing { .. }));
        assert!(!batch.has_issues());
    }
}
