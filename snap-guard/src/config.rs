//! Validator configuration.
//!
//! Everything a run depends on is carried by [`ValidatorConfig`] and handed
//! to [`DataValidator::new`](crate::core::DataValidator::new); there is no
//! process-wide data directory.

use crate::prelude::*;
use crate::profiles::ProfileCatalog;
use crate::sources::CsvOptions;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default directory holding the published datasets.
pub const DEFAULT_DATA_DIR: &str = "Data";

/// Numeric limits used by the checks.
///
/// The defaults assume roughly monthly data. Datasets with another cadence
/// should override `max_gap_days`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    /// Gaps between consecutive dates above this many days are reported
    pub max_gap_days: i64,
    /// Zero values above this fraction of rows are reported
    pub zero_ratio: f64,
    /// Data older than this many days is stale
    pub stale_days: i64,
    /// Data older than this many days is reported in years
    pub outdated_days: i64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            max_gap_days: 60,
            zero_ratio: 0.10,
            stale_days: 90,
            outdated_days: 365,
        }
    }
}

impl Thresholds {
    /// Checks that the thresholds are internally consistent.
    pub fn validate(&self) -> Result<()> {
        if self.max_gap_days < 0 {
            return Err(GuardError::Configuration(
                "max_gap_days must not be negative".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.zero_ratio) {
            return Err(GuardError::Configuration(format!(
                "zero_ratio must be between 0.0 and 1.0, got {}",
                self.zero_ratio
            )));
        }
        if self.stale_days < 0 || self.outdated_days < self.stale_days {
            return Err(GuardError::Configuration(format!(
                "expected 0 <= stale_days <= outdated_days, got {} and {}",
                self.stale_days, self.outdated_days
            )));
        }
        Ok(())
    }
}

/// Configuration for a [`DataValidator`](crate::core::DataValidator).
///
/// # Examples
///
/// ```rust
/// use snap_guard::config::{Thresholds, ValidatorConfig};
/// use chrono::NaiveDate;
///
/// let config = ValidatorConfig::default()
///     .with_data_dir("/srv/snap/Data")
///     .with_as_of(NaiveDate::from_ymd_opt(2024, 6, 30).unwrap())
///     .with_thresholds(Thresholds { max_gap_days: 200, ..Thresholds::default() });
///
/// assert_eq!(config.thresholds.max_gap_days, 200);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct ValidatorConfig {
    /// Directory searched by batch validation
    pub data_dir: PathBuf,
    /// How delimited files are parsed
    pub csv: CsvOptions,
    /// Check limits
    pub thresholds: Thresholds,
    /// Reference date for currency checks; today when unset
    pub as_of: Option<NaiveDate>,
    /// Known dataset profiles
    pub profiles: ProfileCatalog,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            csv: CsvOptions::default(),
            thresholds: Thresholds::default(),
            as_of: None,
            profiles: ProfileCatalog::builtin(),
        }
    }
}

impl ValidatorConfig {
    /// Sets the data directory.
    pub fn with_data_dir(mut self, data_dir: impl Into<PathBuf>) -> Self {
        self.data_dir = data_dir.into();
        self
    }

    /// Sets the CSV parsing options.
    pub fn with_csv_options(mut self, csv: CsvOptions) -> Self {
        self.csv = csv;
        self
    }

    /// Sets the check thresholds.
    pub fn with_thresholds(mut self, thresholds: Thresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    /// Pins the reference date used by currency checks.
    pub fn with_as_of(mut self, as_of: NaiveDate) -> Self {
        self.as_of = Some(as_of);
        self
    }

    /// Replaces the profile catalog.
    pub fn with_profiles(mut self, profiles: ProfileCatalog) -> Self {
        self.profiles = profiles;
        self
    }

    /// Returns the reference date for currency checks.
    pub fn reference_date(&self) -> NaiveDate {
        self.as_of
            .unwrap_or_else(|| chrono::Local::now().date_naive())
    }

    /// Resolves a file name against the data directory.
    pub fn data_path(&self, file_name: impl AsRef<Path>) -> PathBuf {
        self.data_dir.join(file_name)
    }

    /// Checks the whole configuration.
    pub fn validate(&self) -> Result<()> {
        self.thresholds.validate()?;
        self.profiles.validate()
    }
}

/// On-disk form of a configuration file.
///
/// Every section is optional; omitted sections keep their defaults.
///
/// ```json
/// {
///   "data_dir": "Data",
///   "thresholds": { "max_gap_days": 200 },
///   "profiles": [ { "name": "monthly", "pattern": "*Monthly*" } ]
/// }
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigFile {
    /// Overrides the data directory
    pub data_dir: Option<PathBuf>,
    /// Overrides CSV parsing
    pub csv: Option<CsvOptions>,
    /// Overrides thresholds
    pub thresholds: Option<Thresholds>,
    /// Replaces the built-in profiles
    pub profiles: Option<Vec<crate::profiles::DatasetProfile>>,
}

impl ConfigFile {
    /// Reads a JSON configuration file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_json(&text)
    }

    /// Parses a JSON configuration document.
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Applies the file on top of an existing configuration.
    pub fn apply(self, mut config: ValidatorConfig) -> Result<ValidatorConfig> {
        if let Some(data_dir) = self.data_dir {
            config.data_dir = data_dir;
        }
        if let Some(csv) = self.csv {
            config.csv = csv;
        }
        if let Some(thresholds) = self.thresholds {
            config.thresholds = thresholds;
        }
        if let Some(profiles) = self.profiles {
            config.profiles = ProfileCatalog::new(profiles);
        }
        config.validate()?;
        Ok(config)
    }
}
