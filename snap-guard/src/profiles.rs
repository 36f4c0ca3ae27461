//! Dataset profiles: named bundles of checks for known files.
//!
//! A [`DatasetProfile`] declares what to check; [`DatasetProfile::checks`]
//! turns it into concrete [`Check`](crate::core::Check)s using the
//! thresholds of a [`ValidatorConfig`]. Profiles are plain data and can be
//! replaced wholesale from a JSON configuration file.

use crate::checks::{
    CoordinateCheck, CoverageCheck, CurrencyCheck, DateCheck, DistributionCheck, IntegrityCheck,
    IntegrityRule, NumericCheck, SchemaCheck,
};
use crate::config::ValidatorConfig;
use crate::core::BoxedCheck;
use crate::prelude::*;
use glob::Pattern;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Name of the profile used when no other profile matches a file.
pub const GENERIC_PROFILE: &str = "generic";

/// Which columns the numeric check profiles.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NumericSelection {
    /// No numeric check
    #[default]
    Skip,
    /// Every column that holds numbers
    Auto,
    /// The listed columns
    Columns(Vec<String>),
}

/// The checks to run against one kind of dataset.
///
/// Checks always run in the same order: schema, dates, numeric,
/// coordinates, integrity, currency, distributions, coverage.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DatasetProfile {
    /// Unique profile name
    pub name: String,
    /// File name under the data directory, for batch validation
    pub file_name: Option<String>,
    /// Glob matched against file names to select this profile
    pub pattern: Option<String>,
    /// Columns that must be present; `None` only scans for empty columns
    pub expected_columns: Option<Vec<String>>,
    /// Whether the schema check runs
    pub schema: bool,
    /// Date column to validate
    pub date_column: Option<String>,
    /// Numeric columns to profile
    pub numeric: NumericSelection,
    /// Coordinate bounds check
    pub coordinates: Option<CoordinateCheck>,
    /// Total-equals-sum-of-parts rules
    pub integrity_rules: Vec<IntegrityRule>,
    /// Date column used to judge freshness
    pub currency_column: Option<String>,
    /// Categorical summaries
    pub distributions: Vec<DistributionCheck>,
    /// Distinct-value expectations
    pub coverage: Vec<CoverageCheck>,
}

impl DatasetProfile {
    /// Creates an empty profile.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// The statewide monthly participation and cost series.
    pub fn monthly() -> Self {
        let measures = ["Household", "Persons", "Per Household", "Per Person", "Cost"];
        Self {
            file_name: Some("Statewide Monthly SNAP FY 89-22.csv".to_string()),
            pattern: Some("*Monthly*".to_string()),
            expected_columns: Some(
                std::iter::once("Date")
                    .chain(measures)
                    .map(String::from)
                    .collect(),
            ),
            schema: true,
            date_column: Some("Date".to_string()),
            numeric: NumericSelection::Columns(measures.map(String::from).to_vec()),
            currency_column: Some("Date".to_string()),
            ..Self::new("monthly")
        }
    }

    /// The historical retailer listing with store locations.
    pub fn retailer() -> Self {
        Self {
            file_name: Some("Statewide SNAP Retailers Historical- FNS.csv".to_string()),
            pattern: Some("*Retailer*".to_string()),
            schema: true,
            coordinates: Some(CoordinateCheck::new("HI")),
            currency_column: Some("Date".to_string()),
            distributions: vec![DistributionCheck::new("Store Type").with_label("Store types")],
            ..Self::new("retailer")
        }
    }

    /// The bi-annual county participation table.
    pub fn county() -> Self {
        Self {
            file_name: Some("County Bi-Annual SNAP 89-21.csv".to_string()),
            pattern: Some("*County*".to_string()),
            schema: true,
            date_column: Some("Date".to_string()),
            numeric: NumericSelection::Auto,
            integrity_rules: vec![IntegrityRule::new(
                "Calc: SNAP Total PA and Non-PA People",
                [
                    "SNAP All Persons Public Assistance Participation",
                    "SNAP All Persons Non-Public Assistance Participation",
                ],
            )],
            currency_column: Some("Date".to_string()),
            coverage: vec![CoverageCheck::new("County").expecting(4, "Hawaii counties")],
            ..Self::new("county")
        }
    }

    /// Fallback for unrecognized files.
    pub fn generic() -> Self {
        Self {
            schema: true,
            date_column: Some("Date".to_string()),
            numeric: NumericSelection::Auto,
            ..Self::new(GENERIC_PROFILE)
        }
    }

    /// Returns true if the profile's pattern matches the file name.
    pub fn matches(&self, file_name: &str) -> bool {
        self.file_name.as_deref() == Some(file_name)
            || self
                .pattern
                .as_deref()
                .and_then(|pattern| Pattern::new(pattern).ok())
                .is_some_and(|pattern| pattern.matches(file_name))
    }

    /// Builds the profile's checks in execution order.
    pub fn checks(&self, config: &ValidatorConfig) -> Vec<BoxedCheck> {
        let thresholds = &config.thresholds;
        let mut checks: Vec<BoxedCheck> = Vec::new();

        if self.schema {
            checks.push(Box::new(match &self.expected_columns {
                Some(columns) => SchemaCheck::expecting(columns.iter().cloned()),
                None => SchemaCheck::new(),
            }));
        }
        if let Some(column) = &self.date_column {
            checks.push(Box::new(DateCheck::new(column.clone(), thresholds.max_gap_days)));
        }
        match &self.numeric {
            NumericSelection::Skip => {}
            NumericSelection::Auto => {
                checks.push(Box::new(NumericCheck::auto(thresholds.zero_ratio)));
            }
            NumericSelection::Columns(columns) => checks.push(Box::new(NumericCheck::columns(
                columns.iter().cloned(),
                thresholds.zero_ratio,
            ))),
        }
        if let Some(coordinates) = &self.coordinates {
            checks.push(Box::new(coordinates.clone()));
        }
        if !self.integrity_rules.is_empty() {
            checks.push(Box::new(IntegrityCheck::new(self.integrity_rules.clone())));
        }
        if let Some(column) = &self.currency_column {
            checks.push(Box::new(
                CurrencyCheck::new(column.clone(), config.reference_date())
                    .with_limits(thresholds.stale_days, thresholds.outdated_days),
            ));
        }
        for distribution in &self.distributions {
            checks.push(Box::new(distribution.clone()));
        }
        for coverage in &self.coverage {
            checks.push(Box::new(coverage.clone()));
        }

        checks
    }

    /// Checks that the profile is well formed.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(GuardError::Configuration(
                "Profile name must not be empty".to_string(),
            ));
        }
        if let Some(pattern) = &self.pattern {
            Pattern::new(pattern).map_err(|e| {
                GuardError::Configuration(format!(
                    "Profile '{}' has invalid pattern '{pattern}': {e}",
                    self.name
                ))
            })?;
        }
        for rule in &self.integrity_rules {
            rule.validate()?;
        }
        Ok(())
    }
}

/// An ordered set of profiles. The first matching profile wins.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileCatalog {
    profiles: Vec<DatasetProfile>,
}

impl Default for ProfileCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl ProfileCatalog {
    /// Creates a catalog from explicit profiles.
    pub fn new(profiles: Vec<DatasetProfile>) -> Self {
        Self { profiles }
    }

    /// The monthly, retailer, county and generic profiles.
    pub fn builtin() -> Self {
        Self::new(vec![
            DatasetProfile::monthly(),
            DatasetProfile::retailer(),
            DatasetProfile::county(),
            DatasetProfile::generic(),
        ])
    }

    /// Returns the profiles in catalog order.
    pub fn profiles(&self) -> &[DatasetProfile] {
        &self.profiles
    }

    /// Finds a profile by name.
    pub fn get(&self, name: &str) -> Option<&DatasetProfile> {
        self.profiles.iter().find(|profile| profile.name == name)
    }

    /// Selects the profile for a file name.
    ///
    /// Falls back to the catalog's `generic` profile, or to
    /// [`DatasetProfile::generic`] if the catalog has none.
    pub fn select(&self, file_name: &str) -> DatasetProfile {
        self.profiles
            .iter()
            .find(|profile| profile.matches(file_name))
            .or_else(|| self.get(GENERIC_PROFILE))
            .cloned()
            .unwrap_or_else(DatasetProfile::generic)
    }

    /// Checks every profile and that names are unique.
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for profile in &self.profiles {
            profile.validate()?;
            if !seen.insert(profile.name.as_str()) {
                return Err(GuardError::Configuration(format!(
                    "Duplicate profile name '{}'",
                    profile.name
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_catalog() {
        let catalog = ProfileCatalog::builtin();
        assert!(catalog.validate().is_ok());
        let names: Vec<_> = catalog.profiles().iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["monthly", "retailer", "county", "generic"]);
    }

    #[test]
    fn test_select_by_pattern() {
        let catalog = ProfileCatalog::builtin();
        assert_eq!(
            catalog.select("Statewide Monthly SNAP FY 89-22.csv").name,
            "monthly"
        );
        assert_eq!(catalog.select("Retailers 2023.csv").name, "retailer");
        assert_eq!(catalog.select("County Bi-Annual SNAP 89-21.csv").name, "county");
        assert_eq!(catalog.select("something_else.csv").name, "generic");
    }

    #[test]
    fn test_select_falls_back_without_generic() {
        let catalog = ProfileCatalog::new(vec![DatasetProfile::monthly()]);
        assert_eq!(catalog.select("other.csv"), DatasetProfile::generic());
    }

    #[test]
    fn test_monthly_checks_in_order() {
        let config = ValidatorConfig::default();
        let names: Vec<_> = DatasetProfile::monthly()
            .checks(&config)
            .iter()
            .map(|check| check.name().to_string())
            .collect();
        assert_eq!(names, vec!["schema", "dates", "numeric", "currency"]);
    }

    #[test]
    fn test_county_checks_in_order() {
        let config = ValidatorConfig::default();
        let names: Vec<_> = DatasetProfile::county()
            .checks(&config)
            .iter()
            .map(|check| check.name().to_string())
            .collect();
        assert_eq!(
            names,
            vec!["schema", "dates", "numeric", "integrity", "currency", "coverage"]
        );
    }

    #[test]
    fn test_profile_from_json() {
        let profile: DatasetProfile = serde_json::from_str(
            r#"{
                "name": "quarterly",
                "pattern": "*Quarterly*",
                "schema": true,
                "date_column": "Quarter",
                "numeric": { "columns": ["Persons"] },
                "integrity_rules": [ { "total": "All", "parts": ["A", "B"], "tolerance": 0.5 } ],
                "coverage": [ { "column": "Island", "expected_count": 6 } ]
            }"#,
        )
        .unwrap();

        assert_eq!(profile.numeric, NumericSelection::Columns(vec!["Persons".into()]));
        assert_eq!(profile.integrity_rules[0].tolerance, 0.5);
        assert!(profile.matches("HI Quarterly.csv"));
        assert!(profile.coordinates.is_none());
    }

    #[test]
    fn test_invalid_catalogs() {
        let bad_pattern = DatasetProfile {
            pattern: Some("[".to_string()),
            ..DatasetProfile::new("broken")
        };
        assert!(ProfileCatalog::new(vec![bad_pattern]).validate().is_err());

        let duplicate =
            ProfileCatalog::new(vec![DatasetProfile::generic(), DatasetProfile::generic()]);
        assert!(duplicate.validate().is_err());
    }
}
