//! Row-level arithmetic consistency between a total column and its parts.

use super::{absent_columns, quote_list};
use crate::core::{scalar_count, Check, Dataset, Finding, TABLE_NAME};
use crate::prelude::*;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

/// A declared relationship `total = parts[0] + parts[1] + ...`.
///
/// # Examples
///
/// ```rust
/// use snap_guard::checks::IntegrityRule;
///
/// let rule = IntegrityRule::new("Total", ["Public", "Non-Public"]);
/// assert_eq!(rule.describe(), "'Public' + 'Non-Public' != 'Total'");
/// assert!(rule.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IntegrityRule {
    /// Column holding the stated total
    pub total: String,
    /// Columns that should sum to the total
    pub parts: Vec<String>,
    /// Largest accepted absolute difference
    #[serde(default)]
    pub tolerance: f64,
}

impl IntegrityRule {
    /// Creates an exact-match rule.
    pub fn new<I, S>(total: impl Into<String>, parts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            total: total.into(),
            parts: parts.into_iter().map(Into::into).collect(),
            tolerance: 0.0,
        }
    }

    /// Sets the accepted absolute difference.
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Returns `'a' + 'b' != 'total'`, as used in mismatch findings.
    pub fn describe(&self) -> String {
        let parts = self
            .parts
            .iter()
            .map(|part| format!("'{part}'"))
            .collect::<Vec<_>>()
            .join(" + ");
        format!("{parts} != '{}'", self.total)
    }

    /// Checks that the rule is well formed.
    pub fn validate(&self) -> Result<()> {
        if self.parts.is_empty() {
            return Err(GuardError::Configuration(format!(
                "Integrity rule for '{}' has no parts",
                self.total
            )));
        }
        if !self.tolerance.is_finite() || self.tolerance < 0.0 {
            return Err(GuardError::Configuration(format!(
                "Integrity rule for '{}' has invalid tolerance {}",
                self.total, self.tolerance
            )));
        }
        Ok(())
    }

    fn columns(&self) -> impl Iterator<Item = &String> {
        std::iter::once(&self.total).chain(self.parts.iter())
    }
}

/// Evaluates a set of [`IntegrityRule`]s row by row.
///
/// A row with any missing operand counts as a mismatch.
#[derive(Debug, Clone, Default)]
pub struct IntegrityCheck {
    rules: Vec<IntegrityRule>,
}

impl IntegrityCheck {
    /// Creates a check over the given rules.
    pub fn new(rules: Vec<IntegrityRule>) -> Self {
        Self { rules }
    }

    async fn evaluate_rule(&self, dataset: &Dataset, rule: &IntegrityRule) -> Result<Finding> {
        let absent = absent_columns(dataset, rule.columns());
        if !absent.is_empty() {
            return Ok(Finding::info(
                self.name(),
                format!(
                    "Integrity rule for '{}' skipped: column(s) {} not present",
                    rule.total,
                    quote_list(absent)
                ),
            ));
        }

        let sum = rule
            .parts
            .iter()
            .map(|part| dataset.numeric_expr(part))
            .collect::<Result<Vec<_>>>()?
            .join(" + ");
        let total = dataset.numeric_expr(&rule.total)?;
        let sql = format!(
            "SELECT SUM(CASE WHEN ABS(({sum}) - {total}) <= {} THEN 0 ELSE 1 END) AS mismatches \
             FROM {TABLE_NAME}",
            rule.tolerance
        );
        let batches = dataset.query(&sql).await?;
        let mismatches = scalar_count(&batches, "mismatches")?;
        debug!(total = %rule.total, mismatches, "Evaluated integrity rule");

        if mismatches > 0 {
            Ok(Finding::warning(
                self.name(),
                format!("{mismatches} records where {}", rule.describe()),
            ))
        } else {
            Ok(Finding::info(
                self.name(),
                format!("Calculated totals match '{}'", rule.total),
            ))
        }
    }
}

#[async_trait]
impl Check for IntegrityCheck {
    #[instrument(skip(self, dataset), fields(dataset = %dataset.name(), rules = self.rules.len()))]
    async fn evaluate(&self, dataset: &Dataset) -> Result<Vec<Finding>> {
        let mut findings = Vec::with_capacity(self.rules.len());
        for rule in &self.rules {
            findings.push(self.evaluate_rule(dataset, rule).await?);
        }
        Ok(findings)
    }

    fn name(&self) -> &str {
        "integrity"
    }
}
