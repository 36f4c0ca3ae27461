//! Distinct-value coverage of a categorical column.

use crate::core::{column_as_strings, Check, Dataset, Finding, TABLE_NAME};
use crate::prelude::*;
use crate::security::SqlSecurity;
use arrow::array::Array;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::instrument;

/// Lists the distinct values of a column and compares their number with an
/// expectation, e.g. the four Hawaii counties.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CoverageCheck {
    /// Column to inspect
    pub column: String,
    /// Expected number of distinct values
    #[serde(default)]
    pub expected_count: Option<usize>,
    /// What the values are, used in the mismatch message
    #[serde(default)]
    pub description: Option<String>,
}

impl CoverageCheck {
    /// Creates a check that only lists distinct values.
    pub fn new(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            expected_count: None,
            description: None,
        }
    }

    /// Sets the expected number of distinct values and what they are.
    pub fn expecting(mut self, count: usize, description: impl Into<String>) -> Self {
        self.expected_count = Some(count);
        self.description = Some(description.into());
        self
    }
}

#[async_trait]
impl Check for CoverageCheck {
    #[instrument(skip(self, dataset), fields(dataset = %dataset.name(), column = %self.column))]
    async fn evaluate(&self, dataset: &Dataset) -> Result<Vec<Finding>> {
        if !dataset.has_column(&self.column) {
            return Ok(vec![Finding::info(
                self.name(),
                format!("Coverage check skipped: column '{}' not present", self.column),
            )]);
        }

        let identifier = SqlSecurity::escape_identifier(&self.column)?;
        let present = dataset.present_expr(&self.column)?;
        let batches = dataset
            .query(&format!(
                "SELECT DISTINCT {identifier} AS category FROM {TABLE_NAME} \
                 WHERE {present} ORDER BY category"
            ))
            .await?;

        let mut values = Vec::new();
        for batch in &batches {
            let categories = column_as_strings(batch, "category")?;
            values.extend((0..categories.len()).map(|row| categories.value(row).to_string()));
        }

        let mut findings = vec![Finding::info(
            self.name(),
            format!(
                "{} values ({}): {}",
                self.column,
                values.len(),
                values.join(", ")
            ),
        )];

        if let Some(expected) = self.expected_count {
            if values.len() != expected {
                let description = self
                    .description
                    .clone()
                    .unwrap_or_else(|| format!("distinct '{}' values", self.column));
                findings.push(Finding::warning(
                    self.name(),
                    format!("Expected {expected} {description}, found {}", values.len()),
                ));
            }
        }
        Ok(findings)
    }

    fn name(&self) -> &str {
        "coverage"
    }
}
