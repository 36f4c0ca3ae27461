//! Frequency summary of a categorical column.

use super::group_thousands;
use crate::core::{column_as_f64, column_as_strings, Check, Dataset, Finding, TABLE_NAME};
use crate::prelude::*;
use crate::security::SqlSecurity;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::instrument;

fn default_top() -> usize {
    10
}

/// Lists the most frequent values of a column with their counts.
///
/// Values are ordered by count descending, ties broken alphabetically.
/// Missing values are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DistributionCheck {
    /// Column to summarize
    pub column: String,
    /// Number of values to list
    #[serde(default = "default_top")]
    pub top: usize,
    /// Heading for the summary; defaults to `{column} distribution`
    #[serde(default)]
    pub label: Option<String>,
}

impl DistributionCheck {
    /// Creates a top-10 summary of a column.
    pub fn new(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            top: default_top(),
            label: None,
        }
    }

    /// Sets the number of values listed.
    pub fn with_top(mut self, top: usize) -> Self {
        self.top = top;
        self
    }

    /// Sets the heading line.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}

#[async_trait]
impl Check for DistributionCheck {
    #[instrument(skip(self, dataset), fields(dataset = %dataset.name(), column = %self.column))]
    async fn evaluate(&self, dataset: &Dataset) -> Result<Vec<Finding>> {
        if !dataset.has_column(&self.column) {
            return Ok(vec![Finding::info(
                self.name(),
                format!("Distribution skipped: column '{}' not present", self.column),
            )]);
        }

        let identifier = SqlSecurity::escape_identifier(&self.column)?;
        let present = dataset.present_expr(&self.column)?;
        let sql = format!(
            "SELECT {identifier} AS category, COUNT(*) AS occurrences FROM {TABLE_NAME} \
             WHERE {present} GROUP BY {identifier} \
             ORDER BY occurrences DESC, category ASC LIMIT {}",
            self.top
        );
        let batches = dataset.query(&sql).await?;

        let heading = self
            .label
            .clone()
            .unwrap_or_else(|| format!("{} distribution", self.column));
        let mut findings = vec![Finding::info(self.name(), format!("{heading}:"))];

        for batch in &batches {
            let categories = column_as_strings(batch, "category")?;
            let counts = column_as_f64(batch, "occurrences")?;
            for row in 0..batch.num_rows() {
                findings.push(Finding::info(
                    self.name(),
                    format!(
                        "  {}: {}",
                        categories.value(row),
                        group_thousands(counts.value(row))
                    ),
                ));
            }
        }
        Ok(findings)
    }

    fn name(&self) -> &str {
        "distribution"
    }
}
