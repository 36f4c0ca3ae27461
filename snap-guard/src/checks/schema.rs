//! Column presence and emptiness check.

use super::quote_list;
use crate::core::{scalar_count, Check, Dataset, Finding, TABLE_NAME};
use crate::prelude::*;
use async_trait::async_trait;
use std::collections::BTreeSet;
use tracing::instrument;

/// Verifies expected columns exist and flags columns with no values at all.
///
/// All missing expected columns are reported together in a single `Issue`.
/// The empty-column scan runs whether or not an expected list was given.
#[derive(Debug, Clone, Default)]
pub struct SchemaCheck {
    expected_columns: Option<Vec<String>>,
}

impl SchemaCheck {
    /// Creates a check that only scans for empty columns.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a check that also requires the given columns.
    pub fn expecting<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            expected_columns: Some(columns.into_iter().map(Into::into).collect()),
        }
    }

    async fn empty_columns(&self, dataset: &Dataset) -> Result<Vec<String>> {
        let columns = dataset.column_names();
        if columns.is_empty() {
            return Ok(Vec::new());
        }

        let counts = columns
            .iter()
            .enumerate()
            .map(|(i, column)| {
                let present = dataset.present_expr(column)?;
                Ok(format!("SUM(CASE WHEN {present} THEN 1 ELSE 0 END) AS c{i}"))
            })
            .collect::<Result<Vec<_>>>()?
            .join(", ");

        let batches = dataset
            .query(&format!("SELECT {counts} FROM {TABLE_NAME}"))
            .await?;

        let mut empty = Vec::new();
        for (i, column) in columns.into_iter().enumerate() {
            if scalar_count(&batches, &format!("c{i}"))? == 0 {
                empty.push(column);
            }
        }
        Ok(empty)
    }
}

#[async_trait]
impl Check for SchemaCheck {
    #[instrument(skip(self, dataset), fields(dataset = %dataset.name()))]
    async fn evaluate(&self, dataset: &Dataset) -> Result<Vec<Finding>> {
        let mut findings = Vec::new();

        if let Some(expected) = &self.expected_columns {
            let missing: BTreeSet<&str> = expected
                .iter()
                .filter(|column| !dataset.has_column(column))
                .map(String::as_str)
                .collect();

            if missing.is_empty() {
                findings.push(Finding::info(self.name(), "All expected columns present"));
            } else {
                findings.push(Finding::issue(
                    self.name(),
                    format!("Missing columns: {}", quote_list(missing)),
                ));
            }
        }

        if dataset.row_count() == 0 {
            findings.push(Finding::warning(self.name(), "Dataset contains no records"));
            return Ok(findings);
        }

        let empty = self.empty_columns(dataset).await?;
        if !empty.is_empty() {
            findings.push(Finding::warning(
                self.name(),
                format!("Empty columns: {}", quote_list(&empty)),
            ));
        }

        Ok(findings)
    }

    fn name(&self) -> &str {
        "schema"
    }
}
