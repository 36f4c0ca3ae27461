//! Numeric column profiling.

use super::{group_thousands, percent};
use crate::core::{scalar_count, scalar_f64, Check, Dataset, Finding, TABLE_NAME};
use crate::prelude::*;
use async_trait::async_trait;
use tracing::{instrument, warn};

/// Profiles numeric columns for negatives, excess zeros and missing values.
///
/// With no explicit column list, every column whose values are all numbers
/// is profiled. Text cells are read with thousands separators and currency
/// signs stripped.
#[derive(Debug, Clone)]
pub struct NumericCheck {
    columns: Option<Vec<String>>,
    zero_ratio: f64,
}

impl NumericCheck {
    /// Profiles every column that holds numbers.
    pub fn auto(zero_ratio: f64) -> Self {
        Self {
            columns: None,
            zero_ratio,
        }
    }

    /// Profiles the listed columns.
    pub fn columns<I, S>(columns: I, zero_ratio: f64) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: Some(columns.into_iter().map(Into::into).collect()),
            zero_ratio,
        }
    }

    async fn profile_column(&self, dataset: &Dataset, column: &str) -> Result<Vec<Finding>> {
        let value = dataset.numeric_expr(column)?;
        let sql = format!(
            "SELECT COUNT(*) AS total_rows, \
             SUM(CASE WHEN v < 0 THEN 1 ELSE 0 END) AS negatives, \
             SUM(CASE WHEN v = 0 THEN 1 ELSE 0 END) AS zeros, \
             SUM(CASE WHEN v IS NULL THEN 1 ELSE 0 END) AS missing, \
             MIN(v) AS min_value, MAX(v) AS max_value, AVG(v) AS mean_value \
             FROM (SELECT {value} AS v FROM {TABLE_NAME}) AS numeric_values"
        );
        let batches = dataset.query(&sql).await?;

        let total = scalar_count(&batches, "total_rows")?;
        let negatives = scalar_count(&batches, "negatives")?;
        let zeros = scalar_count(&batches, "zeros")?;
        let missing = scalar_count(&batches, "missing")?;

        let mut findings = Vec::new();
        if negatives > 0 {
            findings.push(Finding::warning(
                self.name(),
                format!("{column}: {negatives} negative values"),
            ));
        }
        if zeros as f64 > total as f64 * self.zero_ratio {
            findings.push(Finding::warning(
                self.name(),
                format!(
                    "{column}: {zeros} zero values ({:.1}%)",
                    percent(zeros, total)
                ),
            ));
        }
        if missing > 0 {
            findings.push(Finding::warning(
                self.name(),
                format!(
                    "{column}: {missing} missing values ({:.1}%)",
                    percent(missing, total)
                ),
            ));
        }

        if let (Some(min), Some(max), Some(mean)) = (
            scalar_f64(&batches, "min_value")?,
            scalar_f64(&batches, "max_value")?,
            scalar_f64(&batches, "mean_value")?,
        ) {
            findings.push(Finding::info(
                self.name(),
                format!(
                    "{column}: min={}, max={}, mean={}",
                    group_thousands(min),
                    group_thousands(max),
                    group_thousands(mean)
                ),
            ));
        }

        Ok(findings)
    }
}

#[async_trait]
impl Check for NumericCheck {
    #[instrument(skip(self, dataset), fields(dataset = %dataset.name()))]
    async fn evaluate(&self, dataset: &Dataset) -> Result<Vec<Finding>> {
        let columns = match &self.columns {
            Some(columns) => columns.clone(),
            None => {
                let detected = dataset.numeric_columns().await?;
                if detected.is_empty() {
                    return Ok(vec![Finding::info(self.name(), "No numeric columns detected")]);
                }
                detected
            }
        };

        let mut findings = Vec::new();
        for column in &columns {
            if !dataset.has_column(column) {
                findings.push(Finding::info(
                    self.name(),
                    format!("Numeric column '{column}' not present; skipped"),
                ));
                continue;
            }

            match self.profile_column(dataset, column).await {
                Ok(column_findings) => findings.extend(column_findings),
                Err(e) => {
                    warn!(column = %column, error = %e, "Could not profile column");
                    findings.push(Finding::warning(
                        self.name(),
                        format!("{column}: could not be profiled: {e}"),
                    ));
                }
            }
        }
        Ok(findings)
    }

    fn name(&self) -> &str {
        "numeric"
    }
}
