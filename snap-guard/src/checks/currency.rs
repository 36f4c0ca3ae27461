//! Freshness of a dataset relative to a reference date.

use super::parse_date;
use crate::core::{Check, Dataset, Finding};
use crate::prelude::*;
use async_trait::async_trait;
use chrono::NaiveDate;
use tracing::{debug, instrument};

/// Reports how far the newest record lags behind a reference date.
#[derive(Debug, Clone)]
pub struct CurrencyCheck {
    column: String,
    as_of: NaiveDate,
    stale_days: i64,
    outdated_days: i64,
}

impl CurrencyCheck {
    /// Creates a currency check with the default 90/365-day limits.
    pub fn new(column: impl Into<String>, as_of: NaiveDate) -> Self {
        Self {
            column: column.into(),
            as_of,
            stale_days: 90,
            outdated_days: 365,
        }
    }

    /// Overrides the stale and outdated limits, in days.
    pub fn with_limits(mut self, stale_days: i64, outdated_days: i64) -> Self {
        self.stale_days = stale_days;
        self.outdated_days = outdated_days;
        self
    }

    fn age_finding(&self, latest: NaiveDate) -> Finding {
        let days_old = (self.as_of - latest).num_days();
        if days_old > self.outdated_days {
            Finding::warning(
                self.name(),
                format!(
                    "Data is {:.1} years out of date (latest: {latest})",
                    days_old as f64 / 365.0
                ),
            )
        } else if days_old > self.stale_days {
            Finding::warning(
                self.name(),
                format!("Data is {days_old} days out of date (latest: {latest})"),
            )
        } else {
            Finding::info(self.name(), format!("Data is current (latest: {latest})"))
        }
    }
}

#[async_trait]
impl Check for CurrencyCheck {
    #[instrument(skip(self, dataset), fields(dataset = %dataset.name(), as_of = %self.as_of))]
    async fn evaluate(&self, dataset: &Dataset) -> Result<Vec<Finding>> {
        if !dataset.has_column(&self.column) {
            return Ok(vec![Finding::info(
                self.name(),
                format!("Currency check skipped: column '{}' not present", self.column),
            )]);
        }

        let latest = dataset
            .text_values(&self.column)
            .await?
            .iter()
            .filter_map(|value| value.as_deref().and_then(parse_date))
            .max();
        debug!(latest = ?latest, "Newest record");

        let finding = match latest {
            Some(latest) => self.age_finding(latest),
            None => Finding::warning(
                self.name(),
                format!(
                    "Could not check data currency: no parseable dates in '{}'",
                    self.column
                ),
            ),
        };
        Ok(vec![finding])
    }

    fn name(&self) -> &str {
        "currency"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Severity;
    use arrow::array::StringArray;
    use arrow::datatypes::{DataType, Field, Schema};
    use arrow::record_batch::RecordBatch;
    use std::sync::Arc;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn dates(values: Vec<Option<&str>>) -> Dataset {
        let schema = Arc::new(Schema::new(vec![Field::new("Date", DataType::Utf8, true)]));
        let batch =
            RecordBatch::try_new(schema, vec![Arc::new(StringArray::from(values))]).unwrap();
        Dataset::from_batches("monthly.csv", vec![batch]).unwrap()
    }

    #[tokio::test]
    async fn test_years_out_of_date() {
        let dataset = dates(vec![Some("2021-09-01"), Some("2022-09-01"), None]);
        let findings = CurrencyCheck::new("Date", ymd(2024, 9, 1))
            .evaluate(&dataset)
            .await
            .unwrap();

        assert_eq!(findings[0].severity, Severity::Warning);
        assert_eq!(
            findings[0].message,
            "Data is 2.0 years out of date (latest: 2022-09-01)"
        );
    }

    #[tokio::test]
    async fn test_days_out_of_date() {
        let dataset = dates(vec![Some("2024-01-01")]);
        let findings = CurrencyCheck::new("Date", ymd(2024, 6, 1))
            .evaluate(&dataset)
            .await
            .unwrap();

        assert_eq!(
            findings[0].message,
            "Data is 152 days out of date (latest: 2024-01-01)"
        );
    }

    #[tokio::test]
    async fn test_current() {
        let dataset = dates(vec![Some("2024-05-01")]);
        let findings = CurrencyCheck::new("Date", ymd(2024, 6, 1))
            .evaluate(&dataset)
            .await
            .unwrap();

        assert_eq!(findings[0].severity, Severity::Info);
        assert_eq!(findings[0].message, "Data is current (latest: 2024-05-01)");
    }

    #[tokio::test]
    async fn test_no_parseable_dates() {
        let dataset = dates(vec![Some("n/a"), None]);
        let findings = CurrencyCheck::new("Date", ymd(2024, 6, 1))
            .evaluate(&dataset)
            .await
            .unwrap();

        assert_eq!(findings[0].severity, Severity::Warning);
        assert!(findings[0]
            .message
            .starts_with("Could not check data currency"));
    }

    #[tokio::test]
    async fn test_absent_column_skipped() {
        let dataset = dates(vec![Some("2024-05-01")]);
        let findings = CurrencyCheck::new("Updated", ymd(2024, 6, 1))
            .evaluate(&dataset)
            .await
            .unwrap();
        assert_eq!(findings[0].severity, Severity::Info);
    }
}
