//! Date parsing and the date column check.

use crate::core::{Check, Dataset, Finding};
use crate::prelude::*;
use async_trait::async_trait;
use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};
use tracing::{debug, instrument};

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

// `%Y` accepts any width, so two-digit-year layouts are tried before the
// four-digit and year-first ones that would read "21" as the year 21.
const DATE_FORMATS: &[&str] = &[
    "%m/%d/%y",
    "%m/%d/%Y",
    "%m-%d-%y",
    "%m-%d-%Y",
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%d-%b-%y",
    "%d-%b-%Y",
    "%d %b %Y",
    "%d %B %Y",
    "%b %d, %Y",
    "%B %d, %Y",
    "%b %d %Y",
    "%B %d %Y",
];

const MONTH_FORMATS: &[&str] = &["%Y-%m", "%Y/%m", "%m/%Y", "%b-%y", "%b %Y", "%B %Y", "%b-%Y"];

/// Earliest year accepted from any layout. A `%d %Y` layout can otherwise
/// read "Oct 1988" as day 19 of the year 88.
const MIN_YEAR: i32 = 1000;

fn plausible(date: NaiveDate) -> Option<NaiveDate> {
    (date.year() >= MIN_YEAR).then_some(date)
}

/// Parses a date written in any of the common spreadsheet layouts.
///
/// Accepts ISO dates and timestamps, US month/day/year with two- or
/// four-digit years, named months, and month-only values (which resolve to
/// the first of the month). Returns `None` for blank or unparseable text.
///
/// ```rust
/// use snap_guard::checks::parse_date;
/// use chrono::NaiveDate;
///
/// let oct_1988 = NaiveDate::from_ymd_opt(1988, 10, 1);
/// assert_eq!(parse_date("1988-10-01"), oct_1988);
/// assert_eq!(parse_date("10/1/1988"), oct_1988);
/// assert_eq!(parse_date("Oct 1988"), oct_1988);
/// assert_eq!(parse_date("not a date"), None);
/// ```
pub fn parse_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    if let Ok(timestamp) = DateTime::parse_from_rfc3339(text) {
        return plausible(timestamp.date_naive());
    }

    DATETIME_FORMATS
        .iter()
        .find_map(|format| {
            NaiveDateTime::parse_from_str(text, format)
                .ok()
                .and_then(|timestamp| plausible(timestamp.date()))
        })
        .or_else(|| {
            DATE_FORMATS.iter().find_map(|format| {
                NaiveDate::parse_from_str(text, format)
                    .ok()
                    .and_then(plausible)
            })
        })
        .or_else(|| {
            let with_day = format!("{text} 1");
            MONTH_FORMATS.iter().find_map(|format| {
                NaiveDate::parse_from_str(&with_day, &format!("{format} %d"))
                    .ok()
                    .and_then(plausible)
            })
        })
}

/// Validates a date column: parseability, range, gaps and duplicates.
///
/// Gaps and duplicates are computed over the parsed dates only, after
/// sorting. A missing column is an `Issue`, since the caller asked for it.
#[derive(Debug, Clone)]
pub struct DateCheck {
    column: String,
    max_gap_days: i64,
}

impl DateCheck {
    /// Creates a date check with the given gap limit in days.
    pub fn new(column: impl Into<String>, max_gap_days: i64) -> Self {
        Self {
            column: column.into(),
            max_gap_days,
        }
    }

    fn sequence_findings(&self, mut dates: Vec<NaiveDate>) -> Vec<Finding> {
        let mut findings = Vec::new();
        dates.sort_unstable();

        let (Some(first), Some(last)) = (dates.first(), dates.last()) else {
            return findings;
        };
        findings.push(Finding::info(
            self.name(),
            format!("Date range: {first} to {last}"),
        ));

        let gaps = dates
            .windows(2)
            .filter(|pair| (pair[1] - pair[0]).num_days() > self.max_gap_days)
            .count();
        if gaps > 0 {
            findings.push(Finding::warning(
                self.name(),
                format!("Found {gaps} gaps > {} days", self.max_gap_days),
            ));
        }

        let duplicates = dates.windows(2).filter(|pair| pair[0] == pair[1]).count();
        if duplicates > 0 {
            findings.push(Finding::warning(
                self.name(),
                format!("{duplicates} duplicate dates"),
            ));
        }

        findings
    }
}

#[async_trait]
impl Check for DateCheck {
    #[instrument(skip(self, dataset), fields(dataset = %dataset.name(), column = %self.column))]
    async fn evaluate(&self, dataset: &Dataset) -> Result<Vec<Finding>> {
        if !dataset.has_column(&self.column) {
            return Ok(vec![Finding::issue(
                self.name(),
                format!("Date column '{}' not found", self.column),
            )]);
        }

        let values = dataset.text_values(&self.column).await?;
        let parsed: Vec<Option<NaiveDate>> = values
            .iter()
            .map(|value| value.as_deref().and_then(parse_date))
            .collect();
        let invalid = parsed.iter().filter(|date| date.is_none()).count();
        debug!(total = parsed.len(), invalid, "Parsed date column");

        let mut findings = Vec::new();
        if invalid > 0 {
            findings.push(Finding::warning(
                self.name(),
                format!("{invalid} invalid dates in '{}'", self.column),
            ));
        } else {
            findings.push(Finding::info(self.name(), "All dates valid"));
        }

        findings.extend(self.sequence_findings(parsed.into_iter().flatten().collect()));
        Ok(findings)
    }

    fn name(&self) -> &str {
        "dates"
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

    fn ymd(y: i32, m: u32, d: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(y, m, d)
    }

    fn dates(values: &[Option<&str>]) -> Dataset {
        let schema = Arc::new(Schema::new(vec![Field::new("Date", DataType::Utf8, true)]));
        let batch = RecordBatch::try_new(
            schema,
            vec![Arc::new(StringArray::from(values.to_vec()))],
        )
        .unwrap();
        Dataset::from_batches("dates.csv", vec![batch]).unwrap()
    }

    #[test]
    fn test_parse_date_formats() {
        assert_eq!(parse_date("2021-07-01"), ymd(2021, 7, 1));
        assert_eq!(parse_date("2021-07-01T00:00:00"), ymd(2021, 7, 1));
        assert_eq!(parse_date("2021-07-01 13:45:00"), ymd(2021, 7, 1));
        assert_eq!(parse_date("2021-07-01T08:00:00Z"), ymd(2021, 7, 1));
        assert_eq!(parse_date("7/1/2021"), ymd(2021, 7, 1));
        assert_eq!(parse_date("07/01/21"), ymd(2021, 7, 1));
        assert_eq!(parse_date("1-Jul-21"), ymd(2021, 7, 1));
        assert_eq!(parse_date("July 1, 2021"), ymd(2021, 7, 1));
        assert_eq!(parse_date("2021-07"), ymd(2021, 7, 1));
        assert_eq!(parse_date("Jul-21"), ymd(2021, 7, 1));
        assert_eq!(parse_date("Oct 1988"), ymd(1988, 10, 1));
        assert_eq!(parse_date("July 2021"), ymd(2021, 7, 1));
        assert_eq!(parse_date("07/2021"), ymd(2021, 7, 1));
        assert_eq!(parse_date(" 2021-07-01 "), ymd(2021, 7, 1));
    }

    #[test]
    fn test_parse_date_rejects_garbage() {
        assert_eq!(parse_date(""), None);
        assert_eq!(parse_date("   "), None);
        assert_eq!(parse_date("bad"), None);
        assert_eq!(parse_date("2021-13-01"), None);
        assert_eq!(parse_date("2021-02-30"), None);
        assert_eq!(parse_date("0088-10-19"), None);
    }

    #[tokio::test]
    async fn test_invalid_dates_counted() {
        let dataset = dates(&[
            Some("2020-01-01"),
            Some("bad"),
            None,
            Some("2020-02-01"),
            Some("13/45/2020"),
        ]);
        let findings = DateCheck::new("Date", 60).evaluate(&dataset).await.unwrap();

        assert_eq!(findings[0].severity, Severity::Warning);
        assert_eq!(findings[0].message, "3 invalid dates in 'Date'");
        assert_eq!(findings[1].message, "Date range: 2020-01-01 to 2020-02-01");
    }

    #[tokio::test]
    async fn test_clean_monthly_series() {
        let dataset = dates(&[Some("2020-03-01"), Some("2020-01-01"), Some("2020-02-01")]);
        let findings = DateCheck::new("Date", 60).evaluate(&dataset).await.unwrap();

        let messages: Vec<_> = findings.iter().map(|f| f.message.as_str()).collect();
        assert_eq!(
            messages,
            vec!["All dates valid", "Date range: 2020-01-01 to 2020-03-01"]
        );
    }

    #[tokio::test]
    async fn test_gaps_and_duplicates() {
        let dataset = dates(&[
            Some("2020-01-01"),
            Some("2020-06-01"),
            Some("2020-06-01"),
            Some("2020-07-01"),
            Some("2021-01-01"),
        ]);
        let findings = DateCheck::new("Date", 60).evaluate(&dataset).await.unwrap();

        let warnings: Vec<_> = findings
            .iter()
            .filter(|f| f.severity == Severity::Warning)
            .map(|f| f.message.as_str())
            .collect();
        assert_eq!(warnings, vec!["Found 2 gaps > 60 days", "1 duplicate dates"]);
    }

    #[tokio::test]
    async fn test_missing_column_is_issue() {
        let dataset = dates(&[Some("2020-01-01")]);
        let findings = DateCheck::new("Month", 60).evaluate(&dataset).await.unwrap();

        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].severity, Severity::Issue);
        assert_eq!(findings[0].message, "Date column 'Month' not found");
    }
}
