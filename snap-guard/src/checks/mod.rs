//! Validation checks.
//!
//! Every check implements [`Check`](crate::core::Check). Most translate into
//! one aggregate SQL query over the `data` table; the date-based checks read
//! the column as text and parse it with [`parse_date`].
//!
//! | Check | Produces |
//! |-------|----------|
//! | [`SchemaCheck`] | missing expected columns (`Issue`), entirely empty columns |
//! | [`DateCheck`] | invalid dates, date range, gaps, duplicates |
//! | [`NumericCheck`] | negatives, excess zeros, missing values, min/max/mean |
//! | [`CoordinateCheck`] | points outside the region's bounding box |
//! | [`IntegrityCheck`] | stated totals that differ from the sum of their parts |
//! | [`CurrencyCheck`] | age of the newest record |
//! | [`DistributionCheck`] | most frequent values of a categorical column |
//! | [`CoverageCheck`] | distinct values against an expected count |

mod coordinates;
mod coverage;
mod currency;
mod dates;
mod distribution;
mod integrity;
mod numeric;
mod schema;

pub use coordinates::{CoordinateCheck, RegionBounds};
pub use coverage::CoverageCheck;
pub use currency::CurrencyCheck;
pub use dates::{parse_date, DateCheck};
pub use distribution::DistributionCheck;
pub use integrity::{IntegrityCheck, IntegrityRule};
pub use numeric::NumericCheck;
pub use schema::SchemaCheck;

/// Formats a value rounded to a whole number with thousands separators.
///
/// ```rust
/// use snap_guard::checks::group_thousands;
///
/// assert_eq!(group_thousands(1234567.4), "1,234,567");
/// assert_eq!(group_thousands(-9876.4), "-9,876");
/// assert_eq!(group_thousands(12.0), "12");
/// ```
pub fn group_thousands(value: f64) -> String {
    let rounded = format!("{value:.0}");
    let (sign, digits) = match rounded.strip_prefix('-') {
        Some(digits) => ("-", digits),
        None => ("", rounded.as_str()),
    };

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    format!("{sign}{grouped}")
}

/// Returns `part` as a percentage of `total`, or zero for an empty table.
pub(crate) fn percent(part: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        part as f64 / total as f64 * 100.0
    }
}

/// Renders column names as a quoted, comma-separated list.
pub(crate) fn quote_list<I, S>(names: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    names
        .into_iter()
        .map(|name| format!("'{}'", name.as_ref()))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Returns the names in `required` that the dataset lacks, in input order.
pub(crate) fn absent_columns<'a>(
    dataset: &crate::core::Dataset,
    required: impl IntoIterator<Item = &'a String>,
) -> Vec<&'a str> {
    required
        .into_iter()
        .filter(|column| !dataset.has_column(column))
        .map(String::as_str)
        .collect()
}
