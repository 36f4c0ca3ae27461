//! A loaded table and the query helpers checks use to read it.

use crate::error::ErrorContext;
use crate::logging::truncate_field;
use crate::prelude::*;
use crate::security::SqlSecurity;
use crate::sources::{CsvOptions, CsvSource, DataSource};
use arrow::array::{Array, ArrayRef, Float64Array, StringArray};
use arrow::compute::cast;
use arrow::datatypes::{DataType, SchemaRef};
use arrow::record_batch::RecordBatch;
use datafusion::datasource::MemTable;
use datafusion::execution::context::SessionConfig;
use datafusion::prelude::SessionContext;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, instrument};

/// Name under which every dataset is registered in its session.
pub const TABLE_NAME: &str = "data";

/// An ordered table of rows with named columns, loaded from one file.
///
/// Each dataset owns its own DataFusion session, so runs never share state.
#[derive(Clone)]
pub struct Dataset {
    name: String,
    ctx: SessionContext,
    schema: SchemaRef,
    row_count: usize,
}

impl std::fmt::Debug for Dataset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dataset")
            .field("name", &self.name)
            .field("columns", &self.column_names())
            .field("row_count", &self.row_count)
            .finish()
    }
}

impl Dataset {
    /// Loads a delimited file.
    ///
    /// Every column is read as text and the whole file is decoded once into
    /// memory, so malformed content and encoding errors surface here rather
    /// than in a later check.
    #[instrument(skip(options), fields(path = %path.as_ref().display()))]
    pub async fn load(path: impl AsRef<Path>, options: &CsvOptions) -> Result<Self> {
        let path = path.as_ref();
        let source = CsvSource::with_options(path, options.clone());
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        let ctx = Self::session();
        source.register(&ctx, TABLE_NAME).await?;

        let df = ctx.table(TABLE_NAME).await?;
        let schema = df.schema().inner().clone();
        let batches = df
            .collect()
            .await
            .with_context(|| format!("Failed to read records from {name}"))?;
        let row_count = batches.iter().map(RecordBatch::num_rows).sum();

        ctx.deregister_table(TABLE_NAME)?;
        let table = MemTable::try_new(schema.clone(), vec![batches])?;
        ctx.register_table(TABLE_NAME, Arc::new(table))?;

        debug!(
            dataset = %name,
            columns = schema.fields().len(),
            rows = row_count,
            "Dataset loaded"
        );

        Ok(Self {
            name,
            ctx,
            schema,
            row_count,
        })
    }

    /// Builds a dataset from in-memory record batches.
    pub fn from_batches(name: impl Into<String>, batches: Vec<RecordBatch>) -> Result<Self> {
        let first = batches.first().ok_or_else(|| {
            GuardError::data_source("memory", "At least one record batch is required")
        })?;
        let schema = first.schema();
        let row_count = batches.iter().map(RecordBatch::num_rows).sum();

        let ctx = Self::session();
        let table = MemTable::try_new(schema.clone(), vec![batches])?;
        ctx.register_table(TABLE_NAME, Arc::new(table))?;

        Ok(Self {
            name: name.into(),
            ctx,
            schema,
            row_count,
        })
    }

    /// One target partition keeps execution single-threaded and deterministic.
    fn session() -> SessionContext {
        SessionContext::new_with_config(SessionConfig::new().with_target_partitions(1))
    }

    /// Returns the display name of the dataset.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the number of records.
    pub fn row_count(&self) -> usize {
        self.row_count
    }

    /// Returns the Arrow schema of the table.
    pub fn schema(&self) -> &SchemaRef {
        &self.schema
    }

    /// Returns the column names in file order.
    pub fn column_names(&self) -> Vec<String> {
        self.schema
            .fields()
            .iter()
            .map(|field| field.name().clone())
            .collect()
    }

    /// Returns true if the column exists.
    pub fn has_column(&self, column: &str) -> bool {
        self.schema.field_with_name(column).is_ok()
    }

    /// Returns the data type of a column.
    pub fn column_type(&self, column: &str) -> Result<&DataType> {
        self.schema
            .field_with_name(column)
            .map(|field| field.data_type())
            .map_err(|_| GuardError::column_not_found(column))
    }

    /// Returns the names of columns that hold numbers.
    ///
    /// Columns with a numeric Arrow type always qualify. A text column
    /// qualifies when it has at least one row and every cell that is not
    /// blank or a missing-value marker parses as a number.
    pub async fn numeric_columns(&self) -> Result<Vec<String>> {
        let mut columns = Vec::new();
        for field in self.schema.fields() {
            let data_type = field.data_type();
            if data_type.is_numeric() {
                columns.push(field.name().clone());
            } else if is_text(data_type) && self.row_count > 0 {
                let identifier = SqlSecurity::escape_identifier(field.name())?;
                let present = self.present_expr(field.name())?;
                let batches = self
                    .query(&format!(
                        "SELECT SUM(CASE WHEN {present} \
                         AND TRY_CAST(TRIM({identifier}) AS DOUBLE) IS NULL \
                         THEN 1 ELSE 0 END) AS unparsed FROM {TABLE_NAME}"
                    ))
                    .await?;
                if scalar_count(&batches, "unparsed")? == 0 {
                    columns.push(field.name().clone());
                }
            }
        }
        Ok(columns)
    }

    /// Runs a query against the session and collects the result.
    #[instrument(skip(self), fields(dataset = %self.name))]
    pub async fn query(&self, sql: &str) -> Result<Vec<RecordBatch>> {
        debug!(sql = %truncate_field(sql, 512), "Executing check query");
        let df = self.ctx.sql(sql).await?;
        Ok(df.collect().await?)
    }

    /// Returns an SQL expression that reads `column` as a DOUBLE.
    ///
    /// Text columns are stripped of thousands separators and currency signs
    /// first; missing-value markers and values that still do not parse
    /// become NULL.
    pub fn numeric_expr(&self, column: &str) -> Result<String> {
        let identifier = SqlSecurity::escape_identifier(column)?;
        let data_type = self.column_type(column)?;
        if data_type.is_numeric() {
            Ok(format!("CAST({identifier} AS DOUBLE)"))
        } else if is_text(data_type) {
            Ok(format!(
                "CASE WHEN TRIM({identifier}) IN ({markers}) THEN NULL \
                 ELSE TRY_CAST(REPLACE(REPLACE(TRIM({identifier}), ',', ''), '$', '') AS DOUBLE) END",
                markers = missing_markers()
            ))
        } else {
            Ok(format!("TRY_CAST({identifier} AS DOUBLE)"))
        }
    }

    /// Returns an SQL boolean expression that is true when `column` holds a value.
    ///
    /// Blank text and missing-value markers such as `N/A` count as missing.
    pub fn present_expr(&self, column: &str) -> Result<String> {
        let identifier = SqlSecurity::escape_identifier(column)?;
        if is_text(self.column_type(column)?) {
            Ok(format!(
                "({identifier} IS NOT NULL AND TRIM({identifier}) NOT IN ('', {markers}))",
                markers = missing_markers()
            ))
        } else {
            Ok(format!("{identifier} IS NOT NULL"))
        }
    }

    /// Reads every value of a column as text, in file order.
    pub async fn text_values(&self, column: &str) -> Result<Vec<Option<String>>> {
        let identifier = SqlSecurity::escape_identifier(column)?;
        let batches = self
            .query(&format!("SELECT {identifier} AS cell FROM {TABLE_NAME}"))
            .await?;

        let mut values = Vec::with_capacity(self.row_count);
        for batch in &batches {
            let strings = column_as_strings(batch, "cell")?;
            values.extend(
                (0..strings.len())
                    .map(|i| (!strings.is_null(i)).then(|| strings.value(i).to_string())),
            );
        }
        Ok(values)
    }
}

/// Cell values that stand for a missing value rather than text.
const MISSING_MARKERS: &[&str] = &[
    "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

fn missing_markers() -> String {
    MISSING_MARKERS
        .iter()
        .map(|marker| format!("'{marker}'"))
        .collect::<Vec<_>>()
        .join(", ")
}

fn is_text(data_type: &DataType) -> bool {
    matches!(
        data_type,
        DataType::Utf8 | DataType::LargeUtf8 | DataType::Utf8View
    )
}

fn column_by_name<'a>(batch: &'a RecordBatch, column: &str) -> Result<&'a ArrayRef> {
    batch
        .column_by_name(column)
        .ok_or_else(|| GuardError::column_not_found(column))
}

/// Casts a result column to `Utf8`, whatever type the query produced.
pub(crate) fn column_as_strings(batch: &RecordBatch, column: &str) -> Result<StringArray> {
    let array = cast(column_by_name(batch, column)?.as_ref(), &DataType::Utf8)?;
    array
        .as_any()
        .downcast_ref::<StringArray>()
        .cloned()
        .ok_or_else(|| GuardError::Internal(format!("Column '{column}' is not castable to text")))
}

/// Casts a result column to `Float64`.
pub(crate) fn column_as_f64(batch: &RecordBatch, column: &str) -> Result<Float64Array> {
    let array = cast(column_by_name(batch, column)?.as_ref(), &DataType::Float64)?;
    array
        .as_any()
        .downcast_ref::<Float64Array>()
        .cloned()
        .ok_or_else(|| GuardError::Internal(format!("Column '{column}' is not numeric")))
}

/// Reads the first-row value of an aggregate column as `f64`.
///
/// Returns `None` when the result is empty or the value is NULL.
pub(crate) fn scalar_f64(batches: &[RecordBatch], column: &str) -> Result<Option<f64>> {
    let Some(batch) = batches.iter().find(|batch| batch.num_rows() > 0) else {
        return Ok(None);
    };
    let values = column_as_f64(batch, column)?;

    if values.is_null(0) {
        Ok(None)
    } else {
        Ok(Some(values.value(0)))
    }
}

/// Reads the first-row value of a counting aggregate. NULL sums count as zero.
pub(crate) fn scalar_count(batches: &[RecordBatch], column: &str) -> Result<usize> {
    Ok(scalar_f64(batches, column)?.map_or(0, |value| value.max(0.0) as usize))
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::{Float64Array, Int64Array, StringArray};
    use arrow::datatypes::{Field, Schema};
    use std::sync::Arc;

    fn sample() -> Dataset {
        let schema = Arc::new(Schema::new(vec![
            Field::new("Household", DataType::Int64, true),
            Field::new("Cost", DataType::Utf8, true),
            Field::new("Per Person", DataType::Float64, true),
        ]));
        let batch = RecordBatch::try_new(
            schema,
            vec![
                Arc::new(Int64Array::from(vec![Some(10), None, Some(-3)])),
                Arc::new(StringArray::from(vec![Some("$1,200"), Some(" "), Some("n/a")])),
                Arc::new(Float64Array::from(vec![Some(1.5), Some(2.5), None])),
            ],
        )
        .unwrap();
        Dataset::from_batches("sample", vec![batch]).unwrap()
    }

    #[tokio::test]
    async fn test_schema_helpers() {
        let dataset = sample();
        assert_eq!(dataset.row_count(), 3);
        assert!(dataset.has_column("Per Person"));
        assert!(!dataset.has_column("per person"));
        assert_eq!(
            dataset.numeric_columns().await.unwrap(),
            vec!["Household", "Per Person"]
        );
        assert!(matches!(
            dataset.column_type("Missing"),
            Err(GuardError::ColumnNotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_numeric_expr_parses_formatted_text() {
        let dataset = sample();
        let expr = dataset.numeric_expr("Cost").unwrap();
        let batches = dataset
            .query(&format!(
                "SELECT SUM({expr}) AS total, COUNT({expr}) AS parsed FROM {TABLE_NAME}"
            ))
            .await
            .unwrap();

        assert_eq!(scalar_f64(&batches, "total").unwrap(), Some(1200.0));
        assert_eq!(scalar_count(&batches, "parsed").unwrap(), 1);
    }

    #[tokio::test]
    async fn test_present_expr_treats_blank_text_and_markers_as_missing() {
        let dataset = sample();
        let present = dataset.present_expr("Cost").unwrap();
        let batches = dataset
            .query(&format!(
                "SELECT SUM(CASE WHEN {present} THEN 1 ELSE 0 END) AS present FROM {TABLE_NAME}"
            ))
            .await
            .unwrap();
        assert_eq!(scalar_count(&batches, "present").unwrap(), 1);
    }

    #[tokio::test]
    async fn test_text_values_preserve_nulls() {
        let dataset = sample();
        let values = dataset.text_values("Household").await.unwrap();
        assert_eq!(
            values,
            vec![Some("10".to_string()), None, Some("-3".to_string())]
        );
    }

    #[tokio::test]
    async fn test_text_columns_with_markers_are_numeric() {
        let schema = Arc::new(Schema::new(vec![
            Field::new("Persons", DataType::Utf8, true),
            Field::new("Island", DataType::Utf8, true),
            Field::new("Sales", DataType::Utf8, true),
        ]));
        let batch = RecordBatch::try_new(
            schema,
            vec![
                Arc::new(StringArray::from(vec![Some(" 12"), Some("N/A"), None])),
                Arc::new(StringArray::from(vec![Some("Maui"), Some("12"), None])),
                Arc::new(StringArray::from(vec![Some("1,250"), Some("980"), None])),
            ],
        )
        .unwrap();
        let dataset = Dataset::from_batches("text", vec![batch]).unwrap();

        assert_eq!(dataset.numeric_columns().await.unwrap(), vec!["Persons"]);
    }

    #[tokio::test]
    async fn test_load_reads_late_stray_values_as_text() {
        let mut file = tempfile::NamedTempFile::with_suffix(".csv").unwrap();
        let mut content = String::from("Date,Household\n");
        for day in 0..1500 {
            let household = if day == 1200 { "N/A".to_string() } else { day.to_string() };
            content.push_str(&format!("2020-01-01,{household}\n"));
        }
        std::io::Write::write_all(&mut file, content.as_bytes()).unwrap();

        let dataset = Dataset::load(file.path(), &CsvOptions::default())
            .await
            .unwrap();
        assert_eq!(dataset.row_count(), 1500);
        assert_eq!(dataset.column_type("Household").unwrap(), &DataType::Utf8);
        assert_eq!(
            dataset.numeric_columns().await.unwrap(),
            vec!["Household"]
        );

        let expr = dataset.numeric_expr("Household").unwrap();
        let batches = dataset
            .query(&format!("SELECT COUNT({expr}) AS parsed FROM {TABLE_NAME}"))
            .await
            .unwrap();
        assert_eq!(scalar_count(&batches, "parsed").unwrap(), 1499);
    }

    #[tokio::test]
    async fn test_load_missing_file_fails() {
        let err = Dataset::load("/no/such/dir/data.csv", &CsvOptions::default())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("No such file"));
    }
}
