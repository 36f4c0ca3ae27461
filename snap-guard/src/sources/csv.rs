//! CSV file source implementation.

use super::DataSource;
use crate::prelude::*;
use arrow::csv::reader::Format;
use arrow::datatypes::{DataType, Field, Schema};
use async_trait::async_trait;
use datafusion::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument};

/// Options for configuring CSV file reading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CsvOptions {
    /// Whether the CSV file has a header row
    pub has_header: bool,
    /// Field delimiter (default: ',')
    pub delimiter: u8,
    /// Quote character (default: '"')
    pub quote: u8,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self {
            has_header: true,
            delimiter: b',',
            quote: b'"',
        }
    }
}

impl CsvOptions {
    /// Sets the field delimiter.
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }
}

/// A single delimited file registered as a DataFusion table.
///
/// # Examples
///
/// ```rust
/// use snap_guard::sources::{CsvOptions, CsvSource, DataSource};
///
/// let source = CsvSource::with_options("Data/retailers.tsv", CsvOptions::default().with_delimiter(b'\t'));
/// assert_eq!(source.description(), "CSV file: Data/retailers.tsv");
/// ```
#[derive(Debug, Clone)]
pub struct CsvSource {
    path: PathBuf,
    options: CsvOptions,
}

impl CsvSource {
    /// Creates a new CSV source with default options.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self::with_options(path, CsvOptions::default())
    }

    /// Creates a new CSV source with custom options.
    pub fn with_options(path: impl Into<PathBuf>, options: CsvOptions) -> Self {
        Self {
            path: path.into(),
            options,
        }
    }

    /// Returns the path of the file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the extension DataFusion should use when listing the file.
    ///
    /// DataFusion filters listed files by extension, so a `.tsv` or
    /// extensionless file must advertise its own suffix.
    fn file_extension(&self) -> String {
        self.path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| format!(".{ext}"))
            .unwrap_or_default()
    }

    /// Reads the header row and types every column as nullable text.
    ///
    /// Values are coerced by the checks that read them, so a stray value
    /// anywhere in the file never fails a scan.
    fn text_schema(&self) -> Result<Schema> {
        let file = File::open(&self.path)?;
        let (header, _) = Format::default()
            .with_header(self.options.has_header)
            .with_delimiter(self.options.delimiter)
            .with_quote(self.options.quote)
            .infer_schema(file, Some(0))?;

        if header.fields().is_empty() {
            return Err(GuardError::data_source(
                "csv",
                format!("No columns to parse from {}", self.path.display()),
            ));
        }

        Ok(Schema::new(
            header
                .fields()
                .iter()
                .map(|field| Field::new(field.name(), DataType::Utf8, true))
                .collect::<Vec<_>>(),
        ))
    }
}

#[async_trait]
impl DataSource for CsvSource {
    #[instrument(skip(self, ctx), fields(
        table.name = %table_name,
        source.type = "csv",
        csv.delimiter = %self.options.delimiter as char,
        csv.has_header = self.options.has_header
    ))]
    async fn register(&self, ctx: &SessionContext, table_name: &str) -> Result<()> {
        let path = self.path.to_str().ok_or_else(|| {
            GuardError::Configuration(format!(
                "Path contains invalid UTF-8: {}",
                self.path.display()
            ))
        })?;

        info!(
            table.name = %table_name,
            source.path = %path,
            "Registering CSV data source"
        );

        // A missing file otherwise surfaces as an opaque object-store listing error.
        if !self.path.is_file() {
            return Err(GuardError::data_source_with_source(
                "csv",
                format!("No such file: {path}"),
                Box::new(std::io::Error::from(std::io::ErrorKind::NotFound)),
            ));
        }

        let schema = self.text_schema()?;
        let extension = self.file_extension();
        let csv_options = CsvReadOptions::new()
            .has_header(self.options.has_header)
            .delimiter(self.options.delimiter)
            .quote(self.options.quote)
            .schema(&schema)
            .file_extension(&extension);

        ctx.register_csv(table_name, path, csv_options).await?;

        debug!(
            table.name = %table_name,
            source.type = "csv",
            "CSV data source registered successfully"
        );

        Ok(())
    }

    fn description(&self) -> String {
        format!("CSV file: {}", self.path.display())
    }
}
