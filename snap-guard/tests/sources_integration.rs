//! Integration tests for data sources and dataset loading.

use datafusion::prelude::*;
use snap_guard::checks::NumericCheck;
use snap_guard::core::{Check, Dataset, Severity};
use snap_guard::prelude::GuardError;
use snap_guard::sources::{CsvOptions, CsvSource, DataSource};
use std::fs::File;
use std::io::Write;
use tempfile::TempDir;

/// Creates a directory with the same stores written as CSV, TSV and an
/// extensionless export.
fn create_test_data() -> TempDir {
    let dir = TempDir::new().unwrap();

    let mut csv = File::create(dir.path().join("stores.csv")).unwrap();
    writeln!(csv, "Store Name,Store Type,Sales").unwrap();
    writeln!(csv, "\"Foodland, Kailua\",Supermarket,\"1,250\"").unwrap();
    writeln!(csv, "Times,Supermarket,\"$980\"").unwrap();
    writeln!(csv, "7-Eleven,Convenience Store,-3").unwrap();
    csv.flush().unwrap();

    let mut tsv = File::create(dir.path().join("stores.tsv")).unwrap();
    writeln!(tsv, "Store Name\tStore Type\tSales").unwrap();
    writeln!(tsv, "Foodland, Kailua\tSupermarket\t1250").unwrap();
    writeln!(tsv, "Times\tSupermarket\t980").unwrap();
    tsv.flush().unwrap();

    let mut export = File::create(dir.path().join("stores_export")).unwrap();
    writeln!(export, "Store Name,Sales").unwrap();
    writeln!(export, "Times,980").unwrap();
    export.flush().unwrap();

    dir
}

#[tokio::test]
async fn test_csv_source_registers_table() {
    let dir = create_test_data();
    let source = CsvSource::new(dir.path().join("stores.csv"));
    let ctx = SessionContext::new();

    source.register(&ctx, "stores").await.unwrap();

    let df = ctx.sql("SELECT COUNT(*) FROM stores").await.unwrap();
    let batches = df.collect().await.unwrap();
    assert_eq!(batches[0].num_rows(), 1);
    assert!(source.description().ends_with("stores.csv"));
}

#[tokio::test]
async fn test_tsv_and_extensionless_files_load() {
    let dir = create_test_data();

    let tsv = Dataset::load(
        dir.path().join("stores.tsv"),
        &CsvOptions::default().with_delimiter(b'\t'),
    )
    .await
    .unwrap();
    assert_eq!(tsv.row_count(), 2);
    assert_eq!(tsv.column_names(), vec!["Store Name", "Store Type", "Sales"]);

    let export = Dataset::load(dir.path().join("stores_export"), &CsvOptions::default())
        .await
        .unwrap();
    assert_eq!(export.row_count(), 1);
    assert_eq!(export.name(), "stores_export");
}

#[tokio::test]
async fn test_formatted_numbers_are_profiled() {
    let dir = create_test_data();
    let dataset = Dataset::load(dir.path().join("stores.csv"), &CsvOptions::default())
        .await
        .unwrap();

    let findings = NumericCheck::columns(["Sales"], 0.1)
        .evaluate(&dataset)
        .await
        .unwrap();

    let messages: Vec<_> = findings.iter().map(|f| f.message.as_str()).collect();
    assert_eq!(
        messages,
        vec!["Sales: 1 negative values", "Sales: min=-3, max=1,250, mean=742"]
    );
    assert_eq!(findings[0].severity, Severity::Warning);
}

#[tokio::test]
async fn test_missing_file_is_data_source_error() {
    let dir = TempDir::new().unwrap();
    let source = CsvSource::new(dir.path().join("absent.csv"));
    let ctx = SessionContext::new();

    let err = source.register(&ctx, "data").await.unwrap_err();
    assert!(matches!(err, GuardError::DataSource { .. }));
    assert!(err.to_string().contains("No such file"));
}
