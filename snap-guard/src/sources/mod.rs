//! Data source connectors.
//!
//! Published SNAP datasets arrive as delimited text files. A [`DataSource`]
//! registers one of them as a table in a DataFusion [`SessionContext`] so the
//! checks can query it.

use crate::prelude::*;
use async_trait::async_trait;
use datafusion::prelude::SessionContext;
use std::fmt::Debug;

mod csv;

pub use csv::{CsvOptions, CsvSource};

/// A data source that can be registered with a DataFusion context.
///
/// # Examples
///
/// ```rust,no_run
/// use snap_guard::sources::{CsvSource, DataSource};
/// use datafusion::prelude::SessionContext;
///
/// # async fn example() -> snap_guard::prelude::Result<()> {
/// let source = CsvSource::new("Data/Statewide Monthly SNAP FY 89-22.csv");
/// let ctx = SessionContext::new();
/// source.register(&ctx, "data").await?;
/// # Ok(())
/// # }
/// ```
#[async_trait]
pub trait DataSource: Debug + Send + Sync {
    /// Registers this data source with the given session context.
    async fn register(&self, ctx: &SessionContext, table_name: &str) -> Result<()>;

    /// Returns a human-readable description of this data source.
    fn description(&self) -> String;
}
