//! The check trait implemented by every validation routine.

use super::{Dataset, Finding};
use crate::prelude::*;
use async_trait::async_trait;
use std::fmt::Debug;

/// A validation check that can be evaluated against a loaded dataset.
///
/// Checks are stateless and return their findings in the order they should
/// appear in the report. Returning `Err` is reserved for unexpected failures;
/// the run converts it into a `Warning` so sibling checks still execute.
///
/// # Examples
///
/// ```rust
/// use snap_guard::core::{Check, Dataset, Finding};
/// use async_trait::async_trait;
///
/// #[derive(Debug)]
/// struct RowCountCheck;
///
/// #[async_trait]
/// impl Check for RowCountCheck {
///     async fn evaluate(&self, dataset: &Dataset) -> snap_guard::prelude::Result<Vec<Finding>> {
///         Ok(vec![Finding::info(self.name(), format!("{} rows", dataset.row_count()))])
///     }
///
///     fn name(&self) -> &str {
///         "row_count"
///     }
/// }
/// ```
#[async_trait]
pub trait Check: Debug + Send + Sync {
    /// Evaluates the check and returns its findings.
    async fn evaluate(&self, dataset: &Dataset) -> Result<Vec<Finding>>;

    /// Returns the name of the check.
    fn name(&self) -> &str;
}

/// A boxed check for dynamic dispatch.
pub type BoxedCheck = Box<dyn Check>;
