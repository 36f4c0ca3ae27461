//! Prelude for commonly used types and traits in snap-guard.

pub use crate::config::{Thresholds, ValidatorConfig};
pub use crate::core::{
    Check, DataValidator, Dataset, Finding, ReportStatus, Severity, ValidationReport,
    ValidationRun,
};
pub use crate::error::{ErrorContext, GuardError, Result};
pub use crate::formatters::{FormatterConfig, ReportFormatter};
pub use crate::profiles::{DatasetProfile, ProfileCatalog};
