//! Finding severity levels.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The severity of a validation finding.
///
/// Severities are ordered: `Issue > Warning > Info`.
///
/// - **Issue**: blocks meaningful validation, such as an unreadable file or a
///   missing required column.
/// - **Warning**: a data-quality concern that does not block the run, such as
///   negative counts, duplicate dates or stale data.
/// - **Info**: neutral confirmations and statistics.
///
/// # Examples
///
/// ```rust
/// use snap_guard::core::Severity;
///
/// assert!(Severity::Issue > Severity::Warning);
/// assert!(Severity::Warning > Severity::Info);
/// assert_eq!(Severity::Warning.to_string(), "warning");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Diagnostic or confirmation
    Info = 0,
    /// Non-blocking data-quality concern
    Warning = 1,
    /// Blocking problem
    Issue = 2,
}

impl Severity {
    /// Every severity, most severe first. This is the order reports render in.
    pub const RENDER_ORDER: [Severity; 3] = [Severity::Issue, Severity::Warning, Severity::Info];

    /// Returns the string representation of the severity.
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Issue => "issue",
        }
    }

    /// Returns the marker printed in front of findings of this severity.
    pub fn symbol(&self) -> &'static str {
        match self {
            Severity::Info => "✓",
            Severity::Warning => "⚠",
            Severity::Issue => "✗",
        }
    }

    /// Checks if this severity is at least as severe as another.
    pub fn is_at_least(&self, other: Severity) -> bool {
        *self >= other
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Issue > Severity::Warning);
        assert!(Severity::Warning > Severity::Info);
        assert!(Severity::Issue.is_at_least(Severity::Info));
        assert!(!Severity::Info.is_at_least(Severity::Warning));
    }

    #[test]
    fn test_render_order_is_descending() {
        let mut sorted = Severity::RENDER_ORDER;
        sorted.sort_by(|a, b| b.cmp(a));
        assert_eq!(sorted, Severity::RENDER_ORDER);
    }

    #[test]
    fn test_severity_serde() {
        let json = serde_json::to_string(&Severity::Issue).unwrap();
        assert_eq!(json, "\"issue\"");

        let level: Severity = serde_json::from_str("\"warning\"").unwrap();
        assert_eq!(level, Severity::Warning);
    }
}
