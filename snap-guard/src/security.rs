//! Escaping utilities for values that are embedded in generated SQL.
//!
//! Published SNAP spreadsheets use free-form headers such as
//! `Calc: SNAP Total PA and Non-PA People`, so column names cannot be
//! restricted to plain identifiers. Instead every name is validated for
//! control characters and length, then quoted.

use crate::error::{GuardError, Result};

/// Maximum accepted length for a column identifier.
const MAX_IDENTIFIER_LENGTH: usize = 256;

/// SQL identifier escaping utilities.
pub struct SqlSecurity;

impl SqlSecurity {
    /// Validates and quotes a SQL identifier (table or column name).
    ///
    /// # Examples
    /// ```rust
    /// use snap_guard::security::SqlSecurity;
    ///
    /// assert_eq!(SqlSecurity::escape_identifier("Per Household").unwrap(), "\"Per Household\"");
    /// assert_eq!(SqlSecurity::escape_identifier("a\"b").unwrap(), "\"a\"\"b\"");
    /// assert!(SqlSecurity::escape_identifier("").is_err());
    /// ```
    pub fn escape_identifier(identifier: &str) -> Result<String> {
        Self::validate_identifier(identifier)?;

        let escaped = identifier.replace('"', "\"\"");
        Ok(format!("\"{escaped}\""))
    }

    /// Validates a SQL identifier without escaping it.
    pub fn validate_identifier(identifier: &str) -> Result<()> {
        if identifier.trim().is_empty() {
            return Err(GuardError::SecurityError(
                "SQL identifier cannot be empty or whitespace-only".to_string(),
            ));
        }

        if identifier.len() > MAX_IDENTIFIER_LENGTH {
            return Err(GuardError::SecurityError(format!(
                "SQL identifier too long (max {MAX_IDENTIFIER_LENGTH} characters)"
            )));
        }

        if identifier.chars().any(char::is_control) {
            return Err(GuardError::SecurityError(
                "SQL identifier cannot contain control characters".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_identifier_allows_spreadsheet_headers() {
        let escaped =
            SqlSecurity::escape_identifier("Calc: SNAP Total PA and Non-PA People").unwrap();
        assert_eq!(escaped, "\"Calc: SNAP Total PA and Non-PA People\"");
    }

    #[test]
    fn test_escape_identifier_doubles_quotes() {
        let escaped = SqlSecurity::escape_identifier("x\"; DROP TABLE data; --").unwrap();
        assert_eq!(escaped, "\"x\"\"; DROP TABLE data; --\"");
    }

    #[test]
    fn test_rejects_invalid_identifiers() {
        assert!(SqlSecurity::escape_identifier("   ").is_err());
        assert!(SqlSecurity::escape_identifier("bad\0name").is_err());
        assert!(SqlSecurity::escape_identifier("line\nbreak").is_err());
        assert!(SqlSecurity::escape_identifier(&"x".repeat(MAX_IDENTIFIER_LENGTH + 1)).is_err());
    }
}
