//! Masking of sensitive column values.

use crate::core::ResultSet;
use serde_json::Value;

/// Replacement for masked values.
pub const REDACTED: &str = "[REDACTED]";

/// Column name fragments treated as sensitive by default.
pub const DEFAULT_SENSITIVE_FRAGMENTS: &[&str] = &["password", "passwd", "pin", "secret"];

/// Replaces values of sensitive columns before rows leave the executor.
///
/// A column is sensitive when one of its `_`-separated name parts equals a
/// fragment. Fragments of six or more characters also match inside a part,
/// so `passwordhash` is caught while `shipping` is not.
#[derive(Debug, Clone)]
pub struct Redactor {
    fragments: Vec<String>,
}

impl Default for Redactor {
    fn default() -> Self {
        Self::new(DEFAULT_SENSITIVE_FRAGMENTS.iter().copied())
    }
}

impl Redactor {
    /// Creates a redactor for the given name fragments.
    pub fn new<I, S>(fragments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            fragments: fragments
                .into_iter()
                .map(|f| f.as_ref().to_lowercase())
                .filter(|f| !f.is_empty())
                .collect(),
        }
    }

    /// Whether values of this column are masked.
    #[must_use]
    pub fn is_sensitive(&self, column: &str) -> bool {
        let column = column.to_lowercase();
        column
            .split(|c: char| !c.is_alphanumeric())
            .filter(|part| !part.is_empty())
            .any(|part| {
                self.fragments
                    .iter()
                    .any(|f| part == f || (f.len() >= 6 && part.contains(f.as_str())))
            })
    }

    /// Masks sensitive values in place. Returns the number of masked cells.
    pub fn redact(&self, result: &mut ResultSet) -> usize {
        let mut masked = 0;
        for row in &mut result.rows {
            for (column, value) in row.iter_mut() {
                if !value.is_null() && self.is_sensitive(column) {
                    *value = Value::String(REDACTED.to_string());
                    masked += 1;
                }
            }
        }
        masked
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_is_sensitive() {
        let redactor = Redactor::default();
        assert!(redactor.is_sensitive("password"));
        assert!(redactor.is_sensitive("password_hash"));
        assert!(redactor.is_sensitive("hashed_passwordhash"));
        assert!(redactor.is_sensitive("card_pin"));
        assert!(redactor.is_sensitive("API_SECRET"));
        assert!(!redactor.is_sensitive("shipping_address"));
        assert!(!redactor.is_sensitive("full_name"));
    }

    #[test]
    fn test_redact_rows() {
        let mut rs = ResultSet::from_json(json!([
            {"email": "a@bank.in", "password": "hunter2"},
            {"email": "b@bank.in", "password": null}
        ]))
        .unwrap();
        let masked = Redactor::default().redact(&mut rs);
        assert_eq!(masked, 1);
        assert_eq!(rs.rows[0]["password"], json!(REDACTED));
        assert_eq!(rs.rows[0]["email"], json!("a@bank.in"));
        assert!(rs.rows[1]["password"].is_null());
    }

    #[test]
    fn test_custom_fragments() {
        let redactor = Redactor::new(["ssn", ""]);
        assert!(redactor.is_sensitive("customer_ssn"));
        assert!(!redactor.is_sensitive("password"));
    }
}
