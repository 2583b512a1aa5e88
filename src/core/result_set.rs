//! Query result sets.
//!
//! A result set is the ordered list of rows produced by one SQL execution.
//! Each row maps column names to JSON values, keeping the column order of
//! the `SELECT` list.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A single result row: column name to value, in select-list order.
pub type Row = Map<String, Value>;

/// Rows returned by one SQL execution.
///
/// All rows share the column set of the first row.
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use sqlrag_rs::core::ResultSet;
///
/// let rs = ResultSet::from_json(json!([{"count": 100}])).unwrap();
/// assert_eq!(rs.scalar(), Some(&json!(100)));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultSet {
    /// Result rows.
    pub rows: Vec<Row>,

    /// Whether the row cap cut the result short.
    #[serde(default)]
    pub truncated: bool,
}

impl ResultSet {
    /// Creates a result set from rows.
    #[must_use]
    pub const fn new(rows: Vec<Row>) -> Self {
        Self {
            rows,
            truncated: false,
        }
    }

    /// Builds a result set from a JSON array of objects.
    ///
    /// Returns `None` if the value is not an array of objects.
    #[must_use]
    pub fn from_json(value: Value) -> Option<Self> {
        let Value::Array(items) = value else {
            return None;
        };
        items
            .into_iter()
            .map(|item| match item {
                Value::Object(row) => Some(row),
                _ => None,
            })
            .collect::<Option<Vec<_>>>()
            .map(Self::new)
    }

    /// Marks the result set as truncated.
    #[must_use]
    pub const fn with_truncated(mut self, truncated: bool) -> Self {
        self.truncated = truncated;
        self
    }

    /// Column names, taken from the first row.
    #[must_use]
    pub fn columns(&self) -> Vec<&str> {
        self.rows
            .first()
            .map(|row| row.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }

    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether there are no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The single value of a one-row, one-column result.
    #[must_use]
    pub fn scalar(&self) -> Option<&Value> {
        match self.rows.as_slice() {
            [row] if row.len() == 1 => row.values().next(),
            _ => None,
        }
    }

    /// Serializes the rows as a JSON array string.
    #[must_use]
    pub fn to_json_string(&self) -> String {
        serde_json::to_string(&self.rows).unwrap_or_else(|_| "[]".to_string())
    }
}
