//! Early rejection of statements that are not read-only queries.
//!
//! The guard runs before anything reaches the database. It is lexical only;
//! the executor still wraps every statement in a read-only transaction.

use crate::error::{DatabaseError, Result};
use regex::Regex;

/// Keywords that write data or change the schema.
const FORBIDDEN_KEYWORDS: &[&str] = &[
    "insert", "update", "delete", "drop", "alter", "truncate", "create", "grant", "revoke",
    "copy", "merge", "call", "into",
];

/// Lexical check that a statement is a single `SELECT` or `WITH` query.
///
/// Keywords are matched as whole words, so columns like `deleted_at` and
/// `updated_at` pass. Comments and quoted text are ignored: standard and
/// `E'...'` strings, quoted identifiers, and `$$` or `$tag$` dollar quotes.
///
/// # Examples
///
/// ```
/// use sqlrag_rs::database::SqlGuard;
///
/// let guard = SqlGuard::new().unwrap();
/// assert!(guard.validate("SELECT * FROM customers WHERE deleted_at IS NULL;").is_ok());
/// assert!(guard.validate("DROP TABLE customers").is_err());
/// ```
#[derive(Debug, Clone)]
pub struct SqlGuard {
    quoted: Regex,
    leading: Regex,
    forbidden: Regex,
}

impl SqlGuard {
    /// Creates a guard.
    ///
    /// # Errors
    ///
    /// Returns an error if a pattern fails to compile.
    pub fn new() -> Result<Self> {
        Ok(Self {
            quoted: Regex::new(
                r#"(?s)--[^\n]*|/\*.*?\*/|\b[eE]'(?:[^'\\]|\\.|'')*'|'(?:[^']|'')*'|"(?:[^"]|"")*"|\$(?:[A-Za-z_][A-Za-z0-9_]*)?\$"#,
            )?,
            leading: Regex::new(r"(?i)^\s*(select|with)\b")?,
            forbidden: Regex::new(&format!(r"(?i)\b({})\b", FORBIDDEN_KEYWORDS.join("|")))?,
        })
    }

    /// Validates a statement and returns it trimmed, without a trailing `;`.
    ///
    /// # Errors
    ///
    /// Returns [`DatabaseError::Rejected`] if the statement is empty, holds
    /// more than one statement, does not start with `SELECT` or `WITH`, or
    /// contains a write or DDL keyword.
    pub fn validate(&self, sql: &str) -> Result<String> {
        let statement = sql.trim();
        let statement = statement.strip_suffix(';').unwrap_or(statement).trim_end();
        if statement.is_empty() {
            return Err(reject("empty statement"));
        }

        let bare = self.strip_quoted(statement);

        if bare.contains(';') {
            return Err(reject("multiple statements are not allowed"));
        }
        if !self.leading.is_match(&bare) {
            return Err(reject("only SELECT or WITH queries are allowed"));
        }
        if let Some(found) = self.forbidden.find(&bare) {
            return Err(reject(&format!(
                "keyword {} is not allowed",
                found.as_str().to_uppercase()
            )));
        }

        Ok(statement.to_string())
    }

    /// Blanks comments and replaces quoted text with `''`.
    ///
    /// A dollar-quoted body runs to the next occurrence of its opening tag,
    /// or to the end of the statement if unterminated.
    fn strip_quoted(&self, sql: &str) -> String {
        let mut out = String::with_capacity(sql.len());
        let mut pos = 0;
        while let Some(found) = self.quoted.find_at(sql, pos) {
            out.push_str(&sql[pos..found.start()]);
            let token = found.as_str();
            pos = if token.starts_with('$') {
                sql[found.end()..]
                    .find(token)
                    .map_or(sql.len(), |offset| found.end() + offset + token.len())
            } else {
                found.end()
            };
            out.push_str(if token.starts_with("--") || token.starts_with("/*") {
                " "
            } else {
                "''"
            });
        }
        out.push_str(&sql[pos..]);
        out
    }
}

fn reject(reason: &str) -> crate::error::Error {
    DatabaseError::Rejected {
        reason: reason.to_string(),
    }
    .into()
}
