//! Read-only SQL execution.
//!
//! The agent runs model-written SQL through [`SqlExecutor`]. [`PgExecutor`]
//! is the `PostgreSQL` implementation; statements are screened by
//! [`SqlGuard`] and sensitive columns are masked by [`Redactor`].

mod guard;
mod postgres;
mod redact;

pub use guard::SqlGuard;
pub use postgres::{DEFAULT_MAX_ROWS, DatabaseConfig, PgExecutor};
pub use redact::{DEFAULT_SENSITIVE_FRAGMENTS, REDACTED, Redactor};

use crate::core::ResultSet;
use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// One column of a table description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnInfo {
    /// Column name.
    pub name: String,
    /// SQL data type as reported by `information_schema`.
    pub data_type: String,
    /// Whether the column accepts NULL.
    pub nullable: bool,
}

/// Executes read-only SQL and introspects the schema.
#[async_trait]
pub trait SqlExecutor: Send + Sync {
    /// Runs a query and returns its rows.
    ///
    /// # Errors
    ///
    /// Returns an error if the statement is rejected, the connection fails,
    /// or the database reports an error.
    async fn execute(&self, sql: &str) -> Result<ResultSet>;

    /// Lists tables in the public schema.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog query fails.
    async fn list_tables(&self) -> Result<Vec<String>>;

    /// Describes the columns of a table, in ordinal order.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog query fails.
    async fn describe_table(&self, table: &str) -> Result<Vec<ColumnInfo>>;
}
