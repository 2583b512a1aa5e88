//! `PostgreSQL` executor over a lazily connected `sqlx` pool.

use super::{ColumnInfo, Redactor, SqlExecutor, SqlGuard};
use crate::core::{ResultSet, Row};
use crate::error::{DatabaseError, Result};
use async_trait::async_trait;
use serde_json::Value;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::types::Json;
use sqlx::{Column, Executor, PgPool, Statement};
use std::collections::HashSet;

/// Default cap on rows returned by one query.
pub const DEFAULT_MAX_ROWS: usize = 100;

/// Connection settings for the banking database.
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// Server host.
    pub host: String,
    /// Server port.
    pub port: u16,
    /// Login role (`DB_UNAME`).
    pub username: Option<String>,
    /// Password (`DB_PASS`).
    pub password: Option<String>,
    /// Database name.
    pub database: String,
    /// Maximum rows returned per query.
    pub max_rows: usize,
    /// Pool size.
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 5432,
            username: None,
            password: None,
            database: "postgres".to_string(),
            max_rows: DEFAULT_MAX_ROWS,
            max_connections: 4,
        }
    }
}

impl DatabaseConfig {
    fn connect_options(&self) -> PgConnectOptions {
        let mut options = PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .database(&self.database);
        if let Some(username) = &self.username {
            options = options.username(username);
        }
        if let Some(password) = &self.password {
            options = options.password(password);
        }
        options
    }
}

/// Wraps a validated statement so every row decodes as one JSON object.
///
/// Fetches one row past `max_rows` to detect truncation. The newline keeps a
/// trailing `--` comment from swallowing the closing parenthesis.
fn wrap_statement(statement: &str, max_rows: usize) -> String {
    format!(
        "SELECT row_to_json(q) FROM ({statement}\n) AS q LIMIT {}",
        max_rows.saturating_add(1)
    )
}

/// First output column name that occurs twice.
///
/// `row_to_json` would keep both keys and the row map would drop one.
fn duplicate_column<'a>(names: &[&'a str]) -> Option<&'a str> {
    let mut seen = HashSet::with_capacity(names.len());
    names.iter().copied().find(|name| !seen.insert(*name))
}

/// Read-only SQL executor for `PostgreSQL`.
///
/// Every statement passes the [`SqlGuard`], then runs inside a `READ ONLY`
/// transaction that is always rolled back.
pub struct PgExecutor {
    pool: PgPool,
    guard: SqlGuard,
    redactor: Redactor,
    max_rows: usize,
}

impl std::fmt::Debug for PgExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PgExecutor")
            .field("max_rows", &self.max_rows)
            .finish_non_exhaustive()
    }
}

impl PgExecutor {
    /// Creates an executor; no connection is made until the first query.
    ///
    /// # Errors
    ///
    /// Returns an error if the SQL guard cannot be built.
    pub fn connect_lazy(config: &DatabaseConfig) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .connect_lazy_with(config.connect_options());

        tracing::debug!(
            host = %config.host,
            port = config.port,
            database = %config.database,
            "configured postgres pool"
        );

        Ok(Self {
            pool,
            guard: SqlGuard::new()?,
            redactor: Redactor::default(),
            max_rows: config.max_rows,
        })
    }

    /// Replaces the redactor.
    #[must_use]
    pub fn with_redactor(mut self, redactor: Redactor) -> Self {
        self.redactor = redactor;
        self
    }
}

#[async_trait]
impl SqlExecutor for PgExecutor {
    async fn execute(&self, sql: &str) -> Result<ResultSet> {
        let statement = self.guard.validate(sql)?;
        let wrapped = wrap_statement(&statement, self.max_rows);

        let mut tx = self.pool.begin().await?;
        sqlx::query("SET TRANSACTION READ ONLY")
            .execute(&mut *tx)
            .await?;

        let prepared = (&mut *tx).prepare(statement.as_str()).await?;
        let names: Vec<&str> = prepared.columns().iter().map(Column::name).collect();
        if let Some(name) = duplicate_column(&names) {
            tx.rollback().await?;
            return Err(DatabaseError::Query(format!(
                "column \"{name}\" appears more than once in the result; give each column a distinct alias"
            ))
            .into());
        }

        let fetched = sqlx::query_scalar::<_, Json<Value>>(&wrapped)
            .fetch_all(&mut *tx)
            .await?;
        tx.rollback().await?;

        let mut rows = fetched
            .into_iter()
            .map(|Json(value)| match value {
                Value::Object(row) => Ok(row),
                other => Err(DatabaseError::Decode(format!("expected a row object, got {other}"))),
            })
            .collect::<std::result::Result<Vec<Row>, _>>()?;

        let truncated = rows.len() > self.max_rows;
        rows.truncate(self.max_rows);

        let mut result = ResultSet::new(rows).with_truncated(truncated);
        let masked = self.redactor.redact(&mut result);
        if masked > 0 {
            tracing::warn!(cells = masked, "redacted sensitive values");
        }
        tracing::debug!(rows = result.len(), truncated, "query executed");
        Ok(result)
    }

    async fn list_tables(&self) -> Result<Vec<String>> {
        let tables = sqlx::query_scalar::<_, String>(
            "SELECT table_name::text FROM information_schema.tables \
             WHERE table_schema = 'public' ORDER BY table_name",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(tables)
    }

    async fn describe_table(&self, table: &str) -> Result<Vec<ColumnInfo>> {
        let columns = sqlx::query_as::<_, (String, String, String)>(
            "SELECT column_name::text, data_type::text, is_nullable::text \
             FROM information_schema.columns \
             WHERE table_schema = 'public' AND table_name = $1 \
             ORDER BY ordinal_position",
        )
        .bind(table)
        .fetch_all(&self.pool)
        .await?;

        Ok(columns
            .into_iter()
            .map(|(name, data_type, is_nullable)| ColumnInfo {
                name,
                data_type,
                nullable: is_nullable.eq_ignore_ascii_case("yes"),
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_statement() {
        assert_eq!(
            wrap_statement("SELECT id FROM loans", 100),
            "SELECT row_to_json(q) FROM (SELECT id FROM loans\n) AS q LIMIT 101"
        );
        assert!(wrap_statement("SELECT 1", usize::MAX).ends_with(&usize::MAX.to_string()));
    }

    #[test]
    fn test_duplicate_column() {
        assert_eq!(duplicate_column(&["id", "full_name", "id"]), Some("id"));
        assert_eq!(duplicate_column(&["customer_id", "loan_id"]), None);
        assert_eq!(duplicate_column(&["Id", "id"]), None);
        assert_eq!(duplicate_column(&[]), None);
    }

    #[test]
    fn test_default_config() {
        let config = DatabaseConfig::default();
        assert_eq!(config.host, "localhost");
        assert_eq!(config.port, 5432);
        assert_eq!(config.database, "postgres");
        assert_eq!(config.max_rows, DEFAULT_MAX_ROWS);
    }

    #[tokio::test]
    async fn test_guard_runs_before_connecting() {
        let config = DatabaseConfig {
            port: 1,
            ..DatabaseConfig::default()
        };
        let executor = PgExecutor::connect_lazy(&config).unwrap();
        let err = executor.execute("DELETE FROM customers").await.unwrap_err();
        assert!(err.to_string().contains("query rejected"));
    }
}
