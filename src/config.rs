//! Resolved application configuration.
//!
//! The CLI collects flags and environment variables; this module groups them
//! per component.

use crate::agent::AgentConfig;
use crate::database::DatabaseConfig;
use crate::index::{DEFAULT_DOCS_GLOB, DEFAULT_TOP_K};
use crate::llm::LlmConfig;

/// Where schema documents come from.
#[derive(Debug, Clone)]
pub struct IndexConfig {
    /// Glob matching the schema documents.
    pub docs_glob: String,
    /// Chunks returned per lookup.
    pub top_k: usize,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            docs_glob: DEFAULT_DOCS_GLOB.to_string(),
            top_k: DEFAULT_TOP_K,
        }
    }
}

/// Configuration for every component.
#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    /// Database connection.
    pub database: DatabaseConfig,
    /// Chat model.
    pub llm: LlmConfig,
    /// Document index.
    pub index: IndexConfig,
    /// Agent loop.
    pub agent: AgentConfig,
}

impl AppConfig {
    /// Names of credentials that are not set.
    ///
    /// Missing credentials are not an error here; the database or model
    /// call that needs them fails later.
    #[must_use]
    pub fn missing_credentials(&self) -> Vec<&'static str> {
        let blank = |value: Option<&String>| value.is_none_or(|v| v.trim().is_empty());
        let mut missing = Vec::new();
        if blank(self.database.username.as_ref()) {
            missing.push("DB_UNAME");
        }
        if blank(self.database.password.as_ref()) {
            missing.push("DB_PASS");
        }
        if blank(self.llm.api_key.as_ref()) {
            missing.push("GROQ_API_KEY");
        }
        missing
    }

    /// Logs a warning for each missing credential.
    pub fn warn_missing_credentials(&self) {
        for name in self.missing_credentials() {
            tracing::warn!(variable = name, "credential not set");
        }
    }
}
