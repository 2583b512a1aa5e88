//! Command-line argument parsing.
//!
//! Defines the CLI structure using clap derive macros. Connection settings
//! fall back to the environment variables the deployment already uses.

use crate::agent::{AgentConfig, load_system_prompt};
use crate::config::{AppConfig, IndexConfig};
use crate::database::DatabaseConfig;
use crate::llm::{DEFAULT_BASE_URL, DEFAULT_MODEL, LlmConfig};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// sqlrag-rs: ask a banking database questions in plain language.
///
/// Retrieves schema documentation, lets a language model write read-only
/// SQL, runs it, and formats the result.
#[derive(Parser, Debug)]
#[command(name = "sqlrag-rs")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose (debug) logging on stderr.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format (text, json).
    #[arg(long, default_value = "text", global = true)]
    pub format: String,

    /// Database settings.
    #[command(flatten)]
    pub database: DatabaseArgs,

    /// Model settings.
    #[command(flatten)]
    pub llm: LlmArgs,

    /// Retrieval and agent settings.
    #[command(flatten)]
    pub agent: AgentArgs,

    /// The subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// `PostgreSQL` connection flags.
#[derive(Args, Debug, Clone)]
pub struct DatabaseArgs {
    /// Database user.
    #[arg(long = "db-user", env = "DB_UNAME", global = true, hide_env_values = true)]
    pub db_user: Option<String>,

    /// Database password.
    #[arg(long = "db-pass", env = "DB_PASS", global = true, hide_env_values = true)]
    pub db_pass: Option<String>,

    /// Database host.
    #[arg(long = "db-host", env = "DB_HOST", default_value = "localhost", global = true)]
    pub db_host: String,

    /// Database port.
    #[arg(long = "db-port", env = "DB_PORT", default_value = "5432", global = true)]
    pub db_port: u16,

    /// Database name.
    #[arg(long = "db-name", env = "DB_NAME", default_value = "postgres", global = true)]
    pub db_name: String,

    /// Maximum rows returned per query.
    #[arg(long, env = "SQLRAG_MAX_ROWS", default_value = "100", global = true)]
    pub max_rows: usize,
}

/// Chat model flags.
#[derive(Args, Debug, Clone)]
pub struct LlmArgs {
    /// API key for the OpenAI-compatible endpoint.
    #[arg(long, env = "GROQ_API_KEY", global = true, hide_env_values = true)]
    pub api_key: Option<String>,

    /// Base URL of the OpenAI-compatible endpoint.
    #[arg(long, env = "LLM_BASE_URL", default_value = DEFAULT_BASE_URL, global = true)]
    pub base_url: String,

    /// Chat model name.
    #[arg(long, env = "LLM_MODEL", default_value = DEFAULT_MODEL, global = true)]
    pub model: String,
}

/// Retrieval and agent loop flags.
#[derive(Args, Debug, Clone)]
pub struct AgentArgs {
    /// Glob matching the schema documents.
    #[arg(long, env = "SQLRAG_DOCS", default_value = "docs/*.txt", global = true)]
    pub docs: String,

    /// Chunks returned per schema lookup.
    #[arg(long, env = "SQLRAG_TOP_K", default_value = "4", global = true)]
    pub top_k: usize,

    /// Model turns allowed per question.
    #[arg(long, env = "SQLRAG_MAX_STEPS", default_value = "8", global = true)]
    pub max_steps: usize,

    /// System prompt file overriding the built-in prompt.
    #[arg(long, env = "SQLRAG_PROMPT_FILE", global = true)]
    pub prompt_file: Option<PathBuf>,

    /// Do not offer the `list_tables` and `get_table_schema` tools.
    #[arg(long, global = true)]
    pub no_schema_tools: bool,

    /// Return the model's own final text instead of rendering SQL results.
    #[arg(long, global = true)]
    pub raw_answer: bool,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Ask one question and print the answer.
    Ask {
        /// The question, in plain language.
        question: String,

        /// Show every tool call and the SQL that ran.
        #[arg(long)]
        trace: bool,
    },

    /// Interactive question loop on stdin.
    ///
    /// Type `exit` or `quit`, or send EOF, to leave.
    Chat,

    /// Build the schema index and report chunk counts per document.
    Index,

    /// Search the schema index without calling the model.
    Search {
        /// Search query.
        query: String,

        /// Number of chunks to return (defaults to --top-k).
        #[arg(short = 'k', long)]
        k: Option<usize>,
    },

    /// Check whether a statement would pass the read-only SQL guard.
    #[command(name = "check-sql")]
    CheckSql {
        /// SQL statement.
        sql: String,
    },

    /// List tables in the public schema.
    Tables,

    /// Describe a table's columns.
    Describe {
        /// Table name.
        table: String,
    },

    /// Write the default system prompt to a file for editing.
    #[command(name = "init-prompt")]
    InitPrompt {
        /// Target directory (defaults to ~/.config/sqlrag-rs).
        #[arg(long)]
        dir: Option<PathBuf>,
    },
}

impl Cli {
    /// Resolves flags and environment into component configuration.
    #[must_use]
    pub fn app_config(&self) -> AppConfig {
        AppConfig {
            database: DatabaseConfig {
                host: self.database.db_host.clone(),
                port: self.database.db_port,
                username: self.database.db_user.clone(),
                password: self.database.db_pass.clone(),
                database: self.database.db_name.clone(),
                max_rows: self.database.max_rows,
                ..DatabaseConfig::default()
            },
            llm: LlmConfig {
                api_key: self.llm.api_key.clone(),
                base_url: self.llm.base_url.clone(),
                model: self.llm.model.clone(),
                ..LlmConfig::default()
            },
            index: IndexConfig {
                docs_glob: self.agent.docs.clone(),
                top_k: self.agent.top_k,
            },
            agent: AgentConfig {
                top_k: self.agent.top_k,
                max_steps: self.agent.max_steps,
                schema_tools: !self.agent.no_schema_tools,
                render_results: !self.agent.raw_answer,
                system_prompt: load_system_prompt(self.agent.prompt_file.as_deref()),
            },
        }
    }
}
