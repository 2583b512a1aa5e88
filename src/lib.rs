//! # sqlrag-rs
//!
//! Retrieval-augmented natural-language-to-SQL assistant for a `PostgreSQL`
//! banking database.
//!
//! A question flows through three parts:
//!
//! - **Document indexer**: schema and business-rule documents are split on
//!   `###`, embedded, and held in an in-memory similarity index.
//! - **Agent**: a chat model with tool calling looks up schema context,
//!   writes a read-only query, runs it, and may ask the user to clarify.
//! - **Result formatter**: rows become a fixed "no records" message, a
//!   one-sentence answer, or a Markdown table.
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use sqlrag_rs::agent::{AgentConfig, SqlAgent};
//! use sqlrag_rs::chunking::DelimiterChunker;
//! use sqlrag_rs::database::{DatabaseConfig, PgExecutor};
//! use sqlrag_rs::embedding::{DEFAULT_DIMENSIONS, FallbackEmbedder};
//! use sqlrag_rs::index::DocumentIndexer;
//! use sqlrag_rs::llm::{LlmConfig, OpenAiClient};
//!
//! # async fn run() -> sqlrag_rs::Result<()> {
//! let embedder = Arc::new(FallbackEmbedder::new(DEFAULT_DIMENSIONS));
//! let index = DocumentIndexer::new(DelimiterChunker::new()).index_glob("docs/*.txt", embedder)?;
//! let llm = Arc::new(OpenAiClient::new(&LlmConfig {
//!     api_key: std::env::var("GROQ_API_KEY").ok(),
//!     ..LlmConfig::default()
//! })?);
//! let executor = Arc::new(PgExecutor::connect_lazy(&DatabaseConfig::default())?);
//!
//! let agent = SqlAgent::new(llm, Arc::new(index), executor, AgentConfig::default());
//! let answer = agent.invoke("How many customers are there?").await;
//! # let _ = answer;
//! # Ok(())
//! # }
//! ```

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod agent;
pub mod chunking;
pub mod cli;
pub mod config;
pub mod core;
pub mod database;
pub mod embedding;
pub mod error;
pub mod format;
pub mod index;
pub mod io;
pub mod llm;

// Re-export commonly used types at crate root
pub use error::{Error, Result};

// Re-export core domain types
pub use core::{Chunk, ResultSet, Row, ToolCallRecord, ToolKind};

// Re-export chunking types
pub use chunking::{Chunker, DelimiterChunker, default_chunker};

// Re-export embedding types
#[cfg(feature = "fastembed-embeddings")]
pub use embedding::FastEmbedEmbedder;
pub use embedding::{
    DEFAULT_DIMENSIONS, Embedder, FallbackEmbedder, cosine_similarity, create_embedder,
};

// Re-export index types
pub use index::{DEFAULT_TOP_K, DocumentIndexer, SchemaIndex, ScoredChunk};

// Re-export database types
pub use database::{ColumnInfo, DatabaseConfig, PgExecutor, SqlExecutor, SqlGuard};

// Re-export model client types
pub use llm::{ChatMessage, LlmClient, LlmResponse, OpenAiClient, ToolCall, ToolDefinition};

// Re-export agent and formatter types
pub use agent::{AgentConfig, AgentOutcome, AnswerKind, SqlAgent};
pub use format::{NO_RECORDS_MESSAGE, ResultFormatter, ResultShape, classify};

// Re-export CLI types
pub use cli::{Cli, Commands, OutputFormat};
pub use config::AppConfig;
