//! Error types for sqlrag-rs operations.
//!
//! This module provides the error hierarchy using `thiserror` for indexing,
//! embedding, database access, model calls, the agent loop, and CLI commands.

use thiserror::Error;

/// Result type alias for sqlrag-rs operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type.
#[derive(Error, Debug)]
pub enum Error {
    /// Chunking-related errors (document splitting).
    #[error("chunking error: {0}")]
    Chunking(#[from] ChunkingError),

    /// I/O errors (file operations).
    #[error("I/O error: {0}")]
    Io(#[from] IoError),

    /// Embedding generation errors.
    #[error("embedding error: {0}")]
    Embedding(#[from] EmbeddingError),

    /// Database errors (connection, query, guard rejection).
    #[error("database error: {0}")]
    Database(#[from] DatabaseError),

    /// Language model errors.
    #[error("llm error: {0}")]
    Llm(#[from] LlmError),

    /// Agent loop errors.
    #[error("agent error: {0}")]
    Agent(#[from] AgentError),

    /// CLI command errors.
    #[error("command error: {0}")]
    Command(#[from] CommandError),

    /// Invalid state errors.
    #[error("invalid state: {message}")]
    InvalidState {
        /// Description of the invalid state.
        message: String,
    },

    /// Configuration errors.
    #[error("configuration error: {message}")]
    Config {
        /// Description of the configuration error.
        message: String,
    },
}

/// Chunking-specific errors for document splitting.
#[derive(Error, Debug)]
pub enum ChunkingError {
    /// Invalid chunker configuration.
    #[error("invalid chunk configuration: {reason}")]
    InvalidConfig {
        /// Reason the configuration is invalid.
        reason: String,
    },

    /// Overlap exceeds the maximum section size.
    #[error("overlap {overlap} must be less than section size {size}")]
    OverlapTooLarge {
        /// Overlap size.
        overlap: usize,
        /// Maximum section size.
        size: usize,
    },
}

/// I/O-specific errors for file operations.
#[derive(Error, Debug)]
pub enum IoError {
    /// File not found.
    #[error("file not found: {path}")]
    FileNotFound {
        /// Path to the file that was not found.
        path: String,
    },

    /// Failed to read file.
    #[error("failed to read file: {path}: {reason}")]
    ReadFailed {
        /// Path to the file.
        path: String,
        /// Reason for failure.
        reason: String,
    },

    /// Failed to write file.
    #[error("failed to write file: {path}: {reason}")]
    WriteFailed {
        /// Path to the file.
        path: String,
        /// Reason for failure.
        reason: String,
    },

    /// Invalid glob pattern for document discovery.
    #[error("invalid glob pattern: {pattern}: {reason}")]
    InvalidPattern {
        /// The offending pattern.
        pattern: String,
        /// Reason for failure.
        reason: String,
    },

    /// Generic I/O error wrapper.
    #[error("I/O error: {0}")]
    Generic(String),
}

/// Embedding-specific errors.
#[derive(Error, Debug)]
pub enum EmbeddingError {
    /// Model could not be loaded.
    #[error("failed to load embedding model: {0}")]
    ModelLoad(String),

    /// Embedding call failed.
    #[error("embedding failed: {0}")]
    Failed(String),

    /// Empty input text.
    #[error("cannot embed empty text")]
    EmptyInput,

    /// Query and index vectors disagree on dimensions.
    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Index dimensions.
        expected: usize,
        /// Produced dimensions.
        actual: usize,
    },
}

/// Database-specific errors.
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Connection could not be established.
    #[error("connection failed: {0}")]
    Connection(String),

    /// Query execution failed.
    #[error("{0}")]
    Query(String),

    /// Statement rejected by the SQL guard before execution.
    #[error("query rejected: {reason}")]
    Rejected {
        /// Why the statement was rejected.
        reason: String,
    },

    /// Result row could not be decoded.
    #[error("failed to decode row: {0}")]
    Decode(String),
}

/// Language model errors.
#[derive(Error, Debug)]
pub enum LlmError {
    /// API key was not configured.
    #[error("API key missing for {provider}")]
    ApiKeyMissing {
        /// Provider name.
        provider: String,
    },

    /// The completion request failed.
    #[error("request failed: {0}")]
    Request(String),

    /// The response did not contain a usable choice.
    #[error("empty response from model")]
    EmptyResponse,

    /// Request could not be built.
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

/// Agent loop errors.
#[derive(Error, Debug)]
pub enum AgentError {
    /// The model kept calling tools past the step limit.
    #[error("no final answer after {max_steps} steps")]
    StepLimit {
        /// Configured step limit.
        max_steps: usize,
    },

    /// Tool arguments could not be parsed.
    #[error("invalid arguments for tool {tool}: {reason}")]
    InvalidArguments {
        /// Tool name.
        tool: String,
        /// Parse failure.
        reason: String,
    },

    /// The model asked for a tool that is not registered.
    #[error("unknown tool: {0}")]
    UnknownTool(String),
}

/// CLI command-specific errors.
#[derive(Error, Debug)]
pub enum CommandError {
    /// Invalid argument provided.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Command execution failed.
    #[error("command execution failed: {0}")]
    ExecutionFailed(String),

    /// Output format error.
    #[error("output format error: {0}")]
    OutputFormat(String),
}

// Implement From traits for library errors

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::Io(IoError::Generic(err.to_string()))
    }
}

impl From<sqlx::Error> for DatabaseError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                Self::Connection(err.to_string())
            }
            sqlx::Error::ColumnDecode { .. } | sqlx::Error::Decode(_) => {
                Self::Decode(err.to_string())
            }
            _ => Self::Query(err.to_string()),
        }
    }
}

impl From<sqlx::Error> for Error {
    fn from(err: sqlx::Error) -> Self {
        Self::Database(err.into())
    }
}

impl From<async_openai::error::OpenAIError> for LlmError {
    fn from(err: async_openai::error::OpenAIError) -> Self {
        match err {
            async_openai::error::OpenAIError::InvalidArgument(msg) => Self::InvalidRequest(msg),
            other => Self::Request(other.to_string()),
        }
    }
}

impl From<async_openai::error::OpenAIError> for Error {
    fn from(err: async_openai::error::OpenAIError) -> Self {
        Self::Llm(err.into())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Command(CommandError::OutputFormat(err.to_string()))
    }
}

impl From<regex::Error> for Error {
    fn from(err: regex::Error) -> Self {
        Self::Config {
            message: format!("invalid pattern: {err}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::InvalidState {
            message: "test error".to_string(),
        };
        assert_eq!(err.to_string(), "invalid state: test error");
    }

    #[test]
    fn test_database_error_display() {
        let err = DatabaseError::Query("relation \"loans\" does not exist".to_string());
        assert_eq!(err.to_string(), "relation \"loans\" does not exist");

        let err = DatabaseError::Rejected {
            reason: "only SELECT statements are allowed".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "query rejected: only SELECT statements are allowed"
        );
    }

    #[test]
    fn test_chunking_error_display() {
        let err = ChunkingError::OverlapTooLarge {
            overlap: 100,
            size: 50,
        };
        assert_eq!(
            err.to_string(),
            "overlap 100 must be less than section size 50"
        );
    }

    #[test]
    fn test_agent_error_display() {
        let err = AgentError::StepLimit { max_steps: 8 };
        assert_eq!(err.to_string(), "no final answer after 8 steps");

        let err = AgentError::UnknownTool("drop_tables".to_string());
        assert!(err.to_string().contains("drop_tables"));
    }

    #[test]
    fn test_llm_error_display() {
        let err = LlmError::ApiKeyMissing {
            provider: "groq".to_string(),
        };
        assert_eq!(err.to_string(), "API key missing for groq");
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_error_from_sqlx_pool_timeout() {
        let err: DatabaseError = sqlx::Error::PoolTimedOut.into();
        assert!(matches!(err, DatabaseError::Connection(_)));
    }

    #[test]
    fn test_error_from_sqlx_row_not_found() {
        let err: Error = sqlx::Error::RowNotFound.into();
        assert!(matches!(err, Error::Database(DatabaseError::Query(_))));
    }

    #[test]
    fn test_error_from_openai_invalid_argument() {
        let err: LlmError =
            async_openai::error::OpenAIError::InvalidArgument("model".to_string()).into();
        assert!(matches!(err, LlmError::InvalidRequest(_)));
    }

    #[test]
    fn test_error_from_nested() {
        let err: Error = EmbeddingError::EmptyInput.into();
        assert_eq!(err.to_string(), "embedding error: cannot embed empty text");

        let err: Error = CommandError::InvalidArgument("--top-k".to_string()).into();
        assert!(matches!(err, Error::Command(_)));
    }

    #[test]
    fn test_error_config() {
        let err = Error::Config {
            message: "bad config".to_string(),
        };
        assert_eq!(err.to_string(), "configuration error: bad config");
    }
}
