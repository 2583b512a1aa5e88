//! Retrieval-augmented SQL agent.
//!
//! The model gets a fixed system prompt and a small set of tools: schema
//! lookup over the [`SchemaIndex`](crate::index::SchemaIndex), read-only SQL
//! execution, and a clarification request. [`SqlAgent`] drives the
//! tool-calling loop until the model answers.

pub mod prompt;
mod sql_agent;
pub mod tools;

pub use prompt::{SYSTEM_PROMPT, load_system_prompt, write_default_prompt};
pub use sql_agent::{
    AgentConfig, AgentOutcome, AnswerKind, DEFAULT_MAX_STEPS, ERROR_PREFIX, SqlAgent,
};
pub use tools::{CLARIFICATION_MARKER, SQL_ERROR_PREFIX, ToolBox, ToolOutput, tool_definitions};
