//! Core domain models for sqlrag-rs.
//!
//! Schema chunks, query result sets, and tool call records. These are pure
//! data types with no I/O dependencies.

pub mod chunk;
pub mod result_set;
pub mod tool_call;

pub use chunk::Chunk;
pub use result_set::{ResultSet, Row};
pub use tool_call::{ToolCallRecord, ToolKind};
