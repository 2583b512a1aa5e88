//! CLI layer for sqlrag-rs.
//!
//! Provides the command-line interface using clap, with commands for asking
//! questions, inspecting the schema index, and checking SQL.

pub mod commands;
pub mod output;
pub mod parser;

pub use commands::execute;
pub use output::OutputFormat;
pub use parser::{Cli, Commands};
