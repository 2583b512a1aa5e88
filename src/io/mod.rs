//! I/O utilities for sqlrag-rs.
//!
//! Document discovery and reading, plus UTF-8 boundary helpers.

pub mod reader;
pub mod unicode;

pub use reader::{discover_documents, read_file, write_file};
pub use unicode::{byte_offset_for_chars, find_char_boundary};
