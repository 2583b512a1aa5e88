//! Schema chunk representation.
//!
//! Chunks are delimited fragments of schema and business-rule documents.
//! Each chunk keeps the file it came from so retrieved context can be traced
//! back to its source.

use serde::{Deserialize, Serialize};
use std::ops::Range;

/// A fragment of a source document indexed for similarity search.
///
/// # Examples
///
/// ```
/// use sqlrag_rs::core::Chunk;
///
/// let chunk = Chunk::new("docs/schema.txt", "customers\nid uuid".to_string(), 0..17, 0);
/// assert_eq!(chunk.source, "docs/schema.txt");
/// assert_eq!(chunk.title.as_deref(), Some("customers"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    /// Path of the file this chunk was cut from.
    pub source: String,

    /// Chunk content, trimmed and never empty.
    pub content: String,

    /// Byte range in the original document.
    pub byte_range: Range<usize>,

    /// Sequential index within the source (0-based).
    pub index: usize,

    /// First non-empty line of the section, usually a table name.
    pub title: Option<String>,
}

impl Chunk {
    /// Creates a new chunk, deriving its title from the first non-empty line.
    #[must_use]
    pub fn new(source: &str, content: String, byte_range: Range<usize>, index: usize) -> Self {
        let title = content
            .lines()
            .map(str::trim)
            .find(|line| !line.is_empty())
            .map(String::from);

        Self {
            source: source.to_string(),
            content,
            byte_range,
            index,
            title,
        }
    }

    /// Returns the size of the chunk in bytes.
    #[must_use]
    pub fn size(&self) -> usize {
        self.content.len()
    }

    /// Checks if the chunk is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// Returns a preview of the chunk content (first N characters).
    #[must_use]
    pub fn preview(&self, max_chars: usize) -> &str {
        match self.content.char_indices().nth(max_chars) {
            Some((end, _)) => &self.content[..end],
            None => &self.content,
        }
    }
}
