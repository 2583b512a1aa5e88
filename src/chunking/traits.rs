//! Chunker trait definition.
//!
//! Defines the interface for document splitting strategies used by the
//! indexer.

use crate::core::Chunk;
use crate::error::Result;

/// Trait for splitting a document into indexable chunks.
///
/// Implementations must be `Send + Sync` so an indexer can be shared across
/// tasks. Output must be deterministic for the same input.
///
/// # Examples
///
/// ```
/// use sqlrag_rs::chunking::{Chunker, DelimiterChunker};
///
/// let chunker = DelimiterChunker::new();
/// let chunks = chunker.chunk("docs/schema.txt", "### customers\nid\n### loans\nid").unwrap();
/// assert_eq!(chunks.len(), 2);
/// ```
pub trait Chunker: Send + Sync {
    /// Splits `text` into chunks tagged with `source`.
    ///
    /// # Errors
    ///
    /// Returns an error if the chunker configuration is invalid.
    fn chunk(&self, source: &str, text: &str) -> Result<Vec<Chunk>>;

    /// Returns the name of the chunking strategy.
    fn name(&self) -> &'static str;

    /// Returns a description of the chunking strategy.
    fn description(&self) -> &'static str {
        "No description available"
    }

    /// Validates configuration before chunking.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot produce chunks.
    fn validate(&self) -> Result<()> {
        Ok(())
    }
}
