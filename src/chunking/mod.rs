//! Chunking strategies for sqlrag-rs.
//!
//! Schema and business-rule documents are split into sections on a literal
//! delimiter before indexing. The [`Chunker`] trait keeps the strategy
//! pluggable.

pub mod delimiter;
pub mod traits;

pub use delimiter::DelimiterChunker;
pub use traits::Chunker;

/// Default section delimiter used in the schema documents.
pub const DEFAULT_DELIMITER: &str = "###";

/// Default maximum section size in characters.
pub const DEFAULT_SECTION_SIZE: usize = 1000;

/// Default overlap in characters when a section has to be windowed.
pub const DEFAULT_OVERLAP: usize = 200;

/// Creates the default chunker.
#[must_use]
pub fn default_chunker() -> DelimiterChunker {
    DelimiterChunker::new()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_chunker() {
        let chunker = default_chunker();
        assert_eq!(chunker.name(), "delimiter");
        assert_eq!(chunker.delimiter(), DEFAULT_DELIMITER);
    }
}
