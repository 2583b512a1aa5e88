//! Document indexer: files in, similarity index out.

use crate::chunking::Chunker;
use crate::core::Chunk;
use crate::embedding::Embedder;
use crate::error::Result;
use crate::index::SchemaIndex;
use crate::io::{discover_documents, read_file};
use std::path::Path;
use std::sync::Arc;

/// Reads schema documents, chunks them, and builds a [`SchemaIndex`].
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
/// use sqlrag_rs::chunking::DelimiterChunker;
/// use sqlrag_rs::embedding::{FallbackEmbedder, DEFAULT_DIMENSIONS};
/// use sqlrag_rs::index::DocumentIndexer;
///
/// let indexer = DocumentIndexer::new(DelimiterChunker::new());
/// let embedder = Arc::new(FallbackEmbedder::new(DEFAULT_DIMENSIONS));
/// let index = indexer.index_glob("docs/*.txt", embedder).unwrap();
/// println!("{} chunks", index.len());
/// ```
pub struct DocumentIndexer<C: Chunker> {
    chunker: C,
}

impl<C: Chunker> DocumentIndexer<C> {
    /// Creates an indexer using the given chunker.
    pub const fn new(chunker: C) -> Self {
        Self { chunker }
    }

    /// Returns the chunker.
    pub const fn chunker(&self) -> &C {
        &self.chunker
    }

    /// Reads and chunks each file, tagging chunks with the file path.
    ///
    /// # Errors
    ///
    /// Returns an error if a file cannot be read or chunked.
    pub fn collect_chunks<P: AsRef<Path>>(&self, paths: &[P]) -> Result<Vec<Chunk>> {
        let mut chunks = Vec::new();
        for path in paths {
            let path = path.as_ref();
            let source = path.to_string_lossy();
            let text = read_file(path)?;
            let file_chunks = self.chunker.chunk(&source, &text)?;
            tracing::debug!(source = %source, chunks = file_chunks.len(), "chunked document");
            chunks.extend(file_chunks);
        }
        Ok(chunks)
    }

    /// Indexes the given files.
    ///
    /// # Errors
    ///
    /// Returns an error if reading, chunking, or embedding fails.
    pub fn index_files<P: AsRef<Path>>(
        &self,
        paths: &[P],
        embedder: Arc<dyn Embedder>,
    ) -> Result<SchemaIndex> {
        let chunks = self.collect_chunks(paths)?;
        let index = SchemaIndex::build(chunks, embedder)?;
        tracing::info!(files = paths.len(), chunks = index.len(), "indexed schema documents");
        Ok(index)
    }

    /// Indexes every file matching a glob pattern such as `docs/*.txt`.
    ///
    /// A pattern matching no files yields an empty index.
    ///
    /// # Errors
    ///
    /// Returns an error for malformed patterns or if indexing fails.
    pub fn index_glob(&self, pattern: &str, embedder: Arc<dyn Embedder>) -> Result<SchemaIndex> {
        let paths = discover_documents(pattern)?;
        if paths.is_empty() {
            tracing::warn!(pattern, "no schema documents matched");
        }
        self.index_files(&paths, embedder)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunking::DelimiterChunker;
    use crate::embedding::{DEFAULT_DIMENSIONS, FallbackEmbedder};
    use tempfile::TempDir;

    fn embedder() -> Arc<dyn Embedder> {
        Arc::new(FallbackEmbedder::new(DEFAULT_DIMENSIONS))
    }

    #[test]
    fn test_collect_chunks_tags_source() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("schema.txt");
        std::fs::write(&path, "### customers\nid\n### loans\nid").unwrap();

        let indexer = DocumentIndexer::new(DelimiterChunker::new());
        let chunks = indexer.collect_chunks(&[&path]).unwrap();
        assert_eq!(chunks.len(), 2);
        let source = path.to_string_lossy();
        assert!(chunks.iter().all(|c| c.source == source));
    }

    #[test]
    fn test_index_glob() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("a.txt"), "### customers\nid").unwrap();
        std::fs::write(temp.path().join("b.txt"), "### loans\nid\n### deposits\nid").unwrap();

        let indexer = DocumentIndexer::new(DelimiterChunker::new());
        let pattern = format!("{}/*.txt", temp.path().display());
        let index = indexer.index_glob(&pattern, embedder()).unwrap();
        assert_eq!(index.len(), 3);
        assert_eq!(index.source_counts().len(), 2);
    }

    #[test]
    fn test_index_glob_no_matches() {
        let temp = TempDir::new().unwrap();
        let indexer = DocumentIndexer::new(DelimiterChunker::new());
        let pattern = format!("{}/*.txt", temp.path().display());
        let index = indexer.index_glob(&pattern, embedder()).unwrap();
        assert!(index.is_empty());
    }

    #[test]
    fn test_missing_file_errors() {
        let indexer = DocumentIndexer::new(DelimiterChunker::new());
        assert!(indexer.collect_chunks(&["/no/such/schema.txt"]).is_err());
    }
}
