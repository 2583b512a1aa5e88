//! In-memory similarity index over schema chunks.

use crate::core::Chunk;
use crate::embedding::{Embedder, cosine_similarity};
use crate::error::{EmbeddingError, Result};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;

/// A retrieved chunk with its similarity score.
#[derive(Debug, Clone, Serialize)]
pub struct ScoredChunk {
    /// The matching chunk.
    pub chunk: Chunk,
    /// Cosine similarity to the query (higher is better).
    pub score: f32,
}

/// Chunks and their embeddings, searchable by nearest neighbour.
///
/// Built once; rebuilding replaces the whole index.
pub struct SchemaIndex {
    chunks: Vec<Chunk>,
    vectors: Vec<Vec<f32>>,
    embedder: Arc<dyn Embedder>,
}

impl std::fmt::Debug for SchemaIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SchemaIndex")
            .field("chunks", &self.chunks.len())
            .field("dimensions", &self.embedder.dimensions())
            .finish_non_exhaustive()
    }
}

impl SchemaIndex {
    /// Embeds all chunks and builds the index.
    ///
    /// # Errors
    ///
    /// Returns an error if embedding fails or produces vectors of the wrong
    /// size.
    pub fn build(chunks: Vec<Chunk>, embedder: Arc<dyn Embedder>) -> Result<Self> {
        let texts: Vec<&str> = chunks.iter().map(|c| c.content.as_str()).collect();
        let vectors = embedder.embed_batch(&texts)?;

        let expected = embedder.dimensions();
        if let Some(bad) = vectors.iter().find(|v| v.len() != expected) {
            return Err(EmbeddingError::DimensionMismatch {
                expected,
                actual: bad.len(),
            }
            .into());
        }

        tracing::debug!(chunks = chunks.len(), dimensions = expected, "built schema index");
        Ok(Self {
            chunks,
            vectors,
            embedder,
        })
    }

    /// Number of indexed chunks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    /// Whether the index holds no chunks.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// All indexed chunks in insertion order.
    #[must_use]
    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    /// Chunk counts per source file.
    #[must_use]
    pub fn source_counts(&self) -> BTreeMap<&str, usize> {
        let mut counts = BTreeMap::new();
        for chunk in &self.chunks {
            *counts.entry(chunk.source.as_str()).or_insert(0) += 1;
        }
        counts
    }

    /// Returns the `k` chunks nearest to `query`, best first.
    ///
    /// Ties keep insertion order. A blank query or `k == 0` returns nothing.
    ///
    /// # Errors
    ///
    /// Returns an error if the query cannot be embedded.
    pub fn search(&self, query: &str, k: usize) -> Result<Vec<ScoredChunk>> {
        if k == 0 || self.chunks.is_empty() || query.trim().is_empty() {
            return Ok(Vec::new());
        }

        let query_vec = self.embedder.embed(query)?;
        if query_vec.len() != self.embedder.dimensions() {
            return Err(EmbeddingError::DimensionMismatch {
                expected: self.embedder.dimensions(),
                actual: query_vec.len(),
            }
            .into());
        }

        let mut scored: Vec<(usize, f32)> = self
            .vectors
            .iter()
            .enumerate()
            .map(|(i, v)| (i, cosine_similarity(&query_vec, v)))
            .collect();
        scored.sort_by(|a, b| b.1.total_cmp(&a.1));
        scored.truncate(k);

        Ok(scored
            .into_iter()
            .map(|(i, score)| ScoredChunk {
                chunk: self.chunks[i].clone(),
                score,
            })
            .collect())
    }

    /// Concatenates the top-`k` chunk contents, separated by blank lines.
    ///
    /// # Errors
    ///
    /// Returns an error if the query cannot be embedded.
    pub fn context_for(&self, query: &str, k: usize) -> Result<String> {
        let hits = self.search(query, k)?;
        Ok(hits
            .iter()
            .map(|hit| hit.chunk.content.as_str())
            .collect::<Vec<_>>()
            .join("\n\n"))
    }
}
