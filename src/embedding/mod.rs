//! Embeddings for schema retrieval.
//!
//! Chunks and questions are embedded into the same vector space so the index
//! can rank schema sections by cosine similarity.
//!
//! # Feature Flags
//!
//! - `fastembed-embeddings` (default): all-MiniLM-L6-v2 through `FastEmbed`
//! - otherwise: [`FallbackEmbedder`], lexical hashing with no model download

mod fallback;

#[cfg(feature = "fastembed-embeddings")]
mod fastembed_impl;

pub use fallback::FallbackEmbedder;

#[cfg(feature = "fastembed-embeddings")]
pub use fastembed_impl::{FastEmbedEmbedder, MODEL_NAME};

use crate::Result;
use std::sync::Arc;

/// Vector width shared by both embedders.
pub const DEFAULT_DIMENSIONS: usize = 384;

/// Turns text into fixed-width vectors.
///
/// # Examples
///
/// ```
/// use sqlrag_rs::embedding::{Embedder, FallbackEmbedder, DEFAULT_DIMENSIONS};
///
/// let embedder = FallbackEmbedder::new(DEFAULT_DIMENSIONS);
/// let embedding = embedder.embed("customers table").unwrap();
/// assert_eq!(embedding.len(), DEFAULT_DIMENSIONS);
/// ```
pub trait Embedder: Send + Sync {
    /// Width of every vector this embedder returns.
    fn dimensions(&self) -> usize;

    /// Embeds one text.
    ///
    /// # Errors
    ///
    /// Returns an error if the text cannot be embedded.
    fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Embeds several texts, preserving order.
    ///
    /// # Errors
    ///
    /// Returns the first embedding failure.
    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        texts.iter().map(|t| self.embed(t)).collect()
    }
}

/// Returns the embedder selected at compile time, ready to share.
///
/// The `FastEmbed` model is loaded on first use, not here.
///
/// # Errors
///
/// Currently infallible; kept fallible for embedders that validate eagerly.
pub fn create_embedder() -> Result<Arc<dyn Embedder>> {
    #[cfg(feature = "fastembed-embeddings")]
    let embedder: Arc<dyn Embedder> = Arc::new(FastEmbedEmbedder::new());
    #[cfg(not(feature = "fastembed-embeddings"))]
    let embedder: Arc<dyn Embedder> = Arc::new(FallbackEmbedder::new(DEFAULT_DIMENSIONS));
    Ok(embedder)
}

/// Cosine similarity of two vectors.
///
/// Mismatched lengths and zero vectors score 0.0.
#[must_use]
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }
    let (dot, norm_a, norm_b) = a
        .iter()
        .zip(b)
        .fold((0.0f32, 0.0f32, 0.0f32), |(dot, na, nb), (x, y)| {
            (x.mul_add(*y, dot), x.mul_add(*x, na), y.mul_add(*y, nb))
        });
    let denom = norm_a.sqrt() * norm_b.sqrt();
    if denom == 0.0 { 0.0 } else { dot / denom }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_similarity_bounds() {
        assert!((cosine_similarity(&[0.6, 0.8], &[0.6, 0.8]) - 1.0).abs() < 1e-6);
        assert!((cosine_similarity(&[1.0, 0.0], &[-1.0, 0.0]) + 1.0).abs() < 1e-6);
        assert!(cosine_similarity(&[1.0, 0.0], &[0.0, 3.0]).abs() < 1e-6);
    }

    #[test]
    fn test_similarity_degenerate_inputs() {
        assert!(cosine_similarity(&[1.0], &[1.0, 0.0]).abs() < f32::EPSILON);
        assert!(cosine_similarity(&[0.0, 0.0], &[1.0, 2.0]).abs() < f32::EPSILON);
        assert!(cosine_similarity(&[], &[]).abs() < f32::EPSILON);
    }

    #[test]
    fn test_create_embedder_width() {
        let embedder = create_embedder().unwrap();
        assert_eq!(embedder.dimensions(), DEFAULT_DIMENSIONS);
    }

    struct Width2;

    impl Embedder for Width2 {
        fn dimensions(&self) -> usize {
            2
        }

        fn embed(&self, text: &str) -> Result<Vec<f32>> {
            #[allow(clippy::cast_precision_loss)]
            Ok(vec![text.len() as f32, 1.0])
        }
    }

    #[test]
    fn test_default_batch_keeps_order() {
        let vectors = Width2.embed_batch(&["loans", "id"]).unwrap();
        assert_eq!(vectors, vec![vec![5.0, 1.0], vec![2.0, 1.0]]);
        assert!(Width2.embed_batch(&[]).unwrap().is_empty());
    }
}
