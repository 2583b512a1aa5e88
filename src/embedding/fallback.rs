//! Hash-based fallback embedder.
//!
//! Produces deterministic lexical embeddings when the ONNX model is not
//! compiled in. Similar vocabulary lands close together; meaning does not.

use crate::embedding::Embedder;
use crate::error::Result;
use rayon::prelude::*;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Weight of a whole token.
const TOKEN_WEIGHT: f32 = 1.0;
/// Weight of an identifier part (`deleted` in `deleted_at`).
const PART_WEIGHT: f32 = 0.6;
/// Weight of an adjacent token pair.
const BIGRAM_WEIGHT: f32 = 0.4;

/// Hash-based fallback embedder.
///
/// Tokens are lowercased words and SQL identifiers. Identifiers containing
/// underscores also contribute their parts, so `deleted_at` and `deleted`
/// share a dimension. Adjacent token pairs add a weaker signal. The vector
/// is L2-normalised.
///
/// # Examples
///
/// ```
/// use sqlrag_rs::embedding::{Embedder, FallbackEmbedder, DEFAULT_DIMENSIONS};
///
/// let embedder = FallbackEmbedder::new(DEFAULT_DIMENSIONS);
/// let a = embedder.embed("loan principal").unwrap();
/// let b = embedder.embed("loan principal").unwrap();
/// assert_eq!(a, b);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct FallbackEmbedder {
    dimensions: usize,
}

impl FallbackEmbedder {
    /// Creates a new fallback embedder with the specified dimensions.
    #[must_use]
    pub const fn new(dimensions: usize) -> Self {
        Self { dimensions }
    }

    fn hash(s: &str) -> u64 {
        let mut hasher = DefaultHasher::new();
        s.hash(&mut hasher);
        hasher.finish()
    }

    #[allow(clippy::cast_possible_truncation)]
    fn add(&self, embedding: &mut [f32], feature: &str, weight: f32) {
        let hash = Self::hash(feature);
        let idx = (hash as usize) % self.dimensions;
        let sign = if (hash >> 32) & 1 == 0 { 1.0 } else { -1.0 };
        embedding[idx] += sign * weight;
    }

    fn generate(&self, text: &str) -> Vec<f32> {
        let mut embedding = vec![0.0f32; self.dimensions];
        if self.dimensions == 0 {
            return embedding;
        }

        let tokens = tokenize(text);
        for token in &tokens {
            self.add(&mut embedding, token, TOKEN_WEIGHT);
            if token.contains('_') {
                for part in token.split('_').filter(|p| !p.is_empty()) {
                    self.add(&mut embedding, part, PART_WEIGHT);
                }
            }
        }
        for pair in tokens.windows(2) {
            self.add(&mut embedding, &format!("{} {}", pair[0], pair[1]), BIGRAM_WEIGHT);
        }

        let magnitude: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
        if magnitude > 0.0 {
            for val in &mut embedding {
                *val /= magnitude;
            }
        }
        embedding
    }
}

/// Lowercased alphanumeric tokens; underscores stay inside identifiers.
fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .map(|t| t.trim_matches('_'))
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
        .collect()
}

impl Embedder for FallbackEmbedder {
    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        Ok(self.generate(text))
    }

    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.par_iter().map(|text| self.generate(text)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::{DEFAULT_DIMENSIONS, cosine_similarity};

    #[test]
    fn test_tokenize_keeps_identifiers() {
        assert_eq!(
            tokenize("WHERE c.deleted_at IS NULL;"),
            vec!["where", "c", "deleted_at", "is", "null"]
        );
    }

    #[test]
    fn test_normalized() {
        let embedder = FallbackEmbedder::new(DEFAULT_DIMENSIONS);
        let emb = embedder.embed("total deposits per branch").unwrap();
        let magnitude: f32 = emb.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((magnitude - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_identifier_parts_share_signal() {
        let embedder = FallbackEmbedder::new(DEFAULT_DIMENSIONS);
        let column = embedder.embed("deleted_at").unwrap();
        let related = embedder.embed("deleted").unwrap();
        let unrelated = embedder.embed("interest").unwrap();
        assert!(cosine_similarity(&column, &related) > cosine_similarity(&column, &unrelated));
    }

    #[test]
    fn test_schema_section_retrieval_signal() {
        let embedder = FallbackEmbedder::new(DEFAULT_DIMENSIONS);
        let loans = embedder
            .embed("loans table: loan_id, customer_id, principal, disbursed_at, status")
            .unwrap();
        let branches = embedder
            .embed("branches table: branch_id, name, city, opened_on")
            .unwrap();
        let query = embedder.embed("loans disbursed principal status").unwrap();
        assert!(cosine_similarity(&query, &loans) > cosine_similarity(&query, &branches));
    }

    #[test]
    fn test_batch_matches_single() {
        let embedder = FallbackEmbedder::new(64);
        let batch = embedder.embed_batch(&["a b", "c d"]).unwrap();
        assert_eq!(batch[0], embedder.embed("a b").unwrap());
        assert_eq!(batch[1], embedder.embed("c d").unwrap());
    }

    #[test]
    fn test_empty_text_is_zero_vector() {
        let embedder = FallbackEmbedder::new(DEFAULT_DIMENSIONS);
        let emb = embedder.embed("").unwrap();
        assert_eq!(emb.len(), DEFAULT_DIMENSIONS);
        assert!(emb.iter().all(|&x| x == 0.0));
    }
}
