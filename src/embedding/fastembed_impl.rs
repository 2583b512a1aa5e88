//! `FastEmbed`-based semantic embedder.
//!
//! Runs sentence-transformers all-MiniLM-L6-v2 locally through fastembed-rs.
//! Only available when the `fastembed-embeddings` feature is enabled.

use crate::embedding::{DEFAULT_DIMENSIONS, Embedder};
use crate::error::{EmbeddingError, Result};
use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::{Mutex, OnceLock};

/// Model identifier, matching the sentence-transformers hub name.
pub const MODEL_NAME: &str = "sentence-transformers/all-MiniLM-L6-v2";

/// `FastEmbed` embedder using all-MiniLM-L6-v2.
///
/// The ONNX model is downloaded and loaded on the first embed call, so
/// constructing the embedder is cheap.
pub struct FastEmbedEmbedder {
    model: OnceLock<Mutex<TextEmbedding>>,
}

impl FastEmbedEmbedder {
    /// Creates a new embedder without loading the model.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            model: OnceLock::new(),
        }
    }

    /// Returns the model name.
    #[must_use]
    pub const fn model_name(&self) -> &'static str {
        MODEL_NAME
    }

    fn model(&self) -> Result<&Mutex<TextEmbedding>> {
        if let Some(model) = self.model.get() {
            return Ok(model);
        }

        tracing::info!(model = MODEL_NAME, "loading embedding model");
        let options =
            InitOptions::new(EmbeddingModel::AllMiniLML6V2).with_show_download_progress(false);
        let model = TextEmbedding::try_new(options)
            .map_err(|e| EmbeddingError::ModelLoad(e.to_string()))?;

        // Another caller may have won the race; either instance is fine.
        let _ = self.model.set(Mutex::new(model));
        self.model
            .get()
            .ok_or_else(|| EmbeddingError::ModelLoad("model initialization raced".to_string()).into())
    }

    fn run(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        let model = self.model()?;
        let mut model = model
            .lock()
            .map_err(|e| EmbeddingError::Failed(format!("model lock poisoned: {e}")))?;

        // ONNX runtime can panic on malformed inputs.
        let result = catch_unwind(AssertUnwindSafe(|| model.embed(texts, None)));

        let embeddings = result
            .map_err(|panic_info| {
                let msg = panic_info
                    .downcast_ref::<&str>()
                    .map(|s| (*s).to_string())
                    .or_else(|| panic_info.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "unknown panic".to_string());
                EmbeddingError::Failed(format!("ONNX runtime panic: {msg}"))
            })?
            .map_err(|e| EmbeddingError::Failed(e.to_string()))?;

        Ok(embeddings)
    }
}

impl Default for FastEmbedEmbedder {
    fn default() -> Self {
        Self::new()
    }
}

impl Embedder for FastEmbedEmbedder {
    fn dimensions(&self) -> usize {
        DEFAULT_DIMENSIONS
    }

    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        if text.is_empty() {
            return Err(EmbeddingError::EmptyInput.into());
        }
        self.run(&[text])?
            .into_iter()
            .next()
            .ok_or_else(|| EmbeddingError::Failed("no embedding returned".to_string()).into())
    }

    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        if texts.iter().any(|t| t.is_empty()) {
            return Err(EmbeddingError::EmptyInput.into());
        }
        self.run(texts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_name() {
        let embedder = FastEmbedEmbedder::new();
        assert_eq!(embedder.model_name(), MODEL_NAME);
        assert_eq!(embedder.dimensions(), DEFAULT_DIMENSIONS);
    }

    #[test]
    fn test_embed_empty_fails_without_loading() {
        let embedder = FastEmbedEmbedder::new();
        assert!(embedder.embed("").is_err());
        assert!(embedder.model.get().is_none());
    }

    #[test]
    fn test_embed_batch_empty_list() {
        let embedder = FastEmbedEmbedder::new();
        assert!(embedder.embed_batch(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_embed_batch_with_empty_fails() {
        let embedder = FastEmbedEmbedder::new();
        assert!(embedder.embed_batch(&["loans", ""]).is_err());
    }

    #[test]
    #[ignore = "requires fastembed model download"]
    fn test_embed_success() {
        let embedder = FastEmbedEmbedder::new();
        let embedding = embedder.embed("customer deposits by branch").unwrap();
        assert_eq!(embedding.len(), DEFAULT_DIMENSIONS);
    }
}
