//! Embedding model seam and the Model2Vec implementation.
//!
//! A single model instance is constructed per run and passed explicitly to
//! every component that embeds text, so tests can substitute a stub.

use anyhow::{Context, Result};
use model2vec::Model2Vec;

use crate::core::error::TagError;

/// Default model (HuggingFace ID), multilingual static embeddings.
pub const DEFAULT_MODEL_HF: &str = "minishlab/potion-multilingual-128M";

/// Embedding dimension for the potion model family.
pub const MODEL2VEC_DIM: usize = 256;

/// Embedding model abstraction.
///
/// `embed_batch` is order-preserving: one vector per input string, in input
/// order. Implementations must be shareable across worker tasks.
pub trait Embedder: Send + Sync {
    /// Generate embedding for a single text.
    fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Generate embeddings for multiple texts in one model call.
    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>>;

    /// Get embedding dimension.
    fn dimension(&self) -> usize;

    /// Get model name/identifier.
    fn name(&self) -> &str;
}

/// Model2Vec based embedder.
pub struct Model2VecEmbedder {
    model: Model2Vec,
    model_id: String,
}

impl Model2VecEmbedder {
    /// Load from a HuggingFace Hub id or a local directory path.
    ///
    /// Failure means the model weights are unreachable; the run cannot
    /// proceed without them.
    pub fn load(id_or_path: &str) -> Result<Self> {
        let model =
            Model2Vec::from_pretrained(id_or_path, None, None).map_err(|e| {
                TagError::ModelUnavailable {
                    reason: format!("{}: {}", id_or_path, e),
                }
            })?;

        Ok(Self {
            model,
            model_id: id_or_path.to_string(),
        })
    }
}

impl Embedder for Model2VecEmbedder {
    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let texts = [text];
        let embeddings = self.model.encode(&texts).context("Failed to encode text")?;
        Ok(embeddings.row(0).to_vec())
    }

    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        let embeddings = self.model.encode(texts).context("Failed to encode texts")?;
        Ok(embeddings.rows().into_iter().map(|r| r.to_vec()).collect())
    }

    fn dimension(&self) -> usize {
        MODEL2VEC_DIM
    }

    fn name(&self) -> &str {
        &self.model_id
    }
}

/// Cosine similarity between two embeddings.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a > 0.0 && norm_b > 0.0 {
        dot / (norm_a * norm_b)
    } else {
        0.0
    }
}
