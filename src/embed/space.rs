//! The document's reference embedding set.

use anyhow::Result;

use super::embedder::{cosine_similarity, Embedder};

/// Sentence embeddings for the reference document.
///
/// Built once per run with a single model call, then read-only; safe to
/// share across workers behind an `Arc` without synchronization.
pub struct EmbeddingSpace {
    vectors: Vec<Vec<f32>>,
    dimension: usize,
}

impl EmbeddingSpace {
    /// Embed the full sentence set in one model call.
    pub fn build(embedder: &dyn Embedder, sentences: &[String]) -> Result<Self> {
        let refs: Vec<&str> = sentences.iter().map(String::as_str).collect();
        let vectors = if refs.is_empty() {
            Vec::new()
        } else {
            embedder.embed_batch(&refs)?
        };

        Ok(Self {
            vectors,
            dimension: embedder.dimension(),
        })
    }

    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Best cosine score of `vector` against every sentence embedding.
    ///
    /// `None` when the space holds no sentences; no note can match an empty
    /// document.
    pub fn max_similarity(&self, vector: &[f32]) -> Option<f32> {
        self.vectors
            .iter()
            .map(|sentence| cosine_similarity(vector, sentence))
            .fold(None, |best, score| match best {
                Some(b) if b >= score => Some(b),
                _ => Some(score),
            })
    }
}
