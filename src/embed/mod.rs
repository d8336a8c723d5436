//! Embeddings for relevance matching
//!
//! - `embedder`: model seam and the Model2Vec implementation
//! - `space`: the document's reference embedding set, built once per run

pub mod embedder;
pub mod space;

pub use embedder::{cosine_similarity, Embedder, Model2VecEmbedder, MODEL2VEC_DIM};
pub use space::EmbeddingSpace;
