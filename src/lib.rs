//! Tag Anki notes that are semantically relevant to a reference document.
//!
//! The pipeline turns a document into a read-only embedding space, scores
//! every note in a configurable Anki search scope against it with cosine
//! similarity, and bulk-applies a tag to the notes that clear the threshold.
//!
//! # Components
//!
//! - `core`: run configuration and the error taxonomy
//! - `document`: text extraction seam and sentence segmentation
//! - `embed`: embedding model seam and the document embedding space
//! - `store`: AnkiConnect note-store client
//! - `pipeline`: relevance scoring, batch dispatch, orchestration

pub mod core;
pub mod document;
pub mod embed;
pub mod pipeline;
pub mod store;

pub use crate::core::config::RunConfig;
pub use crate::core::error::TagError;
pub use crate::document::extract::{DocumentSource, PlainTextSource};
pub use crate::embed::{cosine_similarity, Embedder, EmbeddingSpace, Model2VecEmbedder};
pub use crate::pipeline::{run, RunSummary};
pub use crate::store::{AnkiConnectStore, NoteId, NoteRecord, NoteStore};
