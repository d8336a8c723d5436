//! Document ingestion
//!
//! - `extract`: per-page text extraction seam with a plain-text backend
//! - `segment`: whitespace normalization and heuristic sentence splitting

pub mod extract;
pub mod segment;

pub use extract::{DocumentSource, PlainTextSource};
pub use segment::segment;
