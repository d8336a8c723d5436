//! Remote note store
//!
//! - `anki`: the `NoteStore` seam and the AnkiConnect HTTP client

pub mod anki;

pub use anki::{AnkiConnectStore, NoteId, NoteRecord, NoteStore};
