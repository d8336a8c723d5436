//! Run configuration and fail-fast validation.
//!
//! Every parameter is checked before the pipeline starts; an invalid value
//! never reaches the scoring phase.

use std::path::PathBuf;

use crate::core::error::TagError;

pub const DEFAULT_WORKERS: usize = 3;
pub const DEFAULT_BATCH_SIZE: usize = 12;
pub const DEFAULT_THRESHOLD: f32 = 0.6;
/// Default Anki search scope. Override with `--query` to target a deck.
pub const DEFAULT_QUERY: &str = "deck:current";
/// Note field whose value is scored for relevance.
pub const DEFAULT_NOTE_FIELD: &str = "Text";
/// Local AnkiConnect endpoint.
pub const DEFAULT_ENDPOINT: &str = "http://localhost:8765";

/// Parameters for one tagging run.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Reference document the notes are matched against.
    pub document: PathBuf,
    /// Tag applied to every relevant note.
    pub tag: String,
    /// Number of batches scored concurrently.
    pub workers: usize,
    /// Notes fetched and scored per batch.
    pub batch_size: usize,
    /// Minimum cosine similarity for a note to count as relevant.
    pub threshold: f32,
    /// Anki search query selecting the note universe.
    pub query: String,
    /// Note field whose text is scored.
    pub note_field: String,
    /// AnkiConnect endpoint URL.
    pub endpoint: String,
    /// Model2Vec model id or local path.
    pub model_id: String,
}

impl RunConfig {
    /// Config with defaults for everything but the two required inputs.
    pub fn new(document: PathBuf, tag: &str) -> Self {
        Self {
            document,
            tag: tag.to_string(),
            workers: DEFAULT_WORKERS,
            batch_size: DEFAULT_BATCH_SIZE,
            threshold: DEFAULT_THRESHOLD,
            query: DEFAULT_QUERY.to_string(),
            note_field: DEFAULT_NOTE_FIELD.to_string(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            model_id: crate::embed::embedder::DEFAULT_MODEL_HF.to_string(),
        }
    }

    /// Reject invalid parameter values before any work is dispatched.
    pub fn validate(&self) -> Result<(), TagError> {
        if self.workers == 0 {
            return Err(TagError::Configuration(
                "workers must be a positive integer".to_string(),
            ));
        }
        if self.batch_size == 0 {
            return Err(TagError::Configuration(
                "batch size must be a positive integer".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.threshold) {
            return Err(TagError::Configuration(format!(
                "threshold {} is outside 0.0..=1.0",
                self.threshold
            )));
        }
        if self.tag.trim().is_empty() {
            return Err(TagError::Configuration("tag must not be empty".to_string()));
        }
        if self.query.trim().is_empty() {
            return Err(TagError::Configuration(
                "search query must not be empty".to_string(),
            ));
        }
        if self.note_field.trim().is_empty() {
            return Err(TagError::Configuration(
                "note field must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}
