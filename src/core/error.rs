//! Error taxonomy for the tagging pipeline.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort a run.
///
/// Failures inside a single batch are deliberately absent here: the
/// dispatcher logs them and the batch contributes zero verdicts, without
/// touching the other batches.
#[derive(Debug, Error)]
pub enum TagError {
    /// Invalid input parameters. Raised before any work is dispatched.
    #[error("invalid configuration: {0}")]
    Configuration(String),

    /// The reference document does not exist.
    #[error("document not found: {}", path.display())]
    FileNotFound { path: PathBuf },

    /// The reference document exists but could not be read as text.
    #[error("could not read document {}: {reason}", path.display())]
    UnreadableDocument { path: PathBuf, reason: String },

    /// The embedding model could not be loaded. There is no degraded mode.
    #[error("embedding model unavailable: {reason}")]
    ModelUnavailable { reason: String },

    /// The note store rejected or failed a request. Fatal when raised
    /// outside a batch (the initial id lookup and the final bulk tag).
    #[error("note store request failed: {0}")]
    Remote(String),
}
