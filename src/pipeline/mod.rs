//! Pipeline orchestration: extract, segment, embed, dispatch, tag.
//!
//! The embedding space is fully built before any batch is dispatched, and
//! the bulk tag call happens at most once, only when at least one note
//! scored relevant.

pub mod dispatch;
pub mod scorer;

use std::sync::Arc;

use anyhow::{Context, Result};
use indicatif::ProgressBar;

use crate::core::config::RunConfig;
use crate::document::extract::DocumentSource;
use crate::document::segment;
use crate::embed::{Embedder, EmbeddingSpace};
use crate::store::{NoteId, NoteStore};

pub use dispatch::{dispatch, partition, DispatchOutcome};
pub use scorer::{strip_markup, RelevanceScorer};

/// Observable result of one run.
#[derive(Debug)]
pub struct RunSummary {
    /// Sentences extracted from the document.
    pub sentences: usize,
    /// Notes matched by the search query.
    pub universe: usize,
    /// Batches dispatched.
    pub batches: usize,
    /// Batches that failed and contributed zero verdicts.
    pub failed_batches: usize,
    /// Notes that received the tag.
    pub tagged: usize,
}

/// Execute the full pipeline against the given collaborators.
///
/// Batch-level failures are logged and reflected in `failed_batches`; the
/// returned summary is best-effort for the scoring phase. A failure of the
/// final bulk tag call is fatal and surfaced to the caller.
pub async fn run(
    config: &RunConfig,
    source: &dyn DocumentSource,
    embedder: Arc<dyn Embedder>,
    store: Arc<dyn NoteStore>,
    progress: &ProgressBar,
) -> Result<RunSummary> {
    config.validate()?;

    let pages = source.extract_text(&config.document)?;
    let sentences = segment::segment(&pages);

    let space = Arc::new(
        EmbeddingSpace::build(embedder.as_ref(), &sentences)
            .context("embedding the document sentences")?,
    );

    let universe = store
        .find_ids(&config.query)
        .await
        .context("querying the note store")?;
    let universe_size = universe.len();

    progress.set_length(universe_size.div_ceil(config.batch_size) as u64);

    let outcome = dispatch::dispatch(
        universe,
        config.batch_size,
        config.workers,
        Arc::clone(&store),
        embedder,
        space,
        config.threshold,
        progress,
    )
    .await;

    let tagged = if outcome.relevant.is_empty() {
        0
    } else {
        let mut ids: Vec<NoteId> = outcome.relevant.iter().copied().collect();
        ids.sort_unstable();
        store
            .add_tag(&ids, &config.tag)
            .await
            .context("applying the tag")?;
        ids.len()
    };

    Ok(RunSummary {
        sentences: sentences.len(),
        universe: universe_size,
        batches: outcome.batches,
        failed_batches: outcome.failed_batches,
        tagged,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::extract::PlainTextSource;
    use crate::embed::embedder::stub::StubEmbedder;
    use crate::store::anki::stub::StubStore;
    use std::collections::HashSet;
    use std::io::Write;

    /// Document with one sentence the stub embedder knows, plus config
    /// pointing at it.
    fn fixture() -> (tempfile::NamedTempFile, RunConfig) {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "The krebs cycle produces ATP.").unwrap();

        let mut config = RunConfig::new(file.path().to_path_buf(), "biochem::atp");
        config.batch_size = 2;
        (file, config)
    }

    fn embedder() -> Arc<StubEmbedder> {
        Arc::new(StubEmbedder::new(&[
            ("The krebs cycle produces ATP.", [1.0, 0.0, 0.0, 0.0]),
            ("matching note", [1.0, 0.0, 0.0, 0.0]),
        ]))
    }

    #[tokio::test]
    async fn test_run_tags_relevant_notes_once() {
        let (_file, config) = fixture();
        let store = Arc::new(StubStore::new(&[
            (1, "unrelated"),
            (2, "matching note"),
            (3, "unrelated"),
            (4, "unrelated"),
            (5, "matching note"),
        ]));

        let summary = run(
            &config,
            &PlainTextSource,
            embedder(),
            Arc::clone(&store) as Arc<dyn NoteStore>,
            &ProgressBar::hidden(),
        )
        .await
        .unwrap();

        assert_eq!(summary.sentences, 1);
        assert_eq!(summary.universe, 5);
        assert_eq!(summary.batches, 3);
        assert_eq!(summary.tagged, 2);

        let calls = store.tag_calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0], (vec![2, 5], "biochem::atp".to_string()));
    }

    #[tokio::test]
    async fn test_empty_relevant_set_issues_no_tag_call() {
        let (_file, config) = fixture();
        let store = Arc::new(StubStore::new(&[(1, "unrelated"), (2, "unrelated")]));

        let summary = run(
            &config,
            &PlainTextSource,
            embedder(),
            Arc::clone(&store) as Arc<dyn NoteStore>,
            &ProgressBar::hidden(),
        )
        .await
        .unwrap();

        assert_eq!(summary.tagged, 0);
        assert!(store.tag_calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_run_is_idempotent_over_unchanged_inputs() {
        let (_file, config) = fixture();
        let notes = [
            (1, "unrelated"),
            (2, "matching note"),
            (3, "unrelated"),
            (4, "unrelated"),
            (5, "matching note"),
        ];

        let mut tagged_sets = Vec::new();
        for _ in 0..2 {
            let store = Arc::new(StubStore::new(&notes));
            run(
                &config,
                &PlainTextSource,
                embedder(),
                Arc::clone(&store) as Arc<dyn NoteStore>,
                &ProgressBar::hidden(),
            )
            .await
            .unwrap();

            let calls = store.tag_calls.lock().unwrap();
            tagged_sets.push(calls[0].0.iter().copied().collect::<HashSet<_>>());
        }

        assert_eq!(tagged_sets[0], tagged_sets[1]);
    }

    #[tokio::test]
    async fn test_tagging_failure_is_fatal() {
        let (_file, config) = fixture();
        let store = Arc::new(StubStore::new(&[(2, "matching note")]).failing_tagging());

        let result = run(
            &config,
            &PlainTextSource,
            embedder(),
            store as Arc<dyn NoteStore>,
            &ProgressBar::hidden(),
        )
        .await;

        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_invalid_config_fails_before_any_work() {
        let (_file, mut config) = fixture();
        config.threshold = 2.0;
        let store = Arc::new(StubStore::new(&[(1, "matching note")]));

        let result = run(
            &config,
            &PlainTextSource,
            embedder(),
            Arc::clone(&store) as Arc<dyn NoteStore>,
            &ProgressBar::hidden(),
        )
        .await;

        assert!(result.is_err());
        assert!(store.tag_calls.lock().unwrap().is_empty());
    }
}
