//! Batch partitioning and the bounded worker pool.

use std::collections::HashSet;
use std::sync::Arc;

use anyhow::{Context, Result};
use indicatif::ProgressBar;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use super::scorer::RelevanceScorer;
use crate::embed::{Embedder, EmbeddingSpace};
use crate::store::{NoteId, NoteStore};

/// Split the id universe into consecutive batches of at most `batch_size`
/// ids, preserving order within and across batches. The last batch may be
/// short. `batch_size` must be positive (enforced by config validation).
pub fn partition(universe: &[NoteId], batch_size: usize) -> Vec<Vec<NoteId>> {
    universe.chunks(batch_size).map(<[NoteId]>::to_vec).collect()
}

/// What the scoring phase produced.
#[derive(Debug)]
pub struct DispatchOutcome {
    /// Union of relevant ids across all completed batches.
    pub relevant: HashSet<NoteId>,
    /// Total batches dispatched.
    pub batches: usize,
    /// Batches that errored and contributed zero verdicts.
    pub failed_batches: usize,
}

/// Evaluate every batch with at most `workers` in flight, unioning the
/// relevant ids in completion order.
///
/// A failed batch is logged and yields nothing; it never aborts the other
/// batches and is never retried. The outcome is therefore best-effort, not
/// exhaustive. The progress bar ticks once per completed batch.
#[allow(clippy::too_many_arguments)]
pub async fn dispatch(
    universe: Vec<NoteId>,
    batch_size: usize,
    workers: usize,
    store: Arc<dyn NoteStore>,
    embedder: Arc<dyn Embedder>,
    space: Arc<EmbeddingSpace>,
    threshold: f32,
    progress: &ProgressBar,
) -> DispatchOutcome {
    let batches = partition(&universe, batch_size);
    let total = batches.len();
    let permits = Arc::new(Semaphore::new(workers));

    let mut pool = JoinSet::new();
    for (index, batch) in batches.into_iter().enumerate() {
        let permits = Arc::clone(&permits);
        let store = Arc::clone(&store);
        let embedder = Arc::clone(&embedder);
        let space = Arc::clone(&space);

        pool.spawn(async move {
            let _permit = permits
                .acquire_owned()
                .await
                .expect("semaphore is never closed");
            let verdicts =
                evaluate_batch(&batch, store.as_ref(), embedder.as_ref(), &space, threshold).await;
            (index, verdicts)
        });
    }

    let mut relevant = HashSet::new();
    let mut failed_batches = 0;
    while let Some(joined) = pool.join_next().await {
        match joined {
            Ok((_, Ok(ids))) => relevant.extend(ids),
            Ok((index, Err(err))) => {
                failed_batches += 1;
                eprintln!("Warning: batch {} failed: {:#}", index + 1, err);
            }
            Err(err) => {
                failed_batches += 1;
                eprintln!("Warning: batch worker panicked: {err}");
            }
        }
        progress.inc(1);
    }

    DispatchOutcome {
        relevant,
        batches: total,
        failed_batches,
    }
}

/// One worker invocation: bulk-fetch the batch, then score each record
/// independently against the shared embedding space.
async fn evaluate_batch(
    batch: &[NoteId],
    store: &dyn NoteStore,
    embedder: &dyn Embedder,
    space: &EmbeddingSpace,
    threshold: f32,
) -> Result<Vec<NoteId>> {
    let records = store
        .fetch_records(batch)
        .await
        .context("fetching note batch")?;

    let scorer = RelevanceScorer::new(embedder, space, threshold);
    let mut relevant = Vec::new();
    for record in records {
        if scorer
            .is_relevant(&record.text)
            .with_context(|| format!("scoring note {}", record.id))?
        {
            relevant.push(record.id);
        }
    }

    Ok(relevant)
}
