//! Outbound fast path
//!
//! Outbound text is translated as soon as it arrives instead of waiting
//! behind queued page batches, and is never scored.

use std::time::Instant;

use translation_worker_core::{Result, TranslationBatch};

use crate::executor::BatchExecutor;

/// Translate an outbound batch with quality estimation forced off
///
/// Each item's quality estimation flag is restored before the result is
/// reported.
pub fn translate_outbound(executor: &BatchExecutor<'_>, mut batch: TranslationBatch) -> Result<()> {
    let started = Instant::now();

    let requested_qe: Vec<bool> = batch
        .iter_mut()
        .map(|item| std::mem::replace(&mut item.with_quality_estimation, false))
        .collect();

    let result = executor.translate(&mut batch);

    for (item, with_quality_estimation) in batch.iter_mut().zip(requested_qe) {
        item.with_quality_estimation = with_quality_estimation;
    }

    tracing::debug!(items = batch.len(), "Outbound translation finished");
    executor.report(batch, started, result)
}
