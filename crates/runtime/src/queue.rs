//! FIFO of batches waiting for the engine

use std::collections::VecDeque;

use translation_worker_core::TranslationBatch;

/// Batches buffered until they can be handed to the executor
///
/// Batches leave in the order they arrived and are never merged or split.
#[derive(Debug, Default)]
pub struct PendingQueue {
    batches: VecDeque<TranslationBatch>,
}

impl PendingQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, batch: TranslationBatch) {
        self.batches.push_back(batch);
    }

    pub fn pop(&mut self) -> Option<TranslationBatch> {
        self.batches.pop_front()
    }

    /// Number of buffered batches
    pub fn len(&self) -> usize {
        self.batches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.batches.is_empty()
    }

    /// Number of buffered requests across all batches
    pub fn pending_items(&self) -> usize {
        self.batches.iter().map(Vec::len).sum()
    }
}
