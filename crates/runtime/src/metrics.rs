//! Worker metrics recorded through the `metrics` facade
//!
//! No exporter is installed here; the embedding process decides where the
//! values go.

use std::time::Duration;

pub const BATCHES_TOTAL: &str = "translation_worker_batches_total";
pub const ERRORS_TOTAL: &str = "translation_worker_errors_total";
pub const BATCH_DURATION_MS: &str = "translation_worker_batch_duration_ms";
pub const MODEL_LOAD_MS: &str = "translation_worker_model_load_ms";
pub const PENDING_ITEMS: &str = "translation_worker_pending_items";

/// Record a translated batch
pub fn record_batch(items: usize, elapsed: Duration) {
    ::metrics::counter!(BATCHES_TOTAL).increment(1);
    ::metrics::histogram!(BATCH_DURATION_MS).record(elapsed.as_secs_f64() * 1000.0);
    tracing::trace!(items, "Recorded batch metrics");
}

/// Record an error reported to the host
pub fn record_error(category: &'static str) {
    ::metrics::counter!(ERRORS_TOTAL, "category" => category).increment(1);
}

/// Record the time taken to construct all models
pub fn record_model_load(elapsed: Duration) {
    ::metrics::histogram!(MODEL_LOAD_MS).record(elapsed.as_secs_f64() * 1000.0);
}

/// Record the number of requests picked up and not yet reported
pub fn record_pending(pending: usize) {
    ::metrics::gauge!(PENDING_ITEMS).set(pending as f64);
}
