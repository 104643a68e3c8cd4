//! Messages from the worker to the host

use std::time::Duration;
use tokio::sync::mpsc;

use translation_worker_core::{
    Error, LanguagePairInfo, ProgressUpdate, SerializedError, TranslationBatch, WorkerMessage,
};

use crate::metrics;

/// Metric name of the model construction timespan reported to the host
pub const MODEL_LOAD_TIMESPAN: &str = "model_load_time_num";

/// Sends [`WorkerMessage`]s to the host and mirrors them into metrics
#[derive(Debug, Clone)]
pub struct Reporter {
    tx: mpsc::UnboundedSender<WorkerMessage>,
    metrics_enabled: bool,
}

impl Reporter {
    pub fn new(tx: mpsc::UnboundedSender<WorkerMessage>, metrics_enabled: bool) -> Self {
        Self {
            tx,
            metrics_enabled,
        }
    }

    pub fn send(&self, message: WorkerMessage) {
        if self.tx.send(message).is_err() {
            tracing::debug!("Host receiver dropped, message discarded");
        }
    }

    pub fn progress(&self, update: ProgressUpdate) {
        self.send(WorkerMessage::progress(update));
    }

    pub fn pending(&self, pending: usize) {
        if self.metrics_enabled {
            metrics::record_pending(pending);
        }
        self.progress(ProgressUpdate::TranslationProgress { pending });
    }

    pub fn download_models(&self, pairs: Vec<LanguagePairInfo>) {
        self.send(WorkerMessage::DownloadLanguageModels(pairs));
    }

    pub fn translation_complete(&self, batch: TranslationBatch, word_count: usize, elapsed: Duration) {
        if self.metrics_enabled {
            metrics::record_batch(batch.len(), elapsed);
        }
        self.send(WorkerMessage::TranslationComplete {
            batch,
            word_count,
            elapsed_ms: elapsed.as_secs_f64() * 1000.0,
        });
    }

    pub fn model_load_time(&self, elapsed: Duration) {
        if self.metrics_enabled {
            metrics::record_model_load(elapsed);
        }
        self.send(WorkerMessage::ReportPerformanceTimespan {
            metric: MODEL_LOAD_TIMESPAN.to_string(),
            millis: elapsed.as_millis() as u64,
        });
    }

    /// Forward an error with its category, then the error-state progress tag
    pub fn failure(&self, err: &Error, state: ProgressUpdate) {
        let category = err.category();
        if self.metrics_enabled {
            metrics::record_error(category.as_str());
        }
        self.send(WorkerMessage::ReportException(SerializedError::from(err)));
        self.send(WorkerMessage::ReportError(category));
        self.progress(state);
    }
}
