//! Worker task and its host-side handle

use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use translation_worker_config::Settings;
use translation_worker_core::{
    EngineFactory, Error, HostMessage, ResourceFetcher, Result, WorkerMessage,
};

use crate::reporter::Reporter;
use crate::session::WorkerSession;

/// Host side of a running worker
pub struct WorkerHandle {
    inbox: mpsc::UnboundedSender<HostMessage>,
    outbox: mpsc::UnboundedReceiver<WorkerMessage>,
    task: JoinHandle<()>,
}

impl WorkerHandle {
    pub fn send(&self, message: HostMessage) -> Result<()> {
        self.inbox
            .send(message)
            .map_err(|_| Error::protocol("worker stopped"))
    }

    /// Decode and send a raw host message; unknown tags are dropped
    pub fn send_json(&self, raw: &str) -> Result<()> {
        match HostMessage::from_json(raw)? {
            Some(message) => self.send(message),
            None => Ok(()),
        }
    }

    pub async fn recv(&mut self) -> Option<WorkerMessage> {
        self.outbox.recv().await
    }

    pub fn try_recv(&mut self) -> Option<WorkerMessage> {
        self.outbox.try_recv().ok()
    }

    /// Close the inbox, wait for queued messages to be handled and
    /// return everything the worker sent that was not yet received
    pub async fn shutdown(self) -> Vec<WorkerMessage> {
        let WorkerHandle {
            inbox,
            mut outbox,
            task,
        } = self;
        drop(inbox);
        if let Err(e) = task.await {
            tracing::warn!(error = %e, "Worker task ended abnormally");
        }

        let mut remaining = Vec::new();
        while let Ok(message) = outbox.try_recv() {
            remaining.push(message);
        }
        remaining
    }
}

/// Start a worker session on its own task
///
/// Host messages are handled strictly in arrival order. A handler error
/// has already been reported to the host; the loop logs it and moves on.
pub fn spawn_worker(
    settings: Settings,
    factory: Arc<dyn EngineFactory>,
    fetcher: Arc<dyn ResourceFetcher>,
) -> WorkerHandle {
    let (inbox, mut inbox_rx) = mpsc::unbounded_channel::<HostMessage>();
    let (outbox_tx, outbox) = mpsc::unbounded_channel();

    let reporter = Reporter::new(outbox_tx, settings.observability.metrics_enabled);
    let mut session = WorkerSession::new(settings, factory, fetcher, reporter);

    let task = tokio::spawn(async move {
        tracing::info!("Translation worker started");
        while let Some(message) = inbox_rx.recv().await {
            let tag = message.tag();
            if let Err(e) = session.handle(message).await {
                tracing::error!(
                    tag,
                    category = %e.category(),
                    recoverable = e.is_recoverable(),
                    error = %e,
                    "Error handling host message"
                );
            }
        }
        let released = session.delete_models();
        tracing::info!(released, "Translation worker stopped");
    });

    WorkerHandle {
        inbox,
        outbox,
        task,
    }
}
