//! Worker session
//!
//! Owns everything a worker holds between host messages: the engine
//! lifecycle state, the pending queue, the loaded models and the engine's
//! blocking service. Host messages are handled one at a time.

use std::sync::Arc;
use std::time::Instant;

use translation_worker_config::Settings;
use translation_worker_core::{
    BlockingService, EngineFactory, EngineLoadError, EngineLocation, Error, HostMessage,
    LanguageModelArtifact, ModelLoadError, ProgressUpdate, ResourceFetcher, Result, ServiceConfig,
    TranslationBatch, TranslationEngine, TranslationInputError, WorkerMessage,
};

use crate::executor::BatchExecutor;
use crate::loader::ModelBuilder;
use crate::outbound::translate_outbound;
use crate::queue::PendingQueue;
use crate::registry::ModelRegistry;
use crate::reporter::Reporter;
use crate::state::{EngineState, LoadRequest};

/// Worker state, constructed once per worker
pub struct WorkerSession {
    settings: Settings,
    location: Option<EngineLocation>,
    state: EngineState,
    queue: PendingQueue,
    registry: Arc<ModelRegistry>,
    engine: Option<Arc<dyn TranslationEngine>>,
    service: Option<Box<dyn BlockingService>>,
    outbound_enabled: bool,
    in_flight: usize,
    factory: Arc<dyn EngineFactory>,
    fetcher: Arc<dyn ResourceFetcher>,
    reporter: Reporter,
}

impl WorkerSession {
    pub fn new(
        settings: Settings,
        factory: Arc<dyn EngineFactory>,
        fetcher: Arc<dyn ResourceFetcher>,
        reporter: Reporter,
    ) -> Self {
        let location = settings
            .engine
            .binary_path
            .clone()
            .map(|path| EngineLocation {
                engine_script_local_path: settings.engine.script_path.clone(),
                engine_wasm_local_path: path,
                serialize_error_script: settings.engine.serialize_error_script.clone(),
            });

        Self {
            settings,
            location,
            state: EngineState::Unloaded,
            queue: PendingQueue::new(),
            registry: Arc::new(ModelRegistry::new()),
            engine: None,
            service: None,
            outbound_enabled: false,
            in_flight: 0,
            factory,
            fetcher,
            reporter,
        }
    }

    pub fn state(&self) -> &EngineState {
        &self.state
    }

    pub fn registry(&self) -> &Arc<ModelRegistry> {
        &self.registry
    }

    pub fn engine_location(&self) -> Option<&EngineLocation> {
        self.location.as_ref()
    }

    pub fn pending_batches(&self) -> usize {
        self.queue.len()
    }

    pub fn outbound_enabled(&self) -> bool {
        self.outbound_enabled
    }

    /// Handle one host message
    ///
    /// Failures are reported to the host before they are returned.
    pub async fn handle(&mut self, message: HostMessage) -> Result<()> {
        tracing::debug!(tag = message.tag(), state = %self.state, "Handling host message");
        match message {
            HostMessage::ConfigEngine(location) => {
                self.configure_engine(location);
                Ok(())
            }
            HostMessage::Translate(batch) => self.on_translate(batch).await,
            HostMessage::ResponseDownloadLanguageModels(artifacts) => {
                self.on_language_models(artifacts).await
            }
        }
    }

    /// Release every loaded model
    pub fn delete_models(&mut self) -> usize {
        self.registry.delete_all()
    }

    fn configure_engine(&mut self, location: EngineLocation) {
        tracing::info!(
            binary = %location.engine_wasm_local_path,
            script = ?location.engine_script_local_path,
            "Engine location configured"
        );
        self.location = Some(location);
    }

    async fn on_translate(&mut self, batch: TranslationBatch) -> Result<()> {
        let Some(first) = batch.first() else {
            let err = Error::from(TranslationInputError::NoOptions);
            self.reporter
                .failure(&err, ProgressUpdate::TranslationLoadedWithErrors);
            return Err(err);
        };
        let is_outbound = first.is_outbound();
        let load_request = LoadRequest::from_request(first);

        match self.state {
            EngineState::Unloaded => {
                self.queue.push(batch);
                self.state = EngineState::Loading(load_request.clone());
                self.load_engine(&load_request).await
            }
            EngineState::Loading(_) => {
                self.queue.push(batch);
                tracing::debug!(
                    batches = self.queue.len(),
                    items = self.queue.pending_items(),
                    "Engine loading, batch queued"
                );
                Ok(())
            }
            EngineState::Ready if is_outbound => self.run_batch(batch),
            EngineState::Ready => {
                self.queue.push(batch);
                self.drain().await
            }
        }
    }

    /// Fetch and instantiate the engine, then ask the host for the models
    async fn load_engine(&mut self, request: &LoadRequest) -> Result<()> {
        self.reporter.progress(ProgressUpdate::LoadingTranslationEngine);

        if let Err(e) = self.instantiate_engine().await {
            tracing::error!(error = %e, "Error loading translation engine");
            self.reporter.failure(&e, ProgressUpdate::ErrorLoadingWasm);
            return Err(e);
        }

        let pairs = request.pairs_to_download();
        tracing::info!(
            pair = %request.pair,
            models = pairs.len(),
            outbound = request.with_outbound_translation,
            quality_estimation = request.with_quality_estimation,
            "Requesting language models"
        );
        self.reporter.download_models(pairs);
        Ok(())
    }

    async fn instantiate_engine(&mut self) -> Result<()> {
        let path = self
            .location
            .as_ref()
            .map(|location| location.engine_wasm_local_path.clone())
            .filter(|path| !path.trim().is_empty())
            .ok_or(EngineLoadError::NotConfigured)?;

        let started = Instant::now();
        let binary = self
            .fetcher
            .fetch(&path)
            .await
            .map_err(|source| EngineLoadError::Download {
                path: path.clone(),
                source,
            })?;

        let engine = self.factory.instantiate(binary)?;
        let service = engine
            .create_service(&ServiceConfig {
                cache_size: self.settings.engine.service_cache_size,
            })
            .map_err(|e| EngineLoadError::Service(e.to_string()))?;

        tracing::info!(
            engine = engine.name(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Translation engine instantiated"
        );
        self.engine = Some(engine);
        self.service = Some(service);
        Ok(())
    }

    async fn on_language_models(&mut self, artifacts: Vec<LanguageModelArtifact>) -> Result<()> {
        let EngineState::Loading(request) = &self.state else {
            return Err(Error::protocol(format!(
                "language models received while engine is {}",
                self.state
            )));
        };
        let request = request.clone();

        let Some(engine) = self.engine.clone() else {
            let err = Error::from(ModelLoadError::EngineNotLoaded);
            self.reporter.failure(&err, ProgressUpdate::ErrorLoadingWasm);
            return Err(err);
        };

        let started = Instant::now();
        let builder = ModelBuilder::new(engine, self.registry.clone(), self.settings.model.clone());
        let report = match builder
            .construct_translation_model(&request, &artifacts)
            .await
        {
            Ok(report) => report,
            Err(e) => {
                tracing::error!(pair = %request.pair, error = %e, "Error constructing translation model");
                self.reporter.failure(&e, ProgressUpdate::ErrorLoadingWasm);
                return Err(e);
            }
        };

        self.reporter.model_load_time(started.elapsed());
        for supervised in &report.supervised_qe {
            self.reporter.send(WorkerMessage::ReportQeIsSupervised(*supervised));
        }
        self.outbound_enabled = report.outbound_enabled;
        if report.outbound_enabled {
            self.reporter.send(WorkerMessage::DisplayOutboundTranslation);
        }

        self.state = EngineState::Ready;
        let update = if request.with_outbound_translation && !report.outbound_enabled {
            ProgressUpdate::TranslationEnabledNoOutbound
        } else {
            ProgressUpdate::TranslationEnabled
        };
        tracing::info!(
            models = ?self.registry.keys(),
            outbound = report.outbound_enabled,
            pending = self.queue.len(),
            "Translation enabled"
        );
        self.reporter.progress(update);

        self.drain().await
    }

    /// Run every queued batch in arrival order
    ///
    /// A failing batch does not stop the drain; the first error is
    /// returned once the queue is empty.
    pub async fn drain(&mut self) -> Result<()> {
        let mut first_error = None;
        while let Some(batch) = self.queue.pop() {
            if let Err(e) = self.process_batch(batch) {
                first_error.get_or_insert(e);
            }
            if self.settings.worker.yield_between_batches && !self.queue.is_empty() {
                tokio::task::yield_now().await;
            }
        }
        first_error.map_or(Ok(()), Err)
    }

    fn process_batch(&mut self, batch: TranslationBatch) -> Result<()> {
        let items = batch.len();
        self.in_flight += items;
        self.reporter.pending(self.in_flight);

        let result = self.run_batch(batch);

        self.in_flight -= items;
        self.reporter.pending(self.in_flight);
        result
    }

    fn run_batch(&self, batch: TranslationBatch) -> Result<()> {
        let (Some(engine), Some(service)) = (self.engine.as_deref(), self.service.as_deref()) else {
            let err = Error::from(ModelLoadError::EngineNotLoaded);
            self.reporter
                .failure(&err, ProgressUpdate::TranslationLoadedWithErrors);
            return Err(err);
        };
        let executor = BatchExecutor::new(engine, service, &self.registry, &self.reporter);

        let is_outbound = batch.first().is_some_and(|item| item.is_outbound());
        if !is_outbound {
            return executor.execute(batch);
        }

        if !self.outbound_enabled {
            let pair = batch[0].language_pair();
            let err = Error::OutboundModelUnavailable(pair.to_string());
            tracing::warn!(pair = %pair, "Outbound translation requested but not loaded");
            self.reporter
                .failure(&err, ProgressUpdate::TranslationEnabledNoOutbound);
            return Err(err);
        }
        translate_outbound(&executor, batch)
    }
}
