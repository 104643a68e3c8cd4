//! Scripted in-memory engine shared by the integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;

use translation_worker_config::Settings;
use translation_worker_core::{
    BlockingService, EngineError, EngineFactory, EngineLoadError, LanguageModelArtifact,
    LanguagePair, ModelBlob, ModelFileType, ModelMemory, NativeHandle, NativeModel, OptionsVector,
    ResourceFetcher, ResponseOptions, ResponseVector, ServiceConfig, TextVector,
    TranslationEngine, TranslationResponse, WorkerMessage,
};
use translation_worker_runtime::{Reporter, WorkerSession};

pub const ENGINE_PATH: &str = "/engine/translator.wasm";

/// Everything the mock engine observed
#[derive(Default)]
pub struct EngineLog {
    pub vectors_created: AtomicUsize,
    pub vectors_released: AtomicUsize,
    pub double_releases: AtomicUsize,
    pub models_released: AtomicUsize,
    pub direct_calls: AtomicUsize,
    pub pivot_calls: AtomicUsize,
    pub services_created: AtomicUsize,
    pub cache_size: AtomicUsize,
    pub fail_translate: AtomicBool,
    pub fail_models: Mutex<HashSet<String>>,
    pub constructed: Mutex<Vec<ConstructedModel>>,
    pub dispatched_texts: Mutex<Vec<Vec<String>>>,
    pub dispatched_options: Mutex<Vec<Vec<ResponseOptions>>>,
}

#[derive(Debug, Clone)]
pub struct ConstructedModel {
    pub key: String,
    pub config: String,
    pub has_shortlist: bool,
    pub has_quality_model: bool,
    pub model_aligned: bool,
}

impl EngineLog {
    pub fn constructed_keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.constructed.lock().iter().map(|m| m.key.clone()).collect();
        keys.sort();
        keys
    }

    pub fn calls(&self) -> usize {
        self.direct_calls.load(Ordering::SeqCst) + self.pivot_calls.load(Ordering::SeqCst)
    }

    pub fn fail_model(&self, key: &str) {
        self.fail_models.lock().insert(key.to_string());
    }

    pub fn created(&self) -> usize {
        self.vectors_created.load(Ordering::SeqCst)
    }

    pub fn released(&self) -> usize {
        self.vectors_released.load(Ordering::SeqCst)
    }
}

fn release_once(released: &mut bool, log: &EngineLog) {
    if *released {
        log.double_releases.fetch_add(1, Ordering::SeqCst);
    } else {
        *released = true;
        log.vectors_released.fetch_add(1, Ordering::SeqCst);
    }
}

struct MockModel {
    key: String,
    log: Arc<EngineLog>,
}

impl NativeHandle for MockModel {
    fn release(&mut self) {
        self.log.models_released.fetch_add(1, Ordering::SeqCst);
    }
}

impl NativeModel for MockModel {}

struct MockTexts {
    texts: Vec<String>,
    released: bool,
    log: Arc<EngineLog>,
}

impl NativeHandle for MockTexts {
    fn release(&mut self) {
        release_once(&mut self.released, &self.log);
    }
}

impl TextVector for MockTexts {
    fn push(&mut self, text: &str) {
        self.texts.push(text.to_string());
    }

    fn get(&self, index: usize) -> Option<&str> {
        self.texts.get(index).map(String::as_str)
    }

    fn len(&self) -> usize {
        self.texts.len()
    }
}

struct MockOptions {
    options: Vec<ResponseOptions>,
    released: bool,
    log: Arc<EngineLog>,
}

impl NativeHandle for MockOptions {
    fn release(&mut self) {
        release_once(&mut self.released, &self.log);
    }
}

impl OptionsVector for MockOptions {
    fn push(&mut self, options: ResponseOptions) {
        self.options.push(options);
    }

    fn get(&self, index: usize) -> Option<ResponseOptions> {
        self.options.get(index).copied()
    }

    fn len(&self) -> usize {
        self.options.len()
    }
}

struct MockResponses {
    responses: Vec<TranslationResponse>,
    released: bool,
    log: Arc<EngineLog>,
}

impl NativeHandle for MockResponses {
    fn release(&mut self) {
        release_once(&mut self.released, &self.log);
    }
}

impl ResponseVector for MockResponses {
    fn len(&self) -> usize {
        self.responses.len()
    }

    fn get(&self, index: usize) -> Option<TranslationResponse> {
        self.responses.get(index).cloned()
    }
}

/// Read back what the executor pushed into the vectors
fn collect(texts: &dyn TextVector, options: &dyn OptionsVector) -> (Vec<String>, Vec<ResponseOptions>) {
    let texts: Vec<String> = (0..texts.len())
        .filter_map(|i| texts.get(i).map(str::to_string))
        .collect();
    let options: Vec<ResponseOptions> = (0..options.len()).filter_map(|i| options.get(i)).collect();
    (texts, options)
}

struct MockService {
    log: Arc<EngineLog>,
    models: Arc<Mutex<Vec<(usize, String)>>>,
}

impl MockService {
    fn key_of(&self, model: &dyn NativeModel) -> String {
        let address = model as *const dyn NativeModel as *const () as usize;
        self.models
            .lock()
            .iter()
            .find(|(a, _)| *a == address)
            .map(|(_, key)| key.clone())
            .unwrap_or_else(|| "unknown".to_string())
    }

    fn respond(
        &self,
        route: String,
        texts: &dyn TextVector,
        options: &dyn OptionsVector,
    ) -> Result<Box<dyn ResponseVector>, EngineError> {
        let (texts, options) = collect(texts, options);
        self.log.dispatched_texts.lock().push(texts.clone());
        self.log.dispatched_options.lock().push(options);

        if self.log.fail_translate.load(Ordering::SeqCst) {
            return Err(EngineError::Native("scripted failure".to_string()));
        }

        self.log.vectors_created.fetch_add(1, Ordering::SeqCst);
        let responses = texts
            .iter()
            .map(|text| TranslationResponse::new(text.clone(), format!("[{}]{}", route, text)))
            .collect();
        Ok(Box::new(MockResponses {
            responses,
            released: false,
            log: self.log.clone(),
        }))
    }
}

impl BlockingService for MockService {
    fn translate(
        &self,
        model: &dyn NativeModel,
        texts: &dyn TextVector,
        options: &dyn OptionsVector,
    ) -> Result<Box<dyn ResponseVector>, EngineError> {
        self.log.direct_calls.fetch_add(1, Ordering::SeqCst);
        self.respond(self.key_of(model), texts, options)
    }

    fn translate_via_pivoting(
        &self,
        source_to_pivot: &dyn NativeModel,
        pivot_to_target: &dyn NativeModel,
        texts: &dyn TextVector,
        options: &dyn OptionsVector,
    ) -> Result<Box<dyn ResponseVector>, EngineError> {
        self.log.pivot_calls.fetch_add(1, Ordering::SeqCst);
        let route = format!("{}>{}", self.key_of(source_to_pivot), self.key_of(pivot_to_target));
        self.respond(route, texts, options)
    }
}

/// Engine whose models translate by prefixing the model key
pub struct MockEngine {
    log: Arc<EngineLog>,
    models: Arc<Mutex<Vec<(usize, String)>>>,
}

impl TranslationEngine for MockEngine {
    fn name(&self) -> &str {
        "mock"
    }

    fn create_service(&self, config: &ServiceConfig) -> Result<Box<dyn BlockingService>, EngineError> {
        self.log.services_created.fetch_add(1, Ordering::SeqCst);
        self.log.cache_size.store(config.cache_size, Ordering::SeqCst);
        Ok(Box::new(MockService {
            log: self.log.clone(),
            models: self.models.clone(),
        }))
    }

    fn construct_model(
        &self,
        config: &str,
        memory: ModelMemory,
    ) -> Result<Box<dyn NativeModel>, EngineError> {
        let key = String::from_utf8_lossy(memory.model.as_slice()).into_owned();
        if self.log.fail_models.lock().contains(&key) {
            return Err(EngineError::Native(format!("corrupt model {}", key)));
        }

        self.log.constructed.lock().push(ConstructedModel {
            key: key.clone(),
            config: config.to_string(),
            has_shortlist: memory.shortlist.is_some(),
            has_quality_model: memory.has_quality_model(),
            model_aligned: memory.model.as_ptr() as usize % 256 == 0,
        });

        let model: Box<dyn NativeModel> = Box::new(MockModel {
            key: key.clone(),
            log: self.log.clone(),
        });
        let address = model.as_ref() as *const dyn NativeModel as *const () as usize;
        self.models.lock().push((address, key));
        Ok(model)
    }

    fn text_vector(&self) -> Box<dyn TextVector> {
        self.log.vectors_created.fetch_add(1, Ordering::SeqCst);
        Box::new(MockTexts {
            texts: Vec::new(),
            released: false,
            log: self.log.clone(),
        })
    }

    fn options_vector(&self) -> Box<dyn OptionsVector> {
        self.log.vectors_created.fetch_add(1, Ordering::SeqCst);
        Box::new(MockOptions {
            options: Vec::new(),
            released: false,
            log: self.log.clone(),
        })
    }
}

pub struct MockFactory {
    log: Arc<EngineLog>,
    pub fail: bool,
}

impl MockFactory {
    pub fn new(log: Arc<EngineLog>) -> Self {
        Self { log, fail: false }
    }
}

impl EngineFactory for MockFactory {
    fn instantiate(
        &self,
        binary: Vec<u8>,
    ) -> Result<Arc<dyn TranslationEngine>, EngineLoadError> {
        if self.fail || !binary.starts_with(b"\0asm") {
            return Err(EngineLoadError::Instantiate("invalid module".to_string()));
        }
        Ok(Arc::new(MockEngine {
            log: self.log.clone(),
            models: Arc::new(Mutex::new(Vec::new())),
        }))
    }
}

/// Serves the engine binary from memory
pub struct MemoryFetcher;

#[async_trait]
impl ResourceFetcher for MemoryFetcher {
    async fn fetch(&self, location: &str) -> std::io::Result<Vec<u8>> {
        if location == ENGINE_PATH {
            Ok(b"\0asm-engine".to_vec())
        } else {
            Err(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("{} not found", location),
            ))
        }
    }
}

/// Artifact whose model file holds the pair key, so the mock engine can name it
pub fn artifact(from: &str, to: &str, with_quality_model: bool) -> LanguageModelArtifact {
    let pair = LanguagePair::new(from, to);
    let artifact = LanguageModelArtifact::new(&pair)
        .with_blob(ModelFileType::Model, ModelBlob::Bytes(pair.key().into_bytes()))
        .with_blob(ModelFileType::Lex, ModelBlob::Bytes(b"lex".to_vec()))
        .with_blob(ModelFileType::Vocab, ModelBlob::Bytes(b"vocab".to_vec()));
    if with_quality_model {
        artifact.with_blob(ModelFileType::QualityModel, ModelBlob::Bytes(b"qe".to_vec()))
    } else {
        artifact
    }
}

pub fn settings() -> Settings {
    let mut settings = Settings::default();
    settings.engine.binary_path = Some(ENGINE_PATH.to_string());
    settings.observability.metrics_enabled = false;
    settings
}

pub struct Harness {
    pub session: WorkerSession,
    pub log: Arc<EngineLog>,
    pub messages: mpsc::UnboundedReceiver<WorkerMessage>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with(settings(), false)
    }

    pub fn with(settings: Settings, factory_fails: bool) -> Self {
        let log = Arc::new(EngineLog::default());
        let mut factory = MockFactory::new(log.clone());
        factory.fail = factory_fails;
        let (tx, messages) = mpsc::unbounded_channel();
        let session = WorkerSession::new(
            settings,
            Arc::new(factory),
            Arc::new(MemoryFetcher),
            Reporter::new(tx, false),
        );
        Self {
            session,
            log,
            messages,
        }
    }

    /// Everything reported since the last call
    pub fn take_messages(&mut self) -> Vec<WorkerMessage> {
        let mut messages = Vec::new();
        while let Ok(message) = self.messages.try_recv() {
            messages.push(message);
        }
        messages
    }
}

/// Batches reported with `translationComplete`, in order
pub fn completed(messages: &[WorkerMessage]) -> Vec<translation_worker_core::TranslationBatch> {
    messages
        .iter()
        .filter_map(|message| match message {
            WorkerMessage::TranslationComplete { batch, .. } => Some(batch.clone()),
            _ => None,
        })
        .collect()
}

/// Translations of every completed item, in report order
pub fn translations(messages: &[WorkerMessage]) -> Vec<String> {
    completed(messages)
        .into_iter()
        .flatten()
        .map(|item| item.translated_paragraph.unwrap_or_default())
        .collect()
}
