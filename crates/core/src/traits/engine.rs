//! Native engine traits

use std::sync::Arc;

use crate::aligned::AlignedBuffer;
use crate::error::{EngineError, EngineLoadError};
use crate::response::TranslationResponse;

/// A resource owned by the native engine that must be released explicitly
///
/// The runtime does not reclaim these automatically; callers release each
/// handle exactly once.
pub trait NativeHandle: Send {
    fn release(&mut self);
}

/// Loaded model weights, vocabulary and optional quality sub-model
pub trait NativeModel: NativeHandle + Sync {}

/// Native vector of source paragraphs
pub trait TextVector: NativeHandle {
    fn push(&mut self, text: &str);
    fn get(&self, index: usize) -> Option<&str>;
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Per-paragraph response options, parallel to a [`TextVector`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ResponseOptions {
    pub quality_scores: bool,
    pub alignment: bool,
    pub html: bool,
}

/// Native vector of [`ResponseOptions`]
pub trait OptionsVector: NativeHandle {
    fn push(&mut self, options: ResponseOptions);
    fn get(&self, index: usize) -> Option<ResponseOptions>;
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Native vector of responses, one per submitted text and in the same order
pub trait ResponseVector: NativeHandle {
    fn len(&self) -> usize;
    fn get(&self, index: usize) -> Option<TranslationResponse>;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Configuration of the engine's blocking service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ServiceConfig {
    /// Translation cache entries; `0` disables caching
    pub cache_size: usize,
}

/// Aligned model files handed to native model construction
///
/// Ownership of every buffer passes to the engine.
#[derive(Debug)]
pub struct ModelMemory {
    pub model: AlignedBuffer,
    pub shortlist: Option<AlignedBuffer>,
    pub vocabs: Vec<AlignedBuffer>,
    pub quality_model: Option<AlignedBuffer>,
}

impl ModelMemory {
    pub fn has_quality_model(&self) -> bool {
        self.quality_model.is_some()
    }
}

/// Synchronous, batch-oriented translation entry points
///
/// Implementations must return responses in the order of the submitted
/// text vector.
pub trait BlockingService: Send + Sync {
    fn translate(
        &self,
        model: &dyn NativeModel,
        texts: &dyn TextVector,
        options: &dyn OptionsVector,
    ) -> Result<Box<dyn ResponseVector>, EngineError>;

    fn translate_via_pivoting(
        &self,
        source_to_pivot: &dyn NativeModel,
        pivot_to_target: &dyn NativeModel,
        texts: &dyn TextVector,
        options: &dyn OptionsVector,
    ) -> Result<Box<dyn ResponseVector>, EngineError>;
}

/// An instantiated engine module
pub trait TranslationEngine: Send + Sync {
    /// Engine name for logging
    fn name(&self) -> &str;

    fn create_service(&self, config: &ServiceConfig) -> Result<Box<dyn BlockingService>, EngineError>;

    /// Build a model from its text configuration block and aligned files
    fn construct_model(
        &self,
        config: &str,
        memory: ModelMemory,
    ) -> Result<Box<dyn NativeModel>, EngineError>;

    fn text_vector(&self) -> Box<dyn TextVector>;

    fn options_vector(&self) -> Box<dyn OptionsVector>;
}

/// Turns a fetched engine binary into a usable engine
pub trait EngineFactory: Send + Sync {
    fn instantiate(&self, binary: Vec<u8>) -> Result<Arc<dyn TranslationEngine>, EngineLoadError>;
}
