//! Traits at the native engine boundary
//!
//! The engine itself (decoder, numeric precision, internal batching) is
//! opaque. These traits describe what the worker needs from it:
//!
//! ```text
//! Loading:
//!   - ResourceFetcher: engine binary bytes from a location
//!   - EngineFactory: binary → TranslationEngine
//!
//! Engine:
//!   - TranslationEngine: model construction, native vector allocation
//!   - BlockingService: synchronous single-model and pivot translation
//!
//! Native handles (manually released):
//!   - NativeModel, TextVector, OptionsVector, ResponseVector
//! ```

mod engine;
mod fetch;

pub use engine::{
    BlockingService, EngineFactory, ModelMemory, NativeHandle, NativeModel, OptionsVector,
    ResponseOptions, ResponseVector, ServiceConfig, TextVector, TranslationEngine,
};
pub use fetch::{FsFetcher, ResourceFetcher};
