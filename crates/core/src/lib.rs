//! Core traits and types for the translation worker
//!
//! This crate provides the foundational types shared by the config and
//! runtime crates:
//! - Language pairs and the pivot rule
//! - Translation requests and batches
//! - Model file types, their alignment contract and aligned buffers
//! - The host/worker message protocol
//! - Traits describing the native translation engine boundary
//! - Error types

pub mod aligned;
pub mod error;
pub mod language;
pub mod model_file;
pub mod protocol;
pub mod request;
pub mod response;
pub mod traits;

pub use aligned::AlignedBuffer;
pub use error::{
    EngineError, EngineLoadError, Error, ErrorCategory, ModelLoadError, Result, SerializedError,
    TranslationInputError,
};
pub use language::{is_pivoting_required, LanguagePair, PIVOT_LANGUAGE};
pub use model_file::{ModelBlob, ModelFileType};
pub use protocol::{
    EngineLocation, HostMessage, LanguageModelArtifact, LanguagePairInfo, ProgressUpdate,
    WorkerMessage,
};
pub use request::{RequestType, TranslationBatch, TranslationRequest};
pub use response::{ByteRange, TranslationResponse};

pub use traits::{
    BlockingService, EngineFactory, FsFetcher, ModelMemory, NativeHandle, NativeModel,
    OptionsVector, ResourceFetcher, ResponseOptions, ResponseVector, ServiceConfig, TextVector,
    TranslationEngine,
};
