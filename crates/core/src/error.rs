//! Error types for the translation worker

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::language::LanguagePair;
use crate::model_file::ModelFileType;

pub type Result<T> = std::result::Result<T, Error>;

/// Failure to obtain a usable engine; fatal to the whole worker
#[derive(Error, Debug)]
pub enum EngineLoadError {
    #[error("Engine binary location not configured")]
    NotConfigured,

    #[error("Error loading engine as buffer from {path}: {source}")]
    Download {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Error instantiating engine: {0}")]
    Instantiate(String),

    #[error("Error creating translation service: {0}")]
    Service(String),
}

/// Failure to construct the model of one language pair
#[derive(Error, Debug)]
pub enum ModelLoadError {
    #[error("No language model artifact provided for '{0}'")]
    ArtifactMissing(LanguagePair),

    #[error("Language model '{pair}' is missing required file '{file_type}'")]
    MissingFile {
        pair: LanguagePair,
        file_type: ModelFileType,
    },

    #[error("Error fetching \"{file_type}:{blob}\" for '{pair}': {source}")]
    Fetch {
        pair: LanguagePair,
        file_type: ModelFileType,
        blob: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid alignment {alignment} for {file_type}")]
    Alignment {
        file_type: ModelFileType,
        alignment: usize,
    },

    #[error("Engine failed to construct model '{pair}': {message}")]
    Construction { pair: LanguagePair, message: String },

    #[error("Model '{0}' is already loaded")]
    AlreadyLoaded(LanguagePair),

    #[error("Engine not loaded")]
    EngineNotLoaded,
}

/// Malformed batch rejected before reaching the engine
#[derive(Error, Debug, PartialEq, Eq)]
pub enum TranslationInputError {
    #[error("No Translation Options provided")]
    NoOptions,

    #[error("No text provided to translate")]
    NoText,
}

/// Failure reported by the native engine during a call
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Native call failed: {0}")]
    Native(String),

    #[error("Engine returned {actual} responses for {expected} texts")]
    ResponseMismatch { expected: usize, actual: usize },
}

/// Worker errors
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    EngineLoad(#[from] EngineLoadError),

    #[error(transparent)]
    ModelLoad(#[from] ModelLoadError),

    #[error("Outbound translation unavailable: {0}")]
    OutboundModelUnavailable(String),

    #[error(transparent)]
    TranslationInput(#[from] TranslationInputError),

    #[error(transparent)]
    TranslationEngine(#[from] EngineError),

    #[error("Translation model '{0}' not loaded")]
    ModelNotLoaded(LanguagePair),

    #[error("Protocol error: {0}")]
    Protocol(String),
}

impl Error {
    pub fn protocol(msg: impl Into<String>) -> Self {
        Error::Protocol(msg.into())
    }

    /// Category reported to the host alongside the serialized error
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::EngineLoad(EngineLoadError::NotConfigured)
            | Error::EngineLoad(EngineLoadError::Download { .. }) => ErrorCategory::EngineDownload,
            Error::EngineLoad(_) => ErrorCategory::EngineLoad,
            Error::ModelLoad(_) | Error::OutboundModelUnavailable(_) => ErrorCategory::ModelLoad,
            Error::TranslationInput(_) | Error::Protocol(_) => ErrorCategory::Translation,
            Error::TranslationEngine(_) | Error::ModelNotLoaded(_) => ErrorCategory::Marian,
        }
    }

    /// Whether the worker can keep serving requests after this error
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Error::OutboundModelUnavailable(_) | Error::TranslationInput(_) | Error::Protocol(_)
        )
    }

    fn kind(&self) -> &'static str {
        match self {
            Error::EngineLoad(_) => "EngineLoadError",
            Error::ModelLoad(_) => "ModelLoadError",
            Error::OutboundModelUnavailable(_) => "OutboundModelUnavailable",
            Error::TranslationInput(_) => "TranslationInputError",
            Error::TranslationEngine(_) | Error::ModelNotLoaded(_) => "TranslationEngineError",
            Error::Protocol(_) => "ProtocolError",
        }
    }
}

/// Error tag accompanying `reportError`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    EngineDownload,
    EngineLoad,
    ModelLoad,
    Translation,
    Marian,
}

impl ErrorCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCategory::EngineDownload => "engine_download",
            ErrorCategory::EngineLoad => "engine_load",
            ErrorCategory::ModelLoad => "model_load",
            ErrorCategory::Translation => "translation",
            ErrorCategory::Marian => "marian",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error as forwarded to the host in `reportException`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializedError {
    pub name: String,
    pub message: String,
    /// Messages of the `source()` chain, outermost first
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub chain: Vec<String>,
}

impl From<&Error> for SerializedError {
    fn from(err: &Error) -> Self {
        let mut chain = Vec::new();
        let mut source = std::error::Error::source(err);
        while let Some(cause) = source {
            chain.push(cause.to_string());
            source = cause.source();
        }
        Self {
            name: err.kind().to_string(),
            message: err.to_string(),
            chain,
        }
    }
}
