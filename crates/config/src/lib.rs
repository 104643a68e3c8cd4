//! Configuration management for the translation worker
//!
//! Supports loading configuration from:
//! - TOML/YAML/JSON files in `config/` (`default.*`, then `{env}.*`)
//! - Environment variables (`TRANSLATION_WORKER__` prefix, `__` separator)
//!
//! The engine model options are rendered into the text block the engine
//! expects by [`ModelConfig::render`].

pub mod constants;
pub mod model;
pub mod settings;

pub use model::ModelConfig;
pub use settings::{
    load_settings, load_settings_from, EngineSettings, ObservabilityConfig, Settings,
    WorkerSettings,
};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },
}

impl From<config::ConfigError> for ConfigError {
    fn from(err: config::ConfigError) -> Self {
        match err {
            config::ConfigError::NotFound(key) => ConfigError::FileNotFound(key),
            other => ConfigError::ParseError(other.to_string()),
        }
    }
}
