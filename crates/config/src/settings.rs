//! Main settings module

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::constants::{engine, env};
use crate::{ConfigError, ModelConfig};

/// Main worker settings
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Settings {
    /// Engine binary and service configuration
    #[serde(default)]
    pub engine: EngineSettings,

    /// Decoder options for every constructed model
    #[serde(default)]
    pub model: ModelConfig,

    /// Worker loop behaviour
    #[serde(default)]
    pub worker: WorkerSettings,

    /// Observability configuration
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

impl Settings {
    /// Create default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate settings
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.model.validate()?;
        self.validate_engine()?;
        self.validate_observability()?;
        Ok(())
    }

    fn validate_engine(&self) -> Result<(), ConfigError> {
        if let Some(path) = &self.engine.binary_path {
            if path.trim().is_empty() {
                return Err(ConfigError::InvalidValue {
                    field: "engine.binary_path".to_string(),
                    message: "Must not be empty when set".to_string(),
                });
            }
        }

        if self.engine.service_cache_size > 0 {
            tracing::warn!(
                cache_size = self.engine.service_cache_size,
                "Engine translation cache enabled"
            );
        }

        Ok(())
    }

    fn validate_observability(&self) -> Result<(), ConfigError> {
        let level = self.observability.log_level.to_ascii_lowercase();
        if !matches!(
            level.as_str(),
            "trace" | "debug" | "info" | "warn" | "error" | "off"
        ) {
            return Err(ConfigError::InvalidValue {
                field: "observability.log_level".to_string(),
                message: format!("Unknown log level '{}'", self.observability.log_level),
            });
        }
        Ok(())
    }
}

/// Engine configuration
///
/// `configEngine` messages from the host override the paths.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineSettings {
    /// Glue script accompanying the binary, recorded for the host
    #[serde(default)]
    pub script_path: Option<String>,

    /// Engine binary location
    #[serde(default)]
    pub binary_path: Option<String>,

    /// Error serialization helper script, recorded for the host
    #[serde(default)]
    pub serialize_error_script: Option<String>,

    /// Blocking service cache size
    #[serde(default = "default_service_cache_size")]
    pub service_cache_size: usize,
}

fn default_service_cache_size() -> usize {
    engine::SERVICE_CACHE_SIZE
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            script_path: None,
            binary_path: None,
            serialize_error_script: None,
            service_cache_size: default_service_cache_size(),
        }
    }
}

/// Worker loop configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerSettings {
    /// Yield to the scheduler between drained batches
    #[serde(default = "default_true")]
    pub yield_between_batches: bool,
}

impl Default for WorkerSettings {
    fn default() -> Self {
        Self {
            yield_between_batches: true,
        }
    }
}

/// Observability configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Enable JSON logging
    #[serde(default)]
    pub log_json: bool,

    /// Enable metrics
    #[serde(default = "default_true")]
    pub metrics_enabled: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_json: false,
            metrics_enabled: true,
        }
    }
}

/// Load settings from `config/` and the environment
///
/// Priority: env vars > config/{env}.* > config/default.* > defaults
pub fn load_settings(env_name: Option<&str>) -> Result<Settings, ConfigError> {
    load_settings_from(Path::new(env::CONFIG_DIR), env_name)
}

/// Load settings from a specific config directory
pub fn load_settings_from(dir: &Path, env_name: Option<&str>) -> Result<Settings, ConfigError> {
    let mut builder = Config::builder();

    let default_path = dir.join("default");
    builder = builder.add_source(File::with_name(&default_path.to_string_lossy()).required(false));

    if let Some(env_name) = env_name {
        let env_path = dir.join(env_name);
        builder = builder.add_source(File::with_name(&env_path.to_string_lossy()).required(false));
    }

    builder = builder.add_source(
        Environment::with_prefix(env::PREFIX)
            .separator(env::SEPARATOR)
            .try_parsing(true),
    );

    let config = builder.build()?;
    let settings: Settings = config.try_deserialize()?;

    settings.validate()?;

    Ok(settings)
}
