//! Engine model configuration
//!
//! The engine takes its decoder options as a fixed-format text block. Keys
//! are rendered in the order below, one `key: value` per line.

use serde::{Deserialize, Serialize};

use crate::constants::model as defaults;
use crate::ConfigError;

/// Decoder options passed to native model construction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    #[serde(default = "default_beam_size")]
    pub beam_size: u32,

    #[serde(default = "default_normalize")]
    pub normalize: f32,

    #[serde(default = "default_word_penalty")]
    pub word_penalty: f32,

    #[serde(default = "default_max_length_break")]
    pub max_length_break: u32,

    #[serde(default = "default_mini_batch_words")]
    pub mini_batch_words: u32,

    /// Workspace size in MB
    #[serde(default = "default_workspace")]
    pub workspace: u32,

    #[serde(default = "default_max_length_factor")]
    pub max_length_factor: f32,

    #[serde(default = "default_cpu_threads")]
    pub cpu_threads: u32,

    #[serde(default = "default_true")]
    pub quiet: bool,

    #[serde(default = "default_true")]
    pub quiet_translation: bool,

    #[serde(default = "default_gemm_precision")]
    pub gemm_precision: String,

    #[serde(default = "default_alignment")]
    pub alignment: String,
}

fn default_beam_size() -> u32 {
    defaults::BEAM_SIZE
}
fn default_normalize() -> f32 {
    defaults::NORMALIZE
}
fn default_word_penalty() -> f32 {
    defaults::WORD_PENALTY
}
fn default_max_length_break() -> u32 {
    defaults::MAX_LENGTH_BREAK
}
fn default_mini_batch_words() -> u32 {
    defaults::MINI_BATCH_WORDS
}
fn default_workspace() -> u32 {
    defaults::WORKSPACE
}
fn default_max_length_factor() -> f32 {
    defaults::MAX_LENGTH_FACTOR
}
fn default_cpu_threads() -> u32 {
    defaults::CPU_THREADS
}
fn default_true() -> bool {
    true
}
fn default_gemm_precision() -> String {
    defaults::GEMM_PRECISION.to_string()
}
fn default_alignment() -> String {
    defaults::ALIGNMENT.to_string()
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            beam_size: default_beam_size(),
            normalize: default_normalize(),
            word_penalty: default_word_penalty(),
            max_length_break: default_max_length_break(),
            mini_batch_words: default_mini_batch_words(),
            workspace: default_workspace(),
            max_length_factor: default_max_length_factor(),
            cpu_threads: default_cpu_threads(),
            quiet: true,
            quiet_translation: true,
            gemm_precision: default_gemm_precision(),
            alignment: default_alignment(),
        }
    }
}

impl ModelConfig {
    /// Render the text block handed to the engine
    ///
    /// `skip-cost` is the negation of `with_quality_estimation`: scores are
    /// only computed when quality estimation is requested.
    pub fn render(&self, with_quality_estimation: bool) -> String {
        let entries: [(&str, String); 13] = [
            ("beam-size", self.beam_size.to_string()),
            ("normalize", format_float(self.normalize)),
            ("word-penalty", format_float(self.word_penalty)),
            ("max-length-break", self.max_length_break.to_string()),
            ("mini-batch-words", self.mini_batch_words.to_string()),
            ("workspace", self.workspace.to_string()),
            ("max-length-factor", format_float(self.max_length_factor)),
            ("skip-cost", (!with_quality_estimation).to_string()),
            ("cpu-threads", self.cpu_threads.to_string()),
            ("quiet", self.quiet.to_string()),
            ("quiet-translation", self.quiet_translation.to_string()),
            ("gemm-precision", self.gemm_precision.clone()),
            ("alignment", self.alignment.clone()),
        ];

        entries
            .iter()
            .map(|(key, value)| format!("{}: {}\n", key, value))
            .collect()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.beam_size == 0 {
            return Err(ConfigError::InvalidValue {
                field: "model.beam_size".to_string(),
                message: "Must be at least 1".to_string(),
            });
        }

        if self.mini_batch_words == 0 {
            return Err(ConfigError::InvalidValue {
                field: "model.mini_batch_words".to_string(),
                message: "Must be at least 1".to_string(),
            });
        }

        if self.max_length_factor <= 0.0 {
            return Err(ConfigError::InvalidValue {
                field: "model.max_length_factor".to_string(),
                message: format!("Must be positive, got {}", self.max_length_factor),
            });
        }

        if self.workspace == 0 {
            return Err(ConfigError::InvalidValue {
                field: "model.workspace".to_string(),
                message: "Must be at least 1 MB".to_string(),
            });
        }

        if self.gemm_precision.trim().is_empty() {
            return Err(ConfigError::MissingField("model.gemm_precision".to_string()));
        }

        if !matches!(self.alignment.as_str(), "soft" | "hard" | "none") {
            return Err(ConfigError::InvalidValue {
                field: "model.alignment".to_string(),
                message: format!("Expected soft, hard or none, got '{}'", self.alignment),
            });
        }

        Ok(())
    }
}

/// Whole non-zero values keep one decimal (`1.0`); zero renders as `0`
fn format_float(value: f32) -> String {
    if value.fract() == 0.0 && value != 0.0 {
        format!("{:.1}", value)
    } else {
        value.to_string()
    }
}
