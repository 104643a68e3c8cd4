//! Centralized constants for the translation worker
//!
//! Engine model defaults live here so the config defaults and the tests
//! agree on one set of values.

/// Engine model configuration defaults
///
/// Key names follow the decoder's command-line options.
pub mod model {
    pub const BEAM_SIZE: u32 = 1;
    pub const NORMALIZE: f32 = 1.0;
    pub const WORD_PENALTY: f32 = 0.0;
    pub const MAX_LENGTH_BREAK: u32 = 128;
    pub const MINI_BATCH_WORDS: u32 = 1024;
    /// Workspace size in MB
    pub const WORKSPACE: u32 = 128;
    pub const MAX_LENGTH_FACTOR: f32 = 2.0;
    /// `0` lets the engine run on the calling thread
    pub const CPU_THREADS: u32 = 0;
    pub const GEMM_PRECISION: &str = "int8shiftAlphaAll";
    pub const ALIGNMENT: &str = "soft";
}

/// Engine service defaults
pub mod engine {
    /// `0` disables translation caching
    pub const SERVICE_CACHE_SIZE: usize = 0;
}

/// Environment handling
pub mod env {
    /// Prefix for environment overrides, e.g. `TRANSLATION_WORKER__MODEL__BEAM_SIZE`
    pub const PREFIX: &str = "TRANSLATION_WORKER";
    pub const SEPARATOR: &str = "__";
    /// Directory searched for `default.*` and `{env}.*` config files
    pub const CONFIG_DIR: &str = "config";
}
