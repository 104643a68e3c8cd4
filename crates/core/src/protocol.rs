//! Host ↔ worker message protocol
//!
//! Messages travel as `{ "type": <tag>, "payload": <value> }` envelopes.
//! Unknown host→worker tags are ignored; a known tag with a payload that
//! does not decode is a protocol error.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::error::{Error, ErrorCategory, Result, SerializedError};
use crate::language::LanguagePair;
use crate::model_file::{ModelBlob, ModelFileType};
use crate::request::{TranslationBatch, TranslationRequest};

/// Where the engine binary and its companions live
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineLocation {
    #[serde(default)]
    pub engine_script_local_path: Option<String>,
    pub engine_wasm_local_path: String,
    #[serde(default)]
    pub serialize_error_script: Option<String>,
}

/// Downloaded files for one language pair, keyed by file type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LanguageModelArtifact {
    /// Registry key of the pair, e.g. `"ende"`
    pub name: String,
    pub language_model_blobs: BTreeMap<ModelFileType, ModelBlob>,
}

impl LanguageModelArtifact {
    pub fn new(pair: &LanguagePair) -> Self {
        Self {
            name: pair.key(),
            language_model_blobs: BTreeMap::new(),
        }
    }

    pub fn with_blob(mut self, file_type: ModelFileType, blob: ModelBlob) -> Self {
        self.language_model_blobs.insert(file_type, blob);
        self
    }
}

/// A model the worker asks the host to download
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LanguagePairInfo {
    pub name: String,
    pub with_quality_estimation: bool,
}

impl LanguagePairInfo {
    pub fn new(pair: &LanguagePair, with_quality_estimation: bool) -> Self {
        Self {
            name: pair.key(),
            with_quality_estimation,
        }
    }
}

/// Host → worker messages
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "payload", rename_all = "camelCase")]
pub enum HostMessage {
    /// Bootstrap: record where the engine binary lives
    ConfigEngine(EngineLocation),
    /// Translate one batch
    Translate(TranslationBatch),
    /// Model artifacts answering a previous `downloadLanguageModels`
    ResponseDownloadLanguageModels(Vec<LanguageModelArtifact>),
}

#[derive(Deserialize)]
struct Envelope {
    #[serde(rename = "type")]
    tag: String,
    #[serde(default)]
    payload: Value,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    Many(TranslationBatch),
    One(Box<TranslationRequest>),
}

impl HostMessage {
    /// Decode a host message envelope
    ///
    /// Returns `Ok(None)` for tags this worker does not handle.
    pub fn from_json(raw: &str) -> Result<Option<HostMessage>> {
        let envelope: Envelope = serde_json::from_str(raw)
            .map_err(|e| Error::protocol(format!("invalid envelope: {}", e)))?;
        Self::from_envelope(&envelope.tag, envelope.payload)
    }

    fn from_envelope(tag: &str, payload: Value) -> Result<Option<HostMessage>> {
        let message = match tag {
            "configEngine" => HostMessage::ConfigEngine(decode_payload(tag, payload)?),
            "translate" => {
                let batch = match decode_payload::<OneOrMany>(tag, payload)? {
                    OneOrMany::Many(batch) => batch,
                    OneOrMany::One(request) => vec![*request],
                };
                HostMessage::Translate(batch)
            }
            "responseDownloadLanguageModels" => {
                HostMessage::ResponseDownloadLanguageModels(decode_payload(tag, payload)?)
            }
            other => {
                tracing::debug!(tag = %other, "Ignoring unknown host message");
                return Ok(None);
            }
        };
        Ok(Some(message))
    }

    pub fn tag(&self) -> &'static str {
        match self {
            HostMessage::ConfigEngine(_) => "configEngine",
            HostMessage::Translate(_) => "translate",
            HostMessage::ResponseDownloadLanguageModels(_) => "responseDownloadLanguageModels",
        }
    }
}

fn decode_payload<T: serde::de::DeserializeOwned>(tag: &str, payload: Value) -> Result<T> {
    serde_json::from_value(payload)
        .map_err(|e| Error::protocol(format!("invalid '{}' payload: {}", tag, e)))
}

/// Coarse lifecycle signal shown by the host
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "tag", content = "args", rename_all = "camelCase")]
pub enum ProgressUpdate {
    LoadingTranslationEngine,
    ErrorLoadingWasm,
    TranslationEnabled,
    #[serde(rename = "translationEnabledNoOT")]
    TranslationEnabledNoOutbound,
    TranslationLoadedWithErrors,
    /// Items picked up for translation and not yet reported
    TranslationProgress { pending: usize },
}

/// Worker → host messages
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "camelCase")]
pub enum WorkerMessage {
    UpdateProgress(ProgressUpdate),
    DownloadLanguageModels(Vec<LanguagePairInfo>),
    #[serde(rename_all = "camelCase")]
    TranslationComplete {
        batch: TranslationBatch,
        word_count: usize,
        elapsed_ms: f64,
    },
    DisplayOutboundTranslation,
    ReportError(ErrorCategory),
    ReportException(SerializedError),
    #[serde(rename_all = "camelCase")]
    ReportPerformanceTimespan { metric: String, millis: u64 },
    ReportQeIsSupervised(bool),
}

impl WorkerMessage {
    pub fn progress(update: ProgressUpdate) -> Self {
        WorkerMessage::UpdateProgress(update)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
