//! Translation requests as sent by the host

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::language::LanguagePair;

/// Origin of a translation request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestType {
    /// User-authored text translated back for verification
    Outbound,
    /// Page content translated into the user's language; unknown types land here
    #[default]
    #[serde(other)]
    Inbound,
}

/// A single paragraph to translate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslationRequest {
    pub source_language: String,
    pub target_language: String,
    pub source_paragraph: String,
    #[serde(default, rename = "isHTML")]
    pub is_html: bool,
    #[serde(default)]
    pub with_quality_estimation: bool,
    /// Only meaningful on the request that triggers engine loading
    #[serde(default)]
    pub with_outbound_translation: bool,
    #[serde(default, rename = "type")]
    pub request_type: RequestType,
    /// Set by the worker once the batch has been translated
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub translated_paragraph: Option<String>,
    /// Host bookkeeping fields, passed through untouched
    #[serde(flatten)]
    pub context: Map<String, Value>,
}

impl TranslationRequest {
    pub fn new(
        source_language: impl Into<String>,
        target_language: impl Into<String>,
        source_paragraph: impl Into<String>,
    ) -> Self {
        Self {
            source_language: source_language.into(),
            target_language: target_language.into(),
            source_paragraph: source_paragraph.into(),
            is_html: false,
            with_quality_estimation: false,
            with_outbound_translation: false,
            request_type: RequestType::Inbound,
            translated_paragraph: None,
            context: Map::new(),
        }
    }

    pub fn with_html(mut self, is_html: bool) -> Self {
        self.is_html = is_html;
        self
    }

    pub fn with_quality_estimation(mut self, enabled: bool) -> Self {
        self.with_quality_estimation = enabled;
        self
    }

    pub fn with_outbound_translation(mut self, enabled: bool) -> Self {
        self.with_outbound_translation = enabled;
        self
    }

    pub fn outbound(mut self) -> Self {
        self.request_type = RequestType::Outbound;
        self
    }

    pub fn language_pair(&self) -> LanguagePair {
        LanguagePair::new(self.source_language.clone(), self.target_language.clone())
    }

    pub fn is_outbound(&self) -> bool {
        self.request_type == RequestType::Outbound
    }
}

/// Ordered requests sharing one language pair, translated in a single engine call
pub type TranslationBatch = Vec<TranslationRequest>;
