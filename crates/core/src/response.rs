//! Decoded engine responses

use serde::{Deserialize, Serialize};

/// Half-open range of UTF-8 byte offsets into a response text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ByteRange {
    pub begin: usize,
    pub end: usize,
}

impl ByteRange {
    pub fn new(begin: usize, end: usize) -> Self {
        Self { begin, end }
    }

    /// Substring of `text` covered by this range
    ///
    /// Ranges are clamped to the text length. A range that splits a
    /// multi-byte character is decoded lossily rather than rejected.
    pub fn slice(&self, text: &str) -> String {
        let bytes = text.as_bytes();
        let end = self.end.min(bytes.len());
        let begin = self.begin.min(end);
        String::from_utf8_lossy(&bytes[begin..end]).into_owned()
    }
}

/// One translated paragraph as decoded from the engine response vector
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationResponse {
    pub original_text: String,
    pub translated_text: String,
    /// Sentence boundaries within `original_text`
    #[serde(default)]
    pub source_sentences: Vec<ByteRange>,
    /// Sentence boundaries within `translated_text`, parallel to `source_sentences`
    #[serde(default)]
    pub translated_sentences: Vec<ByteRange>,
}

impl TranslationResponse {
    pub fn new(original_text: impl Into<String>, translated_text: impl Into<String>) -> Self {
        Self {
            original_text: original_text.into(),
            translated_text: translated_text.into(),
            ..Default::default()
        }
    }

    pub fn translated_sentences(&self) -> Vec<String> {
        self.translated_sentences
            .iter()
            .map(|range| range.slice(&self.translated_text))
            .collect()
    }

    pub fn source_sentences(&self) -> Vec<String> {
        self.source_sentences
            .iter()
            .map(|range| range.slice(&self.original_text))
            .collect()
    }
}
