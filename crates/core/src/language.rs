//! Language pairs and the pivot rule

use serde::{Deserialize, Serialize};
use std::fmt;

/// Intermediary language used to chain two models when no direct model exists
pub const PIVOT_LANGUAGE: &str = "en";

/// Whether translating `from` → `to` has to go through [`PIVOT_LANGUAGE`]
///
/// Pivoting is needed iff neither endpoint is the pivot language.
pub fn is_pivoting_required(from: &str, to: &str) -> bool {
    from != PIVOT_LANGUAGE && to != PIVOT_LANGUAGE
}

/// Directional `(from, to)` key identifying one loaded model
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LanguagePair {
    pub from: String,
    pub to: String,
}

impl LanguagePair {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }

    /// Model registry key, the two codes concatenated (`"fr"`, `"en"` → `"fren"`)
    pub fn key(&self) -> String {
        format!("{}{}", self.from, self.to)
    }

    /// Same pair in the opposite direction
    pub fn reversed(&self) -> Self {
        Self::new(self.to.clone(), self.from.clone())
    }

    pub fn requires_pivoting(&self) -> bool {
        is_pivoting_required(&self.from, &self.to)
    }

    /// Model legs needed to translate along this pair
    ///
    /// Returns `[from→pivot, pivot→to]` when pivoting, otherwise `[from→to]`.
    pub fn legs(&self) -> Vec<LanguagePair> {
        if self.requires_pivoting() {
            vec![
                Self::new(self.from.clone(), PIVOT_LANGUAGE),
                Self::new(PIVOT_LANGUAGE, self.to.clone()),
            ]
        } else {
            vec![self.clone()]
        }
    }
}

impl fmt::Display for LanguagePair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.from, self.to)
    }
}
