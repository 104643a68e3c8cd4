//! Engine lifecycle state machine

use std::fmt;

use translation_worker_core::{LanguagePair, LanguagePairInfo, TranslationRequest};

/// What the first translate request asked the engine to be able to do
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadRequest {
    pub pair: LanguagePair,
    pub with_outbound_translation: bool,
    pub with_quality_estimation: bool,
}

impl LoadRequest {
    pub fn from_request(request: &TranslationRequest) -> Self {
        Self {
            pair: request.language_pair(),
            with_outbound_translation: request.with_outbound_translation,
            with_quality_estimation: request.with_quality_estimation,
        }
    }

    /// Model legs for the requested direction
    pub fn forward_pairs(&self) -> Vec<LanguagePair> {
        self.pair.legs()
    }

    /// Model legs for the reverse direction, empty unless outbound was asked for
    pub fn outbound_pairs(&self) -> Vec<LanguagePair> {
        if self.with_outbound_translation {
            self.pair.reversed().legs()
        } else {
            Vec::new()
        }
    }

    /// Models the host has to download
    ///
    /// Forward legs inherit the quality estimation flag; outbound legs
    /// never carry it.
    pub fn pairs_to_download(&self) -> Vec<LanguagePairInfo> {
        let forward = self
            .forward_pairs()
            .into_iter()
            .map(|pair| LanguagePairInfo::new(&pair, self.with_quality_estimation));
        let outbound = self
            .outbound_pairs()
            .into_iter()
            .map(|pair| LanguagePairInfo::new(&pair, false));
        forward.chain(outbound).collect()
    }
}

/// Engine readiness
///
/// `Ready` is terminal. A failed load leaves the machine in `Loading`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum EngineState {
    #[default]
    Unloaded,
    Loading(LoadRequest),
    Ready,
}

impl EngineState {
    pub fn name(&self) -> &'static str {
        match self {
            EngineState::Unloaded => "unloaded",
            EngineState::Loading(_) => "loading",
            EngineState::Ready => "ready",
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, EngineState::Ready)
    }
}

impl fmt::Display for EngineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
