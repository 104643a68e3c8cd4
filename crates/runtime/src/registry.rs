//! Loaded models keyed by language pair

use parking_lot::Mutex;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use translation_worker_core::{LanguagePair, ModelLoadError, NativeModel};

/// A constructed native model for one language pair
///
/// The native model is released when the last reference is dropped.
pub struct LoadedModel {
    pair: LanguagePair,
    native: Box<dyn NativeModel>,
    supervised_qe: bool,
}

impl LoadedModel {
    pub fn new(pair: LanguagePair, native: Box<dyn NativeModel>, supervised_qe: bool) -> Self {
        Self {
            pair,
            native,
            supervised_qe,
        }
    }

    pub fn pair(&self) -> &LanguagePair {
        &self.pair
    }

    pub fn native(&self) -> &dyn NativeModel {
        self.native.as_ref()
    }

    /// Whether a dedicated quality estimation model was loaded
    pub fn supervised_qe(&self) -> bool {
        self.supervised_qe
    }
}

impl Drop for LoadedModel {
    fn drop(&mut self) {
        tracing::debug!(pair = %self.pair, "Releasing translation model");
        self.native.release();
    }
}

impl fmt::Debug for LoadedModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadedModel")
            .field("pair", &self.pair)
            .field("supervised_qe", &self.supervised_qe)
            .finish()
    }
}

/// Shared map of loaded models
///
/// At most one model exists per pair; inserting a second one is refused
/// instead of silently leaking the first.
#[derive(Debug, Default)]
pub struct ModelRegistry {
    models: Mutex<HashMap<LanguagePair, Arc<LoadedModel>>>,
}

impl ModelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, model: LoadedModel) -> Result<Arc<LoadedModel>, ModelLoadError> {
        let mut models = self.models.lock();
        if models.contains_key(model.pair()) {
            return Err(ModelLoadError::AlreadyLoaded(model.pair().clone()));
        }
        let model = Arc::new(model);
        models.insert(model.pair().clone(), model.clone());
        Ok(model)
    }

    pub fn get(&self, pair: &LanguagePair) -> Option<Arc<LoadedModel>> {
        self.models.lock().get(pair).cloned()
    }

    pub fn contains(&self, pair: &LanguagePair) -> bool {
        self.models.lock().contains_key(pair)
    }

    pub fn len(&self) -> usize {
        self.models.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.lock().is_empty()
    }

    /// Registered pair keys, sorted
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.models.lock().keys().map(|p| p.key()).collect();
        keys.sort();
        keys
    }

    /// Release every model and clear the map
    ///
    /// Models still borrowed by an in-flight batch are released when that
    /// batch drops its reference.
    pub fn delete_all(&self) -> usize {
        let drained: Vec<_> = self.models.lock().drain().collect();
        let count = drained.len();
        drop(drained);
        tracing::info!(count, "Deleted all translation models");
        count
    }
}
