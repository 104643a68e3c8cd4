//! Batch translation executor
//!
//! One batch becomes one engine call. Items keep their positions: the
//! response vector is read back in submission order and assigned by index.

use std::sync::Arc;
use std::time::Instant;

use translation_worker_core::{
    BlockingService, EngineError, Error, LanguagePair, ProgressUpdate, ResponseOptions, Result,
    TranslationBatch, TranslationEngine, TranslationInputError, TranslationRequest,
    PIVOT_LANGUAGE,
};

use crate::handle::NativeGuard;
use crate::registry::{LoadedModel, ModelRegistry};
use crate::reporter::Reporter;
use crate::text::{escape_html, word_count};

/// Original plain text of an item escaped for quality estimation
#[derive(Debug)]
struct Substitution {
    index: usize,
    source_paragraph: String,
}

/// Runs batches through the engine's blocking service
pub struct BatchExecutor<'a> {
    engine: &'a dyn TranslationEngine,
    service: &'a dyn BlockingService,
    registry: &'a ModelRegistry,
    reporter: &'a Reporter,
}

impl<'a> BatchExecutor<'a> {
    pub fn new(
        engine: &'a dyn TranslationEngine,
        service: &'a dyn BlockingService,
        registry: &'a ModelRegistry,
        reporter: &'a Reporter,
    ) -> Self {
        Self {
            engine,
            service,
            registry,
            reporter,
        }
    }

    /// Translate a batch and report the outcome to the host
    pub fn execute(&self, mut batch: TranslationBatch) -> Result<()> {
        let started = Instant::now();
        let result = self.translate(&mut batch);
        self.report(batch, started, result)
    }

    /// Send `translationComplete`, or the error and its state tag
    ///
    /// The error is handed back to the caller after reporting.
    pub fn report(&self, batch: TranslationBatch, started: Instant, result: Result<()>) -> Result<()> {
        let elapsed = started.elapsed();
        match result {
            Ok(()) => {
                let words: usize = batch
                    .iter()
                    .map(|item| word_count(&item.source_paragraph))
                    .sum();
                tracing::debug!(
                    items = batch.len(),
                    words,
                    elapsed_ms = elapsed.as_millis() as u64,
                    "Batch translated"
                );
                self.reporter.translation_complete(batch, words, elapsed);
                Ok(())
            }
            Err(e) => {
                tracing::debug!(
                    items = batch.len(),
                    elapsed_ms = elapsed.as_millis() as u64,
                    error = %e,
                    "Batch failed"
                );
                self.reporter
                    .failure(&e, ProgressUpdate::TranslationLoadedWithErrors);
                Err(e)
            }
        }
    }

    /// Set `translated_paragraph` on every item of the batch
    ///
    /// Items escaped for quality estimation get their plain text and HTML
    /// flag back whether or not translation succeeded. Their translation
    /// stays HTML.
    pub fn translate(&self, batch: &mut [TranslationRequest]) -> Result<()> {
        if batch.is_empty() {
            return Err(TranslationInputError::NoOptions.into());
        }

        let substitutions = transcode_for_quality_estimation(batch);
        let result = self.dispatch(batch);
        restore(batch, substitutions);

        for (item, translation) in batch.iter_mut().zip(result?) {
            item.translated_paragraph = Some(translation);
        }
        Ok(())
    }

    /// Build the native vectors, call the engine and decode the responses
    ///
    /// Every vector is owned by a guard and released on return.
    fn dispatch(&self, batch: &[TranslationRequest]) -> Result<Vec<String>> {
        let pair = batch[0].language_pair();

        let mut texts = NativeGuard::new(self.engine.text_vector(), "texts");
        let mut submitted = Vec::with_capacity(batch.len());
        for (index, item) in batch.iter().enumerate() {
            if item.source_paragraph.trim().is_empty() {
                continue;
            }
            texts.push(&item.source_paragraph);
            submitted.push(index);
        }
        if texts.is_empty() {
            return Err(TranslationInputError::NoText.into());
        }

        let mut options = NativeGuard::new(self.engine.options_vector(), "options");
        for &index in &submitted {
            let item = &batch[index];
            options.push(ResponseOptions {
                quality_scores: item.with_quality_estimation,
                alignment: true,
                html: item.is_html,
            });
        }
        if options.is_empty() {
            return Err(TranslationInputError::NoOptions.into());
        }

        let responses = if pair.requires_pivoting() {
            let source_to_pivot = self.model(&LanguagePair::new(pair.from.clone(), PIVOT_LANGUAGE))?;
            let pivot_to_target = self.model(&LanguagePair::new(PIVOT_LANGUAGE, pair.to.clone()))?;
            tracing::debug!(pair = %pair, texts = texts.len(), "Translating via pivot");
            self.service.translate_via_pivoting(
                source_to_pivot.native(),
                pivot_to_target.native(),
                &*texts,
                &*options,
            )?
        } else {
            let model = self.model(&pair)?;
            tracing::debug!(pair = %pair, texts = texts.len(), "Translating");
            self.service.translate(model.native(), &*texts, &*options)?
        };
        let responses = NativeGuard::new(responses, "responses");

        let mismatch = || EngineError::ResponseMismatch {
            expected: submitted.len(),
            actual: responses.len(),
        };
        if responses.len() != submitted.len() {
            return Err(mismatch().into());
        }

        // Paragraphs that were not submitted translate to themselves.
        let mut translations: Vec<String> = batch
            .iter()
            .map(|item| item.source_paragraph.clone())
            .collect();
        for (position, &index) in submitted.iter().enumerate() {
            let response = responses.get(position).ok_or_else(mismatch)?;
            translations[index] = response.translated_text;
        }
        Ok(translations)
    }

    fn model(&self, pair: &LanguagePair) -> Result<Arc<LoadedModel>> {
        self.registry
            .get(pair)
            .ok_or_else(|| Error::ModelNotLoaded(pair.clone()))
    }
}

/// Escape plain-text items that request quality estimation and mark them HTML
fn transcode_for_quality_estimation(batch: &mut [TranslationRequest]) -> Vec<Substitution> {
    let mut substitutions = Vec::new();
    for (index, item) in batch.iter_mut().enumerate() {
        if !item.with_quality_estimation || item.is_html {
            continue;
        }
        let escaped = escape_html(&item.source_paragraph);
        substitutions.push(Substitution {
            index,
            source_paragraph: std::mem::replace(&mut item.source_paragraph, escaped),
        });
        item.is_html = true;
    }
    substitutions
}

fn restore(batch: &mut [TranslationRequest], substitutions: Vec<Substitution>) {
    for substitution in substitutions {
        let item = &mut batch[substitution.index];
        item.source_paragraph = substitution.source_paragraph;
        item.is_html = false;
    }
}
