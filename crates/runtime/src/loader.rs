//! Model construction pipeline
//!
//! Turns downloaded artifacts into registered native models: every
//! required file is read, copied into a buffer with its file type's
//! alignment and handed to the engine together with the rendered decoder
//! configuration.

use futures::future::{try_join, try_join_all};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

use translation_worker_config::ModelConfig;
use translation_worker_core::{
    AlignedBuffer, LanguageModelArtifact, LanguagePair, ModelBlob, ModelFileType, ModelLoadError,
    ModelMemory, Result, TranslationEngine,
};

use crate::registry::{LoadedModel, ModelRegistry};
use crate::state::LoadRequest;

/// Outcome of a successful construction run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConstructionReport {
    /// Outbound models were requested and all of them loaded
    pub outbound_enabled: bool,
    /// One entry per forward leg, in leg order, when quality estimation
    /// was requested: whether the leg carried a dedicated quality model
    pub supervised_qe: Vec<bool>,
}

/// Builds native models for language pairs and stores them in the registry
pub struct ModelBuilder {
    engine: Arc<dyn TranslationEngine>,
    registry: Arc<ModelRegistry>,
    config: ModelConfig,
}

impl ModelBuilder {
    pub fn new(
        engine: Arc<dyn TranslationEngine>,
        registry: Arc<ModelRegistry>,
        config: ModelConfig,
    ) -> Self {
        Self {
            engine,
            registry,
            config,
        }
    }

    /// Construct forward models, then outbound models if requested
    ///
    /// Forward failures abort the run. Outbound failures only disable
    /// outbound translation.
    pub async fn construct_translation_model(
        &self,
        request: &LoadRequest,
        artifacts: &[LanguageModelArtifact],
    ) -> Result<ConstructionReport> {
        let forward = self
            .construct_legs(
                &request.forward_pairs(),
                request.with_quality_estimation,
                artifacts,
            )
            .await?;

        let supervised_qe = if request.with_quality_estimation {
            forward.iter().map(|model| model.supervised_qe()).collect()
        } else {
            Vec::new()
        };

        let mut outbound_enabled = false;
        if request.with_outbound_translation {
            match self
                .construct_legs(&request.outbound_pairs(), false, artifacts)
                .await
            {
                Ok(_) => outbound_enabled = true,
                Err(e) => {
                    tracing::warn!(
                        pair = %request.pair.reversed(),
                        error = %e,
                        "Error constructing outbound translation model, outbound translation disabled"
                    );
                }
            }
        }

        Ok(ConstructionReport {
            outbound_enabled,
            supervised_qe,
        })
    }

    /// Construct the legs of one direction; pivot legs are built concurrently
    async fn construct_legs(
        &self,
        legs: &[LanguagePair],
        with_quality_estimation: bool,
        artifacts: &[LanguageModelArtifact],
    ) -> Result<Vec<Arc<LoadedModel>>> {
        match legs {
            [first, second] => {
                let (a, b) = try_join(
                    self.construct_model(first, with_quality_estimation, artifacts),
                    self.construct_model(second, with_quality_estimation, artifacts),
                )
                .await?;
                Ok(vec![a, b])
            }
            _ => {
                let mut models = Vec::with_capacity(legs.len());
                for pair in legs {
                    models.push(
                        self.construct_model(pair, with_quality_estimation, artifacts)
                            .await?,
                    );
                }
                Ok(models)
            }
        }
    }

    /// Construct and register the model of one pair
    ///
    /// A pair that is already registered is reused as is.
    pub async fn construct_model(
        &self,
        pair: &LanguagePair,
        with_quality_estimation: bool,
        artifacts: &[LanguageModelArtifact],
    ) -> Result<Arc<LoadedModel>> {
        if let Some(existing) = self.registry.get(pair) {
            tracing::debug!(pair = %pair, "Model already loaded, reusing");
            return Ok(existing);
        }

        let start = Instant::now();
        let key = pair.key();
        let artifact = artifacts
            .iter()
            .find(|artifact| artifact.name == key)
            .ok_or_else(|| ModelLoadError::ArtifactMissing(pair.clone()))?;

        let files = fetch_files(pair, artifact, with_quality_estimation).await?;
        let memory = align_files(pair, files)?;
        let supervised_qe = memory.has_quality_model();

        let config = self.config.render(with_quality_estimation);
        let native = self
            .engine
            .construct_model(&config, memory)
            .map_err(|e| ModelLoadError::Construction {
                pair: pair.clone(),
                message: e.to_string(),
            })?;

        let model = self
            .registry
            .insert(LoadedModel::new(pair.clone(), native, supervised_qe))?;

        tracing::info!(
            pair = %pair,
            supervised_qe,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Translation model constructed"
        );
        Ok(model)
    }
}

/// Read every file the pair needs, concurrently
///
/// The quality model is only read when quality estimation is requested.
/// `lex` and `qualityModel` may be absent; `model` and `vocab` may not.
async fn fetch_files(
    pair: &LanguagePair,
    artifact: &LanguageModelArtifact,
    with_quality_estimation: bool,
) -> Result<BTreeMap<ModelFileType, Vec<u8>>> {
    let mut wanted: Vec<(ModelFileType, &ModelBlob)> = Vec::new();
    for file_type in ModelFileType::ALL {
        if file_type == ModelFileType::QualityModel && !with_quality_estimation {
            continue;
        }
        match artifact.language_model_blobs.get(&file_type) {
            Some(blob) => wanted.push((file_type, blob)),
            None if is_required(file_type) => {
                return Err(ModelLoadError::MissingFile {
                    pair: pair.clone(),
                    file_type,
                }
                .into());
            }
            None => {
                tracing::debug!(pair = %pair, file_type = %file_type, "Optional model file absent");
            }
        }
    }

    let reads = wanted.into_iter().map(|(file_type, blob)| async move {
        let bytes = blob.read().await.map_err(|source| ModelLoadError::Fetch {
            pair: pair.clone(),
            file_type,
            blob: blob.to_string(),
            source,
        })?;
        Ok::<_, ModelLoadError>((file_type, bytes))
    });

    let files = try_join_all(reads).await?;
    Ok(files.into_iter().collect())
}

fn is_required(file_type: ModelFileType) -> bool {
    matches!(file_type, ModelFileType::Model | ModelFileType::Vocab)
}

/// Copy each file into a buffer aligned for its type
fn align_files(
    pair: &LanguagePair,
    mut files: BTreeMap<ModelFileType, Vec<u8>>,
) -> Result<ModelMemory> {
    let mut take = |file_type: ModelFileType| -> Result<Option<AlignedBuffer>> {
        let Some(bytes) = files.remove(&file_type) else {
            return Ok(None);
        };
        let alignment = file_type.alignment();
        let buffer = AlignedBuffer::from_bytes(&bytes, alignment)
            .map_err(|_| ModelLoadError::Alignment {
                file_type,
                alignment,
            })?;
        tracing::trace!(pair = %pair, file_type = %file_type, len = buffer.len(), "Aligned model file");
        Ok(Some(buffer))
    };

    let missing = |file_type| ModelLoadError::MissingFile {
        pair: pair.clone(),
        file_type,
    };

    let model = take(ModelFileType::Model)?.ok_or_else(|| missing(ModelFileType::Model))?;
    let shortlist = take(ModelFileType::Lex)?;
    let vocab = take(ModelFileType::Vocab)?.ok_or_else(|| missing(ModelFileType::Vocab))?;
    let quality_model = take(ModelFileType::QualityModel)?;

    Ok(ModelMemory {
        model,
        shortlist,
        vocabs: vec![vocab],
        quality_model,
    })
}
