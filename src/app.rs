//! Startup wiring
//!
//! Loads the label catalog, metadata sheet, model and API key once, before a
//! session serves any request. Failures here are configuration errors.

use crate::classifier::{load_model, Classifier, ClassifierKind, GeminiClassifier, LocalClassifier};
use crate::cli::ResourceArgs;
use crate::composer::ResultComposer;
use crate::config::Config;
use crate::device::{self, DeviceOptions};
use crate::error::{PlantAiError, Result};
use crate::metadata_source::load_metadata;
use crate::session::Session;
use crate::speech::EdgeTts;
use crate::translate::GoogleTranslator;
use plant_disease_common::{Language, LabelCatalog, MetadataTable};
use std::path::PathBuf;
use std::sync::Arc;

/// Resource paths after applying command-line overrides to the config
#[derive(Debug, Clone, Default)]
pub struct ResourcePaths {
    pub metadata: Option<PathBuf>,
    pub catalog: Option<PathBuf>,
    pub model: Option<PathBuf>,
}

impl ResourcePaths {
    pub fn resolve(args: &ResourceArgs, config: &Config) -> Self {
        Self {
            metadata: args.metadata.clone().or_else(|| config.metadata_path.clone()),
            catalog: args.catalog.clone().or_else(|| config.catalog_path.clone()),
            model: args.model.clone().or_else(|| config.model_path.clone()),
        }
    }
}

/// Catalog and metadata needed by the chosen classifier
pub struct Resources {
    pub catalog: Option<Arc<LabelCatalog>>,
    pub metadata: Option<Arc<MetadataTable>>,
}

impl Resources {
    /// The local classifier needs both files; Gemini uses metadata only when given
    pub fn load(kind: ClassifierKind, paths: &ResourcePaths) -> Result<Self> {
        let catalog = match (&paths.catalog, kind) {
            (Some(path), _) => Some(Arc::new(LabelCatalog::load(path)?)),
            (None, ClassifierKind::Local) => {
                return Err(PlantAiError::Config(
                    "local classifier needs --catalog or catalog_path in config".into(),
                ))
            }
            (None, ClassifierKind::Gemini) => None,
        };

        let metadata = match (&paths.metadata, kind) {
            (Some(path), _) => Some(Arc::new(load_metadata(path)?)),
            (None, ClassifierKind::Local) => {
                return Err(PlantAiError::Config(
                    "local classifier needs --metadata or metadata_path in config".into(),
                ))
            }
            (None, ClassifierKind::Gemini) => None,
        };

        if let Some(catalog) = &catalog {
            log::info!("label catalog: {} classes", catalog.len());
        }
        Ok(Self { catalog, metadata })
    }
}

pub fn build_classifier(
    kind: ClassifierKind,
    config: &Config,
    paths: &ResourcePaths,
    resources: &Resources,
) -> Result<Arc<dyn Classifier>> {
    match kind {
        ClassifierKind::Local => {
            let model_path = paths.model.as_ref().ok_or_else(|| {
                PlantAiError::Config("local classifier needs --model or model_path in config".into())
            })?;
            let model = load_model(model_path, config.input_size)?;

            let mut classifier = LocalClassifier::new(model);
            if let Some(catalog) = &resources.catalog {
                classifier = classifier.with_class_count(catalog.len());
            }
            Ok(Arc::new(classifier))
        }
        ClassifierKind::Gemini => {
            let api_key = config.get_api_key()?;
            Ok(Arc::new(GeminiClassifier::new(
                config.http_client()?,
                api_key,
                config.model.clone(),
            )))
        }
    }
}

pub fn build_composer(config: &Config, resources: &Resources) -> Result<ResultComposer> {
    let translator = Arc::new(GoogleTranslator::new(config.http_client()?));
    let synthesizer = Arc::new(EdgeTts::new(&config.tts_program)?);

    let mut composer = ResultComposer::new(translator, synthesizer).with_voices(config.voices.clone());
    if let Some(catalog) = &resources.catalog {
        composer = composer.with_catalog(catalog.clone());
    }
    if let Some(metadata) = &resources.metadata {
        composer = composer.with_metadata(metadata.clone());
    }
    Ok(composer)
}

/// Everything a session needs, acquired once
pub fn build_session(
    kind: ClassifierKind,
    config: &Config,
    args: &ResourceArgs,
    display: Language,
    voice: Language,
    devices: DeviceOptions,
) -> Result<Session> {
    let paths = ResourcePaths::resolve(args, config);
    let resources = Resources::load(kind, &paths)?;
    let classifier = build_classifier(kind, config, &paths, &resources)?;
    let composer = build_composer(config, &resources)?;

    Ok(Session::new(classifier, Arc::new(composer), config.audio_dir.clone())
        .with_languages(display, voice)
        .with_player(device::default_player(devices))
        .with_camera(device::default_camera(devices)))
}
