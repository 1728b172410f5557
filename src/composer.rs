//! Classification output → display text and speech
//!
//! - Structured index: label catalog → metadata table → rendered record
//! - Free text: used verbatim, fields extracted for callers that need them
//! - Translation failures fall back to the English base text with a warning

use crate::classifier::ClassificationOutput;
use crate::error::{PlantAiError, Result};
use crate::speech::SpeechSynthesizer;
use crate::translate::Translator;
use plant_disease_common::{
    extract_diagnosis, render_record, DiseaseLabel, Language, LabelCatalog, MetadataRecord,
    MetadataTable, VoiceTable, BASE_LANGUAGE,
};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;

/// Non-fatal problems shown alongside a result
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Warning {
    TranslationFailed { language: Language, reason: String },
    VoiceTranslationFailed { language: Language, reason: String },
    MetadataMissing { label: String },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::TranslationFailed { language, reason } => write!(
                f,
                "Translation to {} failed ({}); showing English text",
                language, reason
            ),
            Warning::VoiceTranslationFailed { language, reason } => write!(
                f,
                "Translation to {} for speech failed ({}); speaking English text",
                language, reason
            ),
            Warning::MetadataMissing { label } => {
                write!(f, "No metadata row for '{}'; fields shown as Unknown", label)
            }
        }
    }
}

/// English text built from a classification output
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BaseText {
    pub text: String,
    pub record: MetadataRecord,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<DiseaseLabel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f32>,
    pub warnings: Vec<Warning>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComposedDisplay {
    pub language: Language,
    pub text: String,
    pub base: BaseText,
    pub warnings: Vec<Warning>,
}

#[derive(Debug, Clone)]
pub struct ComposedSpeech {
    pub language: Language,
    pub voice: String,
    pub text: String,
    pub audio: Vec<u8>,
    pub warnings: Vec<Warning>,
}

pub struct ResultComposer {
    translator: Arc<dyn Translator>,
    synthesizer: Arc<dyn SpeechSynthesizer>,
    voices: VoiceTable,
    catalog: Option<Arc<LabelCatalog>>,
    metadata: Option<Arc<MetadataTable>>,
}

impl ResultComposer {
    pub fn new(translator: Arc<dyn Translator>, synthesizer: Arc<dyn SpeechSynthesizer>) -> Self {
        Self {
            translator,
            synthesizer,
            voices: VoiceTable::default(),
            catalog: None,
            metadata: None,
        }
    }

    pub fn with_voices(mut self, voices: VoiceTable) -> Self {
        self.voices = voices;
        self
    }

    /// Needed to resolve structured (local model) outputs
    pub fn with_catalog(mut self, catalog: Arc<LabelCatalog>) -> Self {
        self.catalog = Some(catalog);
        self
    }

    pub fn with_metadata(mut self, metadata: Arc<MetadataTable>) -> Self {
        self.metadata = Some(metadata);
        self
    }

    pub fn voices(&self) -> &VoiceTable {
        &self.voices
    }

    /// Builds the English base text.
    ///
    /// An index outside the catalog is a lookup failure and fails the request;
    /// a label without a metadata row degrades to Unknown fields.
    pub fn base_text(&self, output: &ClassificationOutput) -> Result<BaseText> {
        match output {
            ClassificationOutput::Structured { index, confidence, .. } => {
                let catalog = self.catalog.as_ref().ok_or_else(|| {
                    PlantAiError::Config("no label catalog loaded for structured results".into())
                })?;
                let label = catalog.label_for(*index)?.clone();

                let mut warnings = Vec::new();
                let record = match self.metadata.as_ref().and_then(|m| m.metadata_for(label.name())) {
                    Some(record) => record.clone(),
                    None => {
                        log::warn!("no metadata row for label '{}'", label);
                        warnings.push(Warning::MetadataMissing {
                            label: label.to_string(),
                        });
                        MetadataRecord::unknown(&label.display_name())
                    }
                };

                Ok(BaseText {
                    text: render_record(&record, Some(*confidence)),
                    record,
                    label: Some(label),
                    confidence: Some(*confidence),
                    warnings,
                })
            }
            ClassificationOutput::FreeText { text } => {
                let record = extract_diagnosis(text);
                log::debug!("extracted {} fields from free text", record.known_fields());
                Ok(BaseText {
                    text: text.clone(),
                    record,
                    label: None,
                    confidence: None,
                    warnings: Vec::new(),
                })
            }
        }
    }

    pub async fn compose_display(
        &self,
        output: &ClassificationOutput,
        language: Language,
    ) -> Result<ComposedDisplay> {
        let base = self.base_text(output)?;
        let mut warnings = base.warnings.clone();

        let text = match self.translate_or_base(&base.text, language).await {
            Ok(text) => text,
            Err(reason) => {
                warnings.push(Warning::TranslationFailed { language, reason });
                base.text.clone()
            }
        };

        Ok(ComposedDisplay {
            language,
            text,
            base,
            warnings,
        })
    }

    /// Translates for the voice language and synthesizes audio.
    ///
    /// Synthesis failures are returned as errors; there is no audio to fall
    /// back to.
    pub async fn compose_speech(
        &self,
        output: &ClassificationOutput,
        language: Language,
    ) -> Result<ComposedSpeech> {
        let base = self.base_text(output)?;
        let mut warnings = base.warnings;
        let voice = self.voices.voice_for(language).to_string();

        let text = match self.translate_or_base(&base.text, language).await {
            Ok(text) => text,
            Err(reason) => {
                warnings.push(Warning::VoiceTranslationFailed { language, reason });
                base.text
            }
        };

        let audio = self.synthesizer.synthesize(&text, &voice).await?;
        log::info!("synthesized {} bytes with {}", audio.len(), voice);

        Ok(ComposedSpeech {
            language,
            voice,
            text,
            audio,
            warnings,
        })
    }

    /// `Err` carries the failure reason; the caller decides the fallback
    async fn translate_or_base(&self, text: &str, language: Language) -> std::result::Result<String, String> {
        if language == BASE_LANGUAGE {
            return Ok(text.to_string());
        }

        match self.translator.translate(text, language).await {
            Ok(translated) if !translated.trim().is_empty() => Ok(translated),
            Ok(_) => Err("empty translation".to_string()),
            Err(e) => {
                log::warn!("translation to {} failed: {}", language.code(), e);
                Err(e.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use plant_disease_common::NormalizedName;
    use std::sync::Mutex;

    struct PrefixTranslator;

    #[async_trait]
    impl Translator for PrefixTranslator {
        async fn translate(&self, text: &str, target: Language) -> Result<String> {
            Ok(format!("[{}] {}", target.code(), text))
        }
    }

    struct FailingTranslator;

    #[async_trait]
    impl Translator for FailingTranslator {
        async fn translate(&self, _text: &str, _target: Language) -> Result<String> {
            Err(PlantAiError::Translation("service down".into()))
        }
    }

    #[derive(Default)]
    struct RecordingSynthesizer {
        calls: Mutex<Vec<(String, String)>>,
    }

    #[async_trait]
    impl SpeechSynthesizer for RecordingSynthesizer {
        async fn synthesize(&self, text: &str, voice: &str) -> Result<Vec<u8>> {
            self.calls
                .lock()
                .unwrap()
                .push((text.to_string(), voice.to_string()));
            Ok(b"ID3".to_vec())
        }
    }

    fn catalog() -> Arc<LabelCatalog> {
        Arc::new(
            LabelCatalog::from_class_names(["apple_scab", "corn_rust", "healthy", "early_blight"])
                .unwrap(),
        )
    }

    fn metadata() -> Arc<MetadataTable> {
        Arc::new(
            MetadataTable::from_csv_str(
                "Plant Name,Disease,Solution\nTomato,Early Blight,Apply copper fungicide\n",
            )
            .unwrap(),
        )
    }

    fn composer(translator: Arc<dyn Translator>) -> (ResultComposer, Arc<RecordingSynthesizer>) {
        let synthesizer = Arc::new(RecordingSynthesizer::default());
        let composer = ResultComposer::new(translator, synthesizer.clone())
            .with_catalog(catalog())
            .with_metadata(metadata());
        (composer, synthesizer)
    }

    fn structured(index: usize) -> ClassificationOutput {
        ClassificationOutput::Structured {
            index,
            confidence: 0.92,
            distribution: vec![0.02, 0.03, 0.03, 0.92],
        }
    }

    #[tokio::test]
    async fn test_index_to_english_display() {
        let (composer, _) = composer(Arc::new(PrefixTranslator));
        let display = composer
            .compose_display(&structured(3), Language::English)
            .await
            .unwrap();

        assert!(display.text.contains("Apply copper fungicide"));
        assert!(display.text.contains("Plant Name: Tomato"));
        assert!(display.warnings.is_empty());
        assert_eq!(display.base.label, Some(DiseaseLabel::new("early_blight")));
    }

    #[tokio::test]
    async fn test_translated_display() {
        let (composer, _) = composer(Arc::new(PrefixTranslator));
        let display = composer
            .compose_display(&structured(3), Language::Urdu)
            .await
            .unwrap();
        assert!(display.text.starts_with("[ur] "));
        assert!(display.warnings.is_empty());
    }

    #[tokio::test]
    async fn test_translation_failure_falls_back_to_base_text() {
        let (composer, _) = composer(Arc::new(FailingTranslator));
        let display = composer
            .compose_display(&structured(3), Language::Sindhi)
            .await
            .unwrap();

        assert_eq!(display.text, display.base.text);
        assert!(!display.text.is_empty());
        assert!(matches!(
            display.warnings.as_slice(),
            [Warning::TranslationFailed { language: Language::Sindhi, .. }]
        ));
    }

    #[tokio::test]
    async fn test_index_out_of_range_fails_request() {
        let (composer, _) = composer(Arc::new(PrefixTranslator));
        let err = composer
            .compose_display(&structured(4), Language::English)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            PlantAiError::Common(plant_disease_common::Error::ClassIndexOutOfRange { index: 4, len: 4 })
        ));
    }

    #[tokio::test]
    async fn test_missing_metadata_gives_unknown_fields() {
        let (composer, _) = composer(Arc::new(PrefixTranslator));
        let base = composer.base_text(&structured(1)).unwrap();

        assert_eq!(base.record.disease, "Corn Rust");
        assert_eq!(base.record.solution, "Unknown");
        assert!(matches!(base.warnings.as_slice(), [Warning::MetadataMissing { .. }]));
    }

    #[tokio::test]
    async fn test_free_text_used_verbatim() {
        let (composer, _) = composer(Arc::new(PrefixTranslator));
        let text = "**Disease:** Leaf Rust\nSolution: Remove infected leaves";
        let base = composer
            .base_text(&ClassificationOutput::free_text(text))
            .unwrap();

        assert_eq!(base.text, text);
        assert_eq!(base.record.disease, "Leaf Rust");
        assert_eq!(base.record.plant_name, "Unknown");
        assert!(base.label.is_none());
    }

    #[tokio::test]
    async fn test_free_text_without_catalog() {
        let composer = ResultComposer::new(
            Arc::new(PrefixTranslator),
            Arc::new(RecordingSynthesizer::default()),
        );
        assert!(composer
            .base_text(&ClassificationOutput::free_text("Disease: X"))
            .is_ok());
        assert!(matches!(
            composer.base_text(&structured(0)),
            Err(PlantAiError::Config(_))
        ));
    }

    #[tokio::test]
    async fn test_speech_uses_voice_table_and_translation() {
        let (composer, synthesizer) = composer(Arc::new(PrefixTranslator));
        let speech = composer
            .compose_speech(&structured(3), Language::Urdu)
            .await
            .unwrap();

        assert_eq!(speech.voice, "ur-PK-AsadNeural");
        assert_eq!(speech.audio, b"ID3");
        let calls = synthesizer.calls.lock().unwrap();
        assert!(calls[0].0.starts_with("[ur] "));
    }

    #[tokio::test]
    async fn test_sindhi_without_voice_uses_fallback() {
        let (composer, synthesizer) = composer(Arc::new(FailingTranslator));
        let composer = composer.with_voices(VoiceTable::empty());
        let speech = composer
            .compose_speech(&structured(3), Language::Sindhi)
            .await
            .unwrap();

        assert_eq!(speech.voice, plant_disease_common::DEFAULT_VOICE);
        assert!(speech.text.contains("Apply copper fungicide"));
        assert!(matches!(
            speech.warnings.as_slice(),
            [Warning::VoiceTranslationFailed { .. }]
        ));
        assert_eq!(synthesizer.calls.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_metadata_lookup_key_is_label() {
        let table = metadata();
        assert!(table.metadata_for(&NormalizedName::new("early_blight")).is_some());
    }
}
