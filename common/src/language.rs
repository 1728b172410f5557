//! Display/voice languages and the language → voice table

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Language the classification output is produced in
pub const BASE_LANGUAGE: Language = Language::English;

/// Voice used when a language has no voice configured
pub const DEFAULT_VOICE: &str = "en-US-AriaNeural";

/// Languages offered for display and speech
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    English,
    Urdu,
    Sindhi,
}

impl Language {
    pub const ALL: [Language; 3] = [Language::English, Language::Urdu, Language::Sindhi];

    /// ISO 639-1 code used by the translation service
    pub fn code(&self) -> &'static str {
        match self {
            Language::English => "en",
            Language::Urdu => "ur",
            Language::Sindhi => "sd",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Language::English => "English",
            Language::Urdu => "Urdu",
            Language::Sindhi => "Sindhi",
        }
    }

    pub fn is_base(&self) -> bool {
        *self == BASE_LANGUAGE
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl std::str::FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "english" | "en" => Ok(Language::English),
            "urdu" | "ur" => Ok(Language::Urdu),
            "sindhi" | "sd" => Ok(Language::Sindhi),
            _ => Err(format!("Unknown language: {}. Use english, urdu, or sindhi", s)),
        }
    }
}

/// Language → speech voice mapping
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoiceTable {
    #[serde(default)]
    pub voices: BTreeMap<Language, String>,
    #[serde(default = "default_fallback")]
    pub fallback: String,
}

fn default_fallback() -> String {
    DEFAULT_VOICE.to_string()
}

impl Default for VoiceTable {
    fn default() -> Self {
        let mut voices = BTreeMap::new();
        voices.insert(Language::English, "en-US-AriaNeural".to_string());
        voices.insert(Language::Urdu, "ur-PK-AsadNeural".to_string());
        // no Sindhi neural voice; Urdu is the closest available
        voices.insert(Language::Sindhi, "ur-PK-AsadNeural".to_string());
        Self {
            voices,
            fallback: default_fallback(),
        }
    }
}

impl VoiceTable {
    /// Table with no per-language voices
    pub fn empty() -> Self {
        Self {
            voices: BTreeMap::new(),
            fallback: default_fallback(),
        }
    }

    /// Voice for a language, the fallback voice when none is configured
    pub fn voice_for(&self, language: Language) -> &str {
        self.voices
            .get(&language)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
            .unwrap_or(self.fallback.as_str())
    }

    pub fn set_voice(&mut self, language: Language, voice: impl Into<String>) {
        self.voices.insert(language, voice.into());
    }
}
