use crate::error::{PlantAiError, Result};
use plant_disease_common::VoiceTable;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variables checked for the Gemini key, in order
pub const API_KEY_VARS: &[&str] = &["API_KEY", "GEMINI_API_KEY"];

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_key: Option<String>,
    pub model: String,
    /// HTTP timeout for remote calls; 0 disables it
    pub timeout_seconds: u64,
    /// Square input size the local model was trained on
    pub input_size: u32,
    pub metadata_path: Option<PathBuf>,
    pub catalog_path: Option<PathBuf>,
    pub model_path: Option<PathBuf>,
    pub audio_dir: PathBuf,
    pub tts_program: String,
    pub voices: VoiceTable,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            model: "gemini-2.5-flash".into(),
            timeout_seconds: 120,
            input_size: 224,
            metadata_path: None,
            catalog_path: None,
            model_path: None,
            audio_dir: PathBuf::from("."),
            tts_program: "edge-tts".into(),
            voices: VoiceTable::default(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(config_path: &Path) -> Result<Self> {
        if config_path.exists() {
            let content = std::fs::read_to_string(config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| PlantAiError::Config("home directory not found".into()))?;
        Ok(home.join(".config").join("plant-ai").join("config.json"))
    }

    /// Resolves the Gemini key once at startup; environment wins over the file
    pub fn get_api_key(&self) -> Result<String> {
        let from_env = API_KEY_VARS
            .iter()
            .filter_map(|var| std::env::var(var).ok())
            .find(|key| !key.trim().is_empty());

        if let Some(key) = from_env {
            return Ok(key.trim().to_string());
        }

        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .map(str::to_string)
            .ok_or(PlantAiError::MissingApiKey)
    }

    pub fn set_api_key(&mut self, key: String) -> Result<()> {
        self.api_key = Some(key);
        self.save()
    }

    pub fn timeout(&self) -> Option<std::time::Duration> {
        (self.timeout_seconds > 0).then(|| std::time::Duration::from_secs(self.timeout_seconds))
    }

    /// HTTP client shared by the remote classifier and the translator
    pub fn http_client(&self) -> Result<reqwest::Client> {
        let mut builder = reqwest::Client::builder().user_agent(concat!("plant-ai/", env!("CARGO_PKG_VERSION")));
        if let Some(timeout) = self.timeout() {
            builder = builder.timeout(timeout);
        }
        builder
            .build()
            .map_err(|e| PlantAiError::Config(format!("HTTP client: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use plant_disease_common::Language;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("none.json")).unwrap();
        assert_eq!(config.model, "gemini-2.5-flash");
        assert_eq!(config.input_size, 224);
        assert_eq!(config.voices.voice_for(Language::Urdu), "ur-PK-AsadNeural");
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"model": "gemini-2.0-flash", "timeout_seconds": 0}"#).unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.model, "gemini-2.0-flash");
        assert!(config.timeout().is_none());
        assert_eq!(config.tts_program, "edge-tts");
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plant-ai").join("config.json");

        let mut config = Config::default();
        config.api_key = Some("secret".into());
        config.voices.set_voice(Language::Sindhi, "sd-Test");
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.api_key.as_deref(), Some("secret"));
        assert_eq!(loaded.voices.voice_for(Language::Sindhi), "sd-Test");
    }
}
