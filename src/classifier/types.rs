use crate::error::{PlantAiError, Result};
use crate::scanner::is_image_file;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::Path;

/// Image supplied by the user for one request
#[derive(Debug, Clone)]
pub struct LeafImage {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl LeafImage {
    pub fn from_path(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(PlantAiError::FileNotFound(path.display().to_string()));
        }
        if !is_image_file(path) {
            return Err(PlantAiError::ImageLoad(format!(
                "{} is not a jpg/jpeg/png image",
                path.display()
            )));
        }

        let bytes = std::fs::read(path)?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();

        Ok(Self::from_bytes(file_name, bytes))
    }

    pub fn from_bytes(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let file_name = file_name.into();
        let mime_type = mime_type_for(&file_name).to_string();
        Self {
            file_name,
            mime_type,
            bytes,
        }
    }

    /// SHA-256 of the image bytes, hex encoded
    pub fn fingerprint(&self) -> String {
        hex::encode(Sha256::digest(&self.bytes))
    }

    pub fn decode(&self) -> Result<image::DynamicImage> {
        image::load_from_memory(&self.bytes)
            .map_err(|e| PlantAiError::ImageLoad(format!("{}: {}", self.file_name, e)))
    }
}

fn mime_type_for(file_name: &str) -> &'static str {
    let lower = file_name.to_lowercase();
    if lower.ends_with(".png") {
        "image/png"
    } else {
        "image/jpeg"
    }
}

/// What a classifier produced for one image
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ClassificationOutput {
    /// Local model: arg-max class index and the full distribution
    #[serde(rename_all = "camelCase")]
    Structured {
        index: usize,
        confidence: f32,
        distribution: Vec<f32>,
    },
    /// Remote model: free text, not guaranteed to follow the requested layout
    FreeText { text: String },
}

impl ClassificationOutput {
    /// Picks the arg-max of a probability distribution
    pub fn from_distribution(distribution: Vec<f32>) -> Option<Self> {
        let (index, confidence) = distribution
            .iter()
            .copied()
            .enumerate()
            .filter(|(_, p)| !p.is_nan())
            .fold(None, |best: Option<(usize, f32)>, (i, p)| match best {
                Some((_, best_p)) if best_p >= p => best,
                _ => Some((i, p)),
            })?;

        Some(ClassificationOutput::Structured {
            index,
            confidence,
            distribution,
        })
    }

    pub fn free_text(text: impl Into<String>) -> Self {
        ClassificationOutput::FreeText { text: text.into() }
    }
}
