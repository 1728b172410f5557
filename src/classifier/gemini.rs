//! Gemini API classification
//!
//! The leaf image goes out as base64 inline data together with the
//! plant-pathologist instruction; the reply is returned as free text.

use super::{ClassificationOutput, Classifier, LeafImage};
use crate::error::{PlantAiError, Result};
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine};
use plant_disease_common::build_diagnosis_prompt;
use plant_disease_common::prompts::build_connectivity_prompt;
use serde::{Deserialize, Serialize};

pub const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// generateContent request body
#[derive(Debug, Serialize)]
struct GeminiRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Part {
    Text { text: String },
    InlineData { inline_data: InlineData },
}

#[derive(Debug, Serialize)]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<ResponseContent>,
}

#[derive(Debug, Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: String,
}

pub struct GeminiClassifier {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiClassifier {
    pub fn new(client: reqwest::Client, api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client,
            api_key: api_key.into(),
            model: model.into(),
            base_url: GEMINI_API_BASE.to_string(),
        }
    }

    /// Points the client at a different API root (proxies, tests)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn endpoint(&self) -> String {
        format!("{}/{}:generateContent", self.base_url, self.model)
    }

    async fn generate(&self, request: &GeminiRequest) -> Result<String> {
        log::debug!(
            "POST {} ({} parts)",
            self.endpoint(),
            request.contents.iter().map(|c| c.parts.len()).sum::<usize>()
        );

        let response = self
            .client
            .post(self.endpoint())
            .query(&[("key", self.api_key.as_str())])
            .json(request)
            .send()
            .await
            .map_err(|e| PlantAiError::RemoteUnavailable(without_key(&e.to_string(), &self.api_key)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PlantAiError::RemoteUnavailable(format!(
                "Gemini API returned {}: {}",
                status,
                body.trim()
            )));
        }

        let payload: GeminiResponse = response
            .json()
            .await
            .map_err(|e| PlantAiError::RemoteUnavailable(format!("invalid response: {}", e)))?;

        response_text(payload)
    }

    /// Sends a text-only greeting and returns the reply
    pub async fn ping(&self) -> Result<String> {
        let request = text_request(build_connectivity_prompt().to_string());
        self.generate(&request).await
    }
}

#[async_trait]
impl Classifier for GeminiClassifier {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn classify(&self, image: &LeafImage) -> Result<ClassificationOutput> {
        let request = image_request(build_diagnosis_prompt(), image);
        let text = self.generate(&request).await?;
        log::debug!("{}: {} chars from {}", image.file_name, text.len(), self.model);
        Ok(ClassificationOutput::free_text(text))
    }
}

/// Connectivity and key check against the configured model
pub async fn check_connectivity(client: reqwest::Client, api_key: &str, model: &str) -> Result<String> {
    GeminiClassifier::new(client, api_key, model).ping().await
}

fn image_request(prompt: String, image: &LeafImage) -> GeminiRequest {
    GeminiRequest {
        contents: vec![Content {
            parts: vec![
                Part::Text { text: prompt },
                Part::InlineData {
                    inline_data: InlineData {
                        mime_type: image.mime_type.clone(),
                        data: STANDARD.encode(&image.bytes),
                    },
                },
            ],
        }],
        generation_config: GenerationConfig { temperature: 0.2 },
    }
}

fn text_request(prompt: String) -> GeminiRequest {
    GeminiRequest {
        contents: vec![Content {
            parts: vec![Part::Text { text: prompt }],
        }],
        generation_config: GenerationConfig { temperature: 0.2 },
    }
}

fn response_text(payload: GeminiResponse) -> Result<String> {
    let text: String = payload
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|content| content.parts.into_iter().map(|p| p.text).collect())
        .unwrap_or_default();

    if text.trim().is_empty() {
        return Err(PlantAiError::RemoteUnavailable("empty response from Gemini".into()));
    }
    Ok(text.trim().to_string())
}

/// reqwest errors echo the request URL, which carries the key
fn without_key(message: &str, api_key: &str) -> String {
    if api_key.is_empty() {
        message.to_string()
    } else {
        message.replace(api_key, "***")
    }
}
