//! Text translation for display and speech
//!
//! Google's public `translate_a/single` endpoint (`client=gtx`); long texts
//! are split on line boundaries to stay under the request size limit.

use crate::error::{PlantAiError, Result};
use async_trait::async_trait;
use plant_disease_common::Language;

pub const GOOGLE_TRANSLATE_URL: &str = "https://translate.googleapis.com/translate_a/single";

/// Service limit is 5000 characters per request
const MAX_CHUNK_CHARS: usize = 4500;

#[async_trait]
pub trait Translator: Send + Sync {
    async fn translate(&self, text: &str, target: Language) -> Result<String>;
}

pub struct GoogleTranslator {
    client: reqwest::Client,
    url: String,
}

impl GoogleTranslator {
    pub fn new(client: reqwest::Client) -> Self {
        Self {
            client,
            url: GOOGLE_TRANSLATE_URL.to_string(),
        }
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    async fn translate_chunk(&self, chunk: &str, target: Language) -> Result<String> {
        let response = self
            .client
            .get(&self.url)
            .query(&[
                ("client", "gtx"),
                ("sl", "auto"),
                ("tl", target.code()),
                ("dt", "t"),
                ("q", chunk),
            ])
            .send()
            .await
            .map_err(|e| PlantAiError::Translation(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(PlantAiError::Translation(format!("service returned {}", status)));
        }

        let payload: serde_json::Value = response
            .json()
            .await
            .map_err(|e| PlantAiError::Translation(format!("invalid response: {}", e)))?;

        parse_response(&payload)
    }
}

#[async_trait]
impl Translator for GoogleTranslator {
    async fn translate(&self, text: &str, target: Language) -> Result<String> {
        let mut translated = Vec::new();
        for chunk in split_chunks(text, MAX_CHUNK_CHARS) {
            translated.push(self.translate_chunk(&chunk, target).await?);
        }
        log::debug!("translated {} chars to {}", text.len(), target.code());
        Ok(translated.join("\n"))
    }
}

/// Joins the translated segments of `[[["out","in",...],...],...]`
fn parse_response(payload: &serde_json::Value) -> Result<String> {
    let segments = payload
        .get(0)
        .and_then(|v| v.as_array())
        .ok_or_else(|| PlantAiError::Translation("unexpected response layout".into()))?;

    let text: String = segments
        .iter()
        .filter_map(|segment| segment.get(0).and_then(|v| v.as_str()))
        .collect();

    if text.trim().is_empty() {
        return Err(PlantAiError::Translation("empty translation".into()));
    }
    Ok(text)
}

/// Splits on line boundaries; a single oversized line is cut by characters
fn split_chunks(text: &str, max_chars: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for line in text.lines() {
        let line_len = line.chars().count();

        if line_len > max_chars {
            if !current.is_empty() {
                chunks.push(std::mem::take(&mut current));
                current_len = 0;
            }
            let chars: Vec<char> = line.chars().collect();
            chunks.extend(chars.chunks(max_chars).map(|c| c.iter().collect::<String>()));
            continue;
        }

        let added = if current.is_empty() { line_len } else { line_len + 1 };
        if current_len + added > max_chars {
            chunks.push(std::mem::take(&mut current));
            current_len = 0;
        }

        if !current.is_empty() {
            current.push('\n');
            current_len += 1;
        }
        current.push_str(line);
        current_len += line_len;
    }

    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_response_joins_segments() {
        let payload = json!([[["سلام ", "Hello ", null], ["دنیا", "world", null]], null, "en"]);
        assert_eq!(parse_response(&payload).unwrap(), "سلام دنیا");
    }

    #[test]
    fn test_parse_response_rejects_bad_layout() {
        assert!(matches!(
            parse_response(&json!({"error": "quota"})),
            Err(PlantAiError::Translation(_))
        ));
        assert!(matches!(
            parse_response(&json!([[]])),
            Err(PlantAiError::Translation(_))
        ));
    }

    #[test]
    fn test_short_text_is_one_chunk() {
        assert_eq!(split_chunks("a\nb", 100), vec!["a\nb".to_string()]);
        assert!(split_chunks("", 100).is_empty());
    }

    #[test]
    fn test_chunks_respect_limit() {
        let text = (0..50).map(|i| format!("line {:02}", i)).collect::<Vec<_>>().join("\n");
        let chunks = split_chunks(&text, 40);
        assert!(chunks.len() > 1);
        assert!(chunks.iter().all(|c| c.chars().count() <= 40));
        assert_eq!(chunks.join("\n"), text);
    }

    #[tokio::test]
    async fn test_unreachable_service_is_translation_error() {
        let translator = GoogleTranslator::new(reqwest::Client::new()).with_url("http://127.0.0.1:9/translate");
        let err = translator.translate("Solution: Spray", Language::Urdu).await.unwrap_err();
        assert!(matches!(err, PlantAiError::Translation(_)));
    }

    #[test]
    fn test_long_line_is_cut() {
        let chunks = split_chunks(&"x".repeat(25), 10);
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[2], "xxxxx");
    }
}
