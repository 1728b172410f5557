//! Leaf image classification
//!
//! - `local`: trained network over a fixed-size pixel array (arg-max index)
//! - `gemini`: image + instruction sent to the Gemini API (free text)
//!
//! Both sit behind the [`Classifier`] trait; downstream code never checks
//! which variant produced an output.

mod gemini;
mod local;
#[cfg(feature = "onnx")]
mod onnx;
mod types;

pub use gemini::{check_connectivity, GeminiClassifier};
pub use local::{load_model, LocalClassifier, ProbabilityModel};
pub use types::{ClassificationOutput, LeafImage};

use crate::error::Result;
use async_trait::async_trait;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

#[async_trait]
pub trait Classifier: Send + Sync {
    /// Short name recorded in analysis results
    fn name(&self) -> &str;

    async fn classify(&self, image: &LeafImage) -> Result<ClassificationOutput>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassifierKind {
    /// Locally trained network (needs the model file and class indices)
    Local,
    /// Gemini generative model (needs an API key)
    Gemini,
}

impl ClassifierKind {
    pub fn label(&self) -> &'static str {
        match self {
            ClassifierKind::Local => "local",
            ClassifierKind::Gemini => "gemini",
        }
    }
}

impl std::fmt::Display for ClassifierKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}
