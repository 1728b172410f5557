use super::{ClassificationOutput, Classifier, LeafImage};
use crate::error::{PlantAiError, Result};
use async_trait::async_trait;
use image::imageops::FilterType;
use std::path::Path;

/// Trained network that maps a fixed-size pixel array to class probabilities
pub trait ProbabilityModel: Send + Sync {
    /// Expected input as `[height, width, channels]`
    fn input_shape(&self) -> [usize; 3];

    /// Pixels are row-major HWC, rescaled to `[0, 1]`
    fn predict(&self, pixels: &[f32]) -> Result<Vec<f32>>;
}

/// Loads the trained network from disk
#[cfg(feature = "onnx")]
pub fn load_model(path: &Path, input_size: u32) -> Result<Box<dyn ProbabilityModel>> {
    Ok(Box::new(super::onnx::OnnxModel::load(path, input_size)?))
}

/// Loads the trained network from disk
#[cfg(not(feature = "onnx"))]
pub fn load_model(path: &Path, _input_size: u32) -> Result<Box<dyn ProbabilityModel>> {
    Err(PlantAiError::Model(format!(
        "cannot load {}: built without the `onnx` feature",
        path.display()
    )))
}

pub struct LocalClassifier {
    model: Box<dyn ProbabilityModel>,
    class_count: Option<usize>,
}

impl LocalClassifier {
    pub fn new(model: Box<dyn ProbabilityModel>) -> Self {
        Self {
            model,
            class_count: None,
        }
    }

    /// Rejects distributions whose length differs from the label catalog
    pub fn with_class_count(mut self, class_count: usize) -> Self {
        self.class_count = Some(class_count);
        self
    }

    pub fn input_shape(&self) -> [usize; 3] {
        self.model.input_shape()
    }

    /// Resizes to the model's input shape and rescales to `[0, 1]`
    pub fn preprocess(&self, image: &image::DynamicImage) -> Result<Vec<f32>> {
        let [height, width, channels] = self.model.input_shape();
        if channels != 3 {
            return Err(PlantAiError::Model(format!(
                "expected an RGB model, got {} channels",
                channels
            )));
        }

        let resized = image
            .resize_exact(width as u32, height as u32, FilterType::Triangle)
            .to_rgb8();

        Ok(resized.as_raw().iter().map(|v| *v as f32 / 255.0).collect())
    }

    /// Runs the model on an already-prepared pixel array
    pub fn classify_pixels(&self, pixels: &[f32], shape: [usize; 3]) -> Result<ClassificationOutput> {
        let expected = self.model.input_shape();
        let expected_len: usize = expected.iter().product();

        if shape != expected || pixels.len() != expected_len {
            return Err(PlantAiError::ShapeMismatch {
                expected: format_shape(expected),
                actual: format!("{} ({} values)", format_shape(shape), pixels.len()),
            });
        }

        let distribution = self.model.predict(pixels)?;
        if let Some(class_count) = self.class_count {
            if distribution.len() != class_count {
                return Err(PlantAiError::Model(format!(
                    "model returned {} classes, catalog has {}",
                    distribution.len(),
                    class_count
                )));
            }
        }

        ClassificationOutput::from_distribution(distribution)
            .ok_or_else(|| PlantAiError::Model("model returned an empty distribution".into()))
    }
}

#[async_trait]
impl Classifier for LocalClassifier {
    fn name(&self) -> &str {
        "local"
    }

    async fn classify(&self, image: &LeafImage) -> Result<ClassificationOutput> {
        let decoded = image.decode()?;
        let pixels = self.preprocess(&decoded)?;
        let output = self.classify_pixels(&pixels, self.model.input_shape())?;

        if let ClassificationOutput::Structured { index, confidence, .. } = &output {
            log::debug!("{}: class {} ({:.3})", image.file_name, index, confidence);
        }
        Ok(output)
    }
}

fn format_shape(shape: [usize; 3]) -> String {
    format!("{}x{}x{}", shape[0], shape[1], shape[2])
}
