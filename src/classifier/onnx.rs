//! ONNX export of the trained leaf classifier

use super::ProbabilityModel;
use crate::error::{PlantAiError, Result};
use ndarray::Array4;
use ort::session::Session;
use std::path::Path;

pub struct OnnxModel {
    session: Session,
    input_name: String,
    shape: [usize; 3],
}

impl OnnxModel {
    pub fn load(path: &Path, input_size: u32) -> Result<Self> {
        if !path.is_file() {
            return Err(PlantAiError::FileNotFound(path.display().to_string()));
        }

        let session = Session::builder()
            .and_then(|builder| builder.commit_from_file(path))
            .map_err(|e| PlantAiError::Model(format!("{}: {}", path.display(), e)))?;

        let input_name = session
            .inputs
            .first()
            .map(|input| input.name.to_string())
            .ok_or_else(|| PlantAiError::Model(format!("{} has no inputs", path.display())))?;

        log::info!("loaded model {} (input '{}')", path.display(), input_name);

        let size = input_size as usize;
        Ok(Self {
            session,
            input_name,
            shape: [size, size, 3],
        })
    }
}

impl ProbabilityModel for OnnxModel {
    fn input_shape(&self) -> [usize; 3] {
        self.shape
    }

    fn predict(&self, pixels: &[f32]) -> Result<Vec<f32>> {
        let [height, width, channels] = self.shape;
        let model_error = |e: ort::Error| PlantAiError::Model(e.to_string());

        let batch = Array4::from_shape_vec((1, height, width, channels), pixels.to_vec())
            .map_err(|e| PlantAiError::ShapeMismatch {
                expected: format!("{}x{}x{}", height, width, channels),
                actual: e.to_string(),
            })?;
        let value = ort::value::Value::from_array(batch).map_err(model_error)?;
        let outputs = self
            .session
            .run(ort::inputs![self.input_name.as_str() => value].map_err(model_error)?)
            .map_err(model_error)?;

        let probabilities = outputs[0].try_extract_tensor::<f32>().map_err(model_error)?;
        Ok(probabilities.iter().copied().collect())
    }
}
