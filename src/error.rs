use thiserror::Error;

#[derive(Error, Debug)]
pub enum PlantAiError {
    #[error("Config error: {0}")]
    Config(String),

    #[error("API key is not set. Set API_KEY in the environment or .env, or run `plant-ai config --set-api-key YOUR_KEY`")]
    MissingApiKey,

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Folder not found: {0}")]
    FolderNotFound(String),

    #[error("Image load error: {0}")]
    ImageLoad(String),

    #[error("Input shape mismatch: model expects {expected}, got {actual}")]
    ShapeMismatch { expected: String, actual: String },

    #[error("Model error: {0}")]
    Model(String),

    #[error("Remote service unavailable: {0}")]
    RemoteUnavailable(String),

    #[error("Translation failed: {0}")]
    Translation(String),

    #[error("Speech synthesis failed: {0}")]
    Synthesis(String),

    #[error("Audio playback failed: {0}")]
    Playback(String),

    #[error("Camera capture failed: {0}")]
    Camera(String),

    #[error("Invalid metadata sheet: {0}")]
    InvalidMetadata(String),

    #[error("Excel generation error: {0}")]
    ExcelGeneration(String),

    #[error("No image selected. Select a leaf image first")]
    NoImageSelected,

    #[error("No analysis yet. Analyze an image first")]
    NoAnalysis,

    #[error("CLI execution error: {0}")]
    CliExecution(String),

    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Common(#[from] plant_disease_common::Error),
}

impl PlantAiError {
    /// Errors that only stop the current request
    pub fn is_request_scoped(&self) -> bool {
        !matches!(
            self,
            PlantAiError::MissingApiKey | PlantAiError::Config(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, PlantAiError>;
