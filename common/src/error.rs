//! Error type definitions

use thiserror::Error;

/// Shared error type
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid label catalog: {0}")]
    InvalidCatalog(String),

    #[error("Invalid metadata table: {0}")]
    InvalidMetadata(String),

    /// The model predicted a class the catalog does not know about
    #[error("Class index {index} is outside the label catalog (0..{len}); model and catalog versions differ")]
    ClassIndexOutOfRange { index: usize, len: usize },

    #[error("No metadata found for '{0}'")]
    MetadataNotFound(String),
}

impl Error {
    /// True for catalog/metadata lookup failures
    pub fn is_lookup_failure(&self) -> bool {
        matches!(
            self,
            Error::ClassIndexOutOfRange { .. } | Error::MetadataNotFound(_)
        )
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
