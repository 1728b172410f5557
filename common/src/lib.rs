//! Plant Disease Common Library
//!
//! CLI and session layer share these types and pure helpers:
//! - names: label/folder/column name normalization
//! - catalog: class index → disease label mapping
//! - metadata: disease metadata table
//! - reconcile: dataset folders vs. metadata rows diagnostic
//! - parser / render: free-text extraction and display rendering

pub mod catalog;
pub mod csv;
pub mod error;
pub mod language;
pub mod metadata;
pub mod names;
pub mod parser;
pub mod prompts;
pub mod reconcile;
pub mod render;

pub use catalog::LabelCatalog;
pub use error::{Error, Result};
pub use language::{Language, VoiceTable, BASE_LANGUAGE, DEFAULT_VOICE};
pub use metadata::{MetadataRecord, MetadataTable, UNKNOWN};
pub use names::{normalize_name, DiseaseLabel, NormalizedName};
pub use parser::extract_diagnosis;
pub use prompts::{build_diagnosis_prompt, DIAGNOSIS_FIELDS};
pub use reconcile::{reconcile, ReconciliationReport};
pub use render::render_record;
