//! Label catalog
//!
//! Class index → disease label mapping. Produced once from the dataset's class
//! folders and persisted next to the trained model as `class_indices.json`
//! (`{"label": index}`); the inverse orientation (`{"index": "label"}`) is
//! accepted when loading.

use crate::error::{Error, Result};
use crate::names::DiseaseLabel;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

/// Immutable class index → label mapping
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelCatalog {
    labels: Vec<DiseaseLabel>,
}

impl LabelCatalog {
    /// Builds the catalog from the classifier's discovered class ordering.
    ///
    /// # Arguments
    /// * `names` - class names in index order (index 0 first)
    ///
    /// # Returns
    /// * `Err(InvalidCatalog)` - no classes, or two names with the same label
    pub fn from_class_names<I, S>(names: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let labels: Vec<DiseaseLabel> = names
            .into_iter()
            .map(|n| DiseaseLabel::new(n.as_ref()))
            .collect();
        Self::from_labels(labels)
    }

    fn from_labels(labels: Vec<DiseaseLabel>) -> Result<Self> {
        if labels.is_empty() {
            return Err(Error::InvalidCatalog("no classes".into()));
        }

        let mut seen: HashMap<&str, usize> = HashMap::new();
        for (index, label) in labels.iter().enumerate() {
            if label.as_str().is_empty() {
                return Err(Error::InvalidCatalog(format!("class {} has an empty label", index)));
            }
            if let Some(previous) = seen.insert(label.as_str(), index) {
                return Err(Error::InvalidCatalog(format!(
                    "label '{}' is assigned to both class {} and class {}",
                    label, previous, index
                )));
            }
        }

        Ok(Self { labels })
    }

    /// Parses `class_indices.json` in either orientation
    pub fn from_json_str(json: &str) -> Result<Self> {
        let object: BTreeMap<String, Value> = serde_json::from_str(json)?;
        if object.is_empty() {
            return Err(Error::InvalidCatalog("no classes".into()));
        }

        let mut by_index: BTreeMap<usize, String> = BTreeMap::new();
        for (key, value) in &object {
            let (index, label) = match value {
                // {"label": index}
                Value::Number(n) => {
                    let index = n.as_u64().ok_or_else(|| {
                        Error::InvalidCatalog(format!("index for '{}' is not a non-negative integer: {}", key, n))
                    })?;
                    (index as usize, key.clone())
                }
                // {"index": "label"}
                Value::String(label) => {
                    let index = key.trim().parse::<usize>().map_err(|_| {
                        Error::InvalidCatalog(format!("key '{}' is not a class index", key))
                    })?;
                    (index, label.clone())
                }
                other => {
                    return Err(Error::InvalidCatalog(format!(
                        "unexpected value for '{}': {}",
                        key, other
                    )))
                }
            };

            if by_index.insert(index, label).is_some() {
                return Err(Error::InvalidCatalog(format!("class index {} is used twice", index)));
            }
        }

        // BTreeMap keys are sorted, so contiguity means key == position
        for (position, index) in by_index.keys().enumerate() {
            if *index != position {
                return Err(Error::InvalidCatalog(format!(
                    "class indices are not contiguous: missing {}",
                    position
                )));
            }
        }

        Self::from_class_names(by_index.into_values())
    }

    /// Reads a catalog file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    /// Serializes as `{"label": index}`
    pub fn to_json_string(&self) -> Result<String> {
        let object: serde_json::Map<String, Value> = self
            .labels
            .iter()
            .enumerate()
            .map(|(index, label)| (label.as_str().to_string(), Value::from(index)))
            .collect();
        Ok(serde_json::to_string_pretty(&Value::Object(object))?)
    }

    /// Writes the catalog file
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, self.to_json_string()?)?;
        Ok(())
    }

    /// Label for a predicted class index
    pub fn label_for(&self, index: usize) -> Result<&DiseaseLabel> {
        self.labels.get(index).ok_or(Error::ClassIndexOutOfRange {
            index,
            len: self.labels.len(),
        })
    }

    /// Class index of a label (raw or normalized)
    pub fn index_of(&self, label: &str) -> Option<usize> {
        let wanted = DiseaseLabel::new(label);
        self.labels.iter().position(|l| *l == wanted)
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &DiseaseLabel)> {
        self.labels.iter().enumerate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> LabelCatalog {
        LabelCatalog::from_class_names([
            "Apple___Apple_scab",
            "Apple___healthy",
            "Tomato___Bacterial_spot",
            "Tomato___Early_blight",
        ])
        .unwrap()
    }

    #[test]
    fn test_label_for_all_indices() {
        let catalog = sample();
        for index in 0..catalog.len() {
            let label = catalog.label_for(index).unwrap();
            assert!(!label.as_str().is_empty());
        }
        assert_eq!(catalog.label_for(3).unwrap().as_str(), "tomato_early_blight");
    }

    #[test]
    fn test_label_for_out_of_range() {
        let catalog = sample();
        let err = catalog.label_for(catalog.len()).unwrap_err();
        assert!(matches!(err, Error::ClassIndexOutOfRange { index: 4, len: 4 }));
        assert!(err.is_lookup_failure());
    }

    #[test]
    fn test_duplicate_labels_rejected() {
        let result = LabelCatalog::from_class_names(["Early blight", "early_blight"]);
        assert!(matches!(result, Err(Error::InvalidCatalog(_))));
    }

    #[test]
    fn test_empty_catalog_rejected() {
        let names: Vec<String> = Vec::new();
        assert!(LabelCatalog::from_class_names(names).is_err());
        assert!(LabelCatalog::from_json_str("{}").is_err());
    }

    #[test]
    fn test_from_json_label_to_index() {
        let json = r#"{"Tomato___Early_blight": 1, "Apple___Apple_scab": 0}"#;
        let catalog = LabelCatalog::from_json_str(json).unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.label_for(0).unwrap().as_str(), "apple_apple_scab");
        assert_eq!(catalog.label_for(1).unwrap().as_str(), "tomato_early_blight");
    }

    #[test]
    fn test_from_json_index_to_label() {
        let json = r#"{"0": "healthy", "1": "early_blight", "2": "late_blight"}"#;
        let catalog = LabelCatalog::from_json_str(json).unwrap();
        assert_eq!(catalog.label_for(2).unwrap().as_str(), "late_blight");
        assert_eq!(catalog.index_of("Early Blight"), Some(1));
    }

    #[test]
    fn test_from_json_rejects_gap() {
        let json = r#"{"healthy": 0, "late_blight": 2}"#;
        let err = LabelCatalog::from_json_str(json).unwrap_err();
        assert!(format!("{}", err).contains("missing 1"));
    }

    #[test]
    fn test_from_json_rejects_shared_index() {
        let json = r#"{"healthy": 0, "late_blight": 0}"#;
        assert!(LabelCatalog::from_json_str(json).is_err());
    }

    #[test]
    fn test_from_json_rejects_negative_index() {
        let json = r#"{"healthy": -1}"#;
        assert!(LabelCatalog::from_json_str(json).is_err());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model").join("class_indices.json");

        let catalog = sample();
        catalog.save(&path).unwrap();

        let loaded = LabelCatalog::load(&path).unwrap();
        assert_eq!(loaded, catalog);
    }
}
