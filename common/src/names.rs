//! Name normalization
//!
//! Dataset folder names, catalog labels and spreadsheet cells are all compared
//! through the same canonical form:
//! - trimmed and lowercased
//! - whitespace, `_` and `-` runs collapsed to a single `_`
//! - no leading or trailing `_`

use serde::{Deserialize, Serialize};
use std::fmt;

/// Returns the canonical form of a raw folder/label/column string.
///
/// # Examples
/// ```
/// use plant_disease_common::normalize_name;
///
/// assert_eq!(normalize_name(" Tomato___Early blight "), "tomato_early_blight");
/// assert_eq!(normalize_name(" A__B "), normalize_name("a_b"));
/// ```
pub fn normalize_name(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut pending_separator = false;

    for c in raw.trim().chars() {
        if c.is_whitespace() || c == '_' || c == '-' {
            pending_separator = true;
            continue;
        }
        if pending_separator && !out.is_empty() {
            out.push('_');
        }
        pending_separator = false;
        out.extend(c.to_lowercase());
    }

    out
}

/// A normalized name used for matching and lookup
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NormalizedName(String);

impl NormalizedName {
    pub fn new(raw: &str) -> Self {
        Self(normalize_name(raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Substring containment in either direction
    pub fn matches(&self, other: &NormalizedName) -> bool {
        self.0.contains(other.as_str()) || other.0.contains(self.as_str())
    }
}

impl fmt::Display for NormalizedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for NormalizedName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for NormalizedName {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

/// Canonical identifier of a disease class.
///
/// Built from dataset directory names when the catalog is produced and never
/// changed afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DiseaseLabel(NormalizedName);

impl DiseaseLabel {
    pub fn new(raw: &str) -> Self {
        Self(NormalizedName::new(raw))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    pub fn name(&self) -> &NormalizedName {
        &self.0
    }

    /// Human readable form: `tomato_early_blight` → `Tomato Early Blight`
    pub fn display_name(&self) -> String {
        self.as_str()
            .split('_')
            .filter(|w| !w.is_empty())
            .map(|w| {
                let mut chars = w.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                    None => String::new(),
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl fmt::Display for DiseaseLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_case_and_whitespace() {
        assert_eq!(normalize_name(" A__B "), normalize_name("a_b"));
        assert_eq!(normalize_name("Apple Scab"), "apple_scab");
        assert_eq!(normalize_name("  Late\tBlight  "), "late_blight");
    }

    #[test]
    fn test_normalize_plant_village_folder() {
        assert_eq!(
            normalize_name("Tomato___Tomato_Yellow_Leaf_Curl_Virus"),
            "tomato_tomato_yellow_leaf_curl_virus"
        );
        assert_eq!(
            normalize_name("Cherry_(including_sour)___Powdery_mildew"),
            "cherry_(including_sour)_powdery_mildew"
        );
    }

    #[test]
    fn test_normalize_strips_edge_separators() {
        assert_eq!(normalize_name("__leaf_mold__"), "leaf_mold");
        assert_eq!(normalize_name("- -"), "");
        assert_eq!(normalize_name(""), "");
    }

    #[test]
    fn test_normalize_idempotent() {
        let inputs = [
            " A__B ",
            "Pepper,_bell___Bacterial_spot",
            "Corn_(maize)___Cercospora_leaf_spot Gray_leaf_spot",
            "healthy",
            "  ",
            "ÄPFEL  Schorf",
        ];
        for input in inputs {
            let once = normalize_name(input);
            assert_eq!(normalize_name(&once), once, "input: {:?}", input);
        }
    }

    #[test]
    fn test_normalized_name_matches_both_directions() {
        let folder = NormalizedName::new("Tomato___Early_blight");
        let cell = NormalizedName::new("Early Blight");
        assert!(folder.matches(&cell));
        assert!(cell.matches(&folder));
        assert!(!folder.matches(&NormalizedName::new("scab")));
    }

    #[test]
    fn test_disease_label_display_name() {
        let label = DiseaseLabel::new("Tomato___Early_blight");
        assert_eq!(label.as_str(), "tomato_early_blight");
        assert_eq!(label.display_name(), "Tomato Early Blight");
    }
}
