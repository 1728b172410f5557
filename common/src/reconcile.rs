//! Dataset folders vs. metadata rows reconciliation
//!
//! Two names match when one contains the other after normalization. The same
//! predicate is applied in both directions, so a folder counted as matched
//! always has a metadata name that is also counted as matched.

use crate::names::NormalizedName;
use serde::Serialize;
use std::collections::HashSet;

/// Result of one reconciliation run
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconciliationReport {
    /// Distinct dataset names checked
    pub dataset_count: usize,
    /// Distinct metadata names checked
    pub metadata_count: usize,
    /// Dataset names with a matching metadata name
    pub matches: Vec<NormalizedName>,
    /// Dataset names without any metadata name
    pub missing_in_excel: Vec<NormalizedName>,
    /// Metadata names without any dataset name
    pub missing_in_folders: Vec<NormalizedName>,
}

impl ReconciliationReport {
    /// Every name on both sides found a partner
    pub fn is_consistent(&self) -> bool {
        self.missing_in_excel.is_empty() && self.missing_in_folders.is_empty()
    }
}

/// Compares dataset-derived names (A) against metadata-derived names (B).
///
/// Empty names and duplicates are dropped, first-seen order is kept.
///
/// # Examples
/// ```
/// use plant_disease_common::{reconcile, NormalizedName};
///
/// let folders = [NormalizedName::new("Tomato___Late_blight")];
/// let sheet = [NormalizedName::new("Late blight")];
/// let report = reconcile(&folders, &sheet);
/// assert!(report.is_consistent());
/// ```
pub fn reconcile(dataset: &[NormalizedName], metadata: &[NormalizedName]) -> ReconciliationReport {
    let dataset = distinct(dataset);
    let metadata = distinct(metadata);

    let mut report = ReconciliationReport {
        dataset_count: dataset.len(),
        metadata_count: metadata.len(),
        ..Default::default()
    };

    for name in &dataset {
        if metadata.iter().any(|m| name.matches(m)) {
            report.matches.push((*name).clone());
        } else {
            report.missing_in_excel.push((*name).clone());
        }
    }

    for name in &metadata {
        if !dataset.iter().any(|d| name.matches(d)) {
            report.missing_in_folders.push((*name).clone());
        }
    }

    report
}

fn distinct(names: &[NormalizedName]) -> Vec<&NormalizedName> {
    let mut seen = HashSet::new();
    names
        .iter()
        .filter(|n| !n.is_empty())
        .filter(|n| seen.insert(n.as_str().to_string()))
        .collect()
}
