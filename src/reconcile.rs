//! Dataset vs. metadata sheet check
//!
//! Folder names and sheet `Disease` values are normalized and compared with
//! the shared reconciliation routine. The result is a report, never an error.

use crate::error::Result;
use crate::metadata_source::load_metadata;
use crate::scanner::{scan_dataset, ClassFolder};
use plant_disease_common::{reconcile, MetadataTable, NormalizedName, ReconciliationReport};
use std::path::Path;

pub struct ReconcileOutcome {
    pub folders: Vec<ClassFolder>,
    pub metadata: MetadataTable,
    pub report: ReconciliationReport,
}

pub fn run_reconciliation(dataset: &Path, metadata_path: &Path) -> Result<ReconcileOutcome> {
    let folders = scan_dataset(dataset)?;
    let table = load_metadata(metadata_path)?;

    let folder_names: Vec<NormalizedName> = folders
        .iter()
        .map(|f| NormalizedName::new(&f.name))
        .collect();
    let report = reconcile(&folder_names, &table.disease_names());

    log::info!(
        "reconciled {} folders against {} metadata rows",
        report.dataset_count,
        report.metadata_count
    );
    Ok(ReconcileOutcome {
        folders,
        metadata: table,
        report,
    })
}

/// Console summary with up to `examples` names per list
pub fn format_report(report: &ReconciliationReport, examples: usize) -> String {
    let mut lines = vec![
        format!("Dataset folders:     {}", report.dataset_count),
        format!("Metadata diseases:   {}", report.metadata_count),
        format!("Matched:             {}", report.matches.len()),
        format!("Missing in Excel:    {}", report.missing_in_excel.len()),
        format!("Missing in folders:  {}", report.missing_in_folders.len()),
    ];

    for (title, names) in [
        ("Matched", &report.matches),
        ("Missing in Excel", &report.missing_in_excel),
        ("Missing in folders", &report.missing_in_folders),
    ] {
        if names.is_empty() || examples == 0 {
            continue;
        }
        lines.push(String::new());
        lines.push(format!("{} (first {}):", title, examples.min(names.len())));
        lines.extend(names.iter().take(examples).map(|n| format!("  - {}", n)));
    }

    lines.join("\n")
}
