//! Reconciliation report workbook
//!
//! - Summary: counts per category
//! - Names: matched / missing names side by side
//! - Dataset: class folders and their image counts (when scanned)
//! - Metadata: sheet rows with their normalized disease name and match status

use crate::error::{PlantAiError, Result};
use crate::scanner::ClassFolder;
use plant_disease_common::{MetadataRecord, NormalizedName, ReconciliationReport};
use rust_xlsxwriter::*;
use std::path::Path;

pub fn generate_reconciliation_excel(
    report: &ReconciliationReport,
    folders: &[ClassFolder],
    records: &[MetadataRecord],
    output_path: &Path,
) -> Result<()> {
    let buffer = generate_reconciliation_buffer(report, folders, records)
        .map_err(|e| PlantAiError::ExcelGeneration(e.to_string()))?;

    if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(output_path, buffer)?;
    Ok(())
}

/// Builds the workbook in memory
fn generate_reconciliation_buffer(
    report: &ReconciliationReport,
    folders: &[ClassFolder],
    records: &[MetadataRecord],
) -> std::result::Result<Vec<u8>, XlsxError> {
    let mut workbook = Workbook::new();

    let header_format = Format::new()
        .set_bold()
        .set_font_color(Color::RGB(0x333333))
        .set_background_color(Color::RGB(0xF5F5F5))
        .set_border(FormatBorder::Thin)
        .set_border_color(Color::RGB(0xAAAAAA));

    let missing_format = Format::new().set_font_color(Color::RGB(0xC0392B));

    // Summary
    let summary = workbook.add_worksheet();
    summary.set_name("Summary")?;
    summary.set_column_width(0, 28)?;
    summary.write_string_with_format(0, 0, "Item", &header_format)?;
    summary.write_string_with_format(0, 1, "Count", &header_format)?;

    let counts = [
        ("Dataset names", report.dataset_count),
        ("Metadata names", report.metadata_count),
        ("Matched", report.matches.len()),
        ("Missing in Excel", report.missing_in_excel.len()),
        ("Missing in folders", report.missing_in_folders.len()),
    ];
    for (i, (label, count)) in counts.iter().enumerate() {
        let row = i as u32 + 1;
        summary.write_string(row, 0, *label)?;
        summary.write_number(row, 1, *count as f64)?;
    }

    // Names
    let names = workbook.add_worksheet();
    names.set_name("Names")?;
    let columns: [(&str, &[NormalizedName], Option<&Format>); 3] = [
        ("Matched", &report.matches, None),
        ("Missing in Excel", &report.missing_in_excel, Some(&missing_format)),
        ("Missing in folders", &report.missing_in_folders, Some(&missing_format)),
    ];
    for (col, (title, values, format)) in columns.iter().enumerate() {
        let col = col as u16;
        names.set_column_width(col, 36)?;
        names.write_string_with_format(0, col, *title, &header_format)?;
        for (i, value) in values.iter().enumerate() {
            let row = i as u32 + 1;
            match format {
                Some(format) => names.write_string_with_format(row, col, value.as_str(), format)?,
                None => names.write_string(row, col, value.as_str())?,
            };
        }
    }

    // Dataset
    if !folders.is_empty() {
        let dataset = workbook.add_worksheet();
        dataset.set_name("Dataset")?;
        dataset.set_column_width(0, 40)?;
        dataset.write_string_with_format(0, 0, "Folder", &header_format)?;
        dataset.write_string_with_format(0, 1, "Images", &header_format)?;
        for (i, folder) in folders.iter().enumerate() {
            let row = i as u32 + 1;
            dataset.write_string(row, 0, folder.name.as_str())?;
            dataset.write_number(row, 1, folder.image_count as f64)?;
        }
    }

    // Metadata
    if !records.is_empty() {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Metadata")?;
        let headers = [("Disease", 32), ("Plant Name", 20), ("Normalized", 32), ("Matched", 10)];
        for (col, (title, width)) in headers.iter().enumerate() {
            sheet.set_column_width(col as u16, *width)?;
            sheet.write_string_with_format(0, col as u16, *title, &header_format)?;
        }
        for (i, record) in records.iter().enumerate() {
            let row = i as u32 + 1;
            let normalized = NormalizedName::new(&record.disease);
            sheet.write_string(row, 0, record.disease.as_str())?;
            sheet.write_string(row, 1, record.plant_name.as_str())?;
            sheet.write_string(row, 2, normalized.as_str())?;
            if normalized.is_empty() || report.missing_in_folders.contains(&normalized) {
                sheet.write_string_with_format(row, 3, "no", &missing_format)?;
            } else {
                sheet.write_string(row, 3, "yes")?;
            }
        }
    }

    workbook.save_to_buffer()
}
