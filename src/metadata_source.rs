//! Disease metadata sheet loading
//!
//! - `.xlsx` / `.xlsm` / `.xls` / `.ods`: first worksheet via calamine
//! - `.csv`: shared CSV reader

use crate::error::{PlantAiError, Result};
use calamine::{open_workbook_auto, Data, Reader};
use plant_disease_common::MetadataTable;
use std::path::Path;

const SPREADSHEET_EXTENSIONS: &[&str] = &["xlsx", "xlsm", "xls", "xlsb", "ods"];

/// Loads the metadata table; any failure here is fatal at startup
pub fn load_metadata(path: &Path) -> Result<MetadataTable> {
    if !path.is_file() {
        return Err(PlantAiError::FileNotFound(path.display().to_string()));
    }

    let extension = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();

    let table = if extension == "csv" {
        let content = std::fs::read_to_string(path)?;
        MetadataTable::from_csv_str(&content)?
    } else if SPREADSHEET_EXTENSIONS.contains(&extension.as_str()) {
        load_spreadsheet(path)?
    } else {
        return Err(PlantAiError::InvalidMetadata(format!(
            "unsupported file type '{}' (use .xlsx or .csv)",
            path.display()
        )));
    };

    log::info!("loaded {} metadata rows from {}", table.len(), path.display());
    Ok(table)
}

fn load_spreadsheet(path: &Path) -> Result<MetadataTable> {
    let mut workbook = open_workbook_auto(path)
        .map_err(|e| PlantAiError::InvalidMetadata(format!("{}: {}", path.display(), e)))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| PlantAiError::InvalidMetadata(format!("{} has no worksheets", path.display())))?
        .map_err(|e| PlantAiError::InvalidMetadata(format!("{}: {}", path.display(), e)))?;

    let mut rows = range.rows().map(|row| row.iter().map(cell_text).collect::<Vec<String>>());

    let header = rows
        .next()
        .ok_or_else(|| PlantAiError::InvalidMetadata(format!("{} is empty", path.display())))?;

    Ok(MetadataTable::from_rows(&header, rows)?)
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.trim().to_string(),
        other => other.to_string(),
    }
}
