use crate::composer::ComposedDisplay;
use crate::error::Result;
use crate::session::AnalysisResult;
use serde::Serialize;
use std::path::Path;

/// Saved form of one analysis: the raw result plus what was shown
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisExport<'a> {
    pub result: &'a AnalysisResult,
    pub display: &'a ComposedDisplay,
}

pub fn save_analysis_json(
    result: &AnalysisResult,
    display: &ComposedDisplay,
    output_path: &Path,
) -> Result<()> {
    if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let json = serde_json::to_string_pretty(&AnalysisExport { result, display })?;
    std::fs::write(output_path, json)?;
    Ok(())
}
