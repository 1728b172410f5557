pub mod excel;
pub mod json;

pub use excel::generate_reconciliation_excel;
pub use json::{save_analysis_json, AnalysisExport};
