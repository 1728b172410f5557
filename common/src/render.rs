//! Display text for a diagnosis record

use crate::metadata::{Column, MetadataRecord};

/// Renders a record as `Label: value` lines in prompt field order.
///
/// The layout matches what the remote model is asked to produce, so both
/// classifier variants read the same on screen and when spoken.
pub fn render_record(record: &MetadataRecord, confidence: Option<f32>) -> String {
    let mut lines: Vec<String> = Column::ALL
        .iter()
        .map(|column| format!("{}: {}", column.label(), record.get(*column)))
        .collect();

    if let Some(confidence) = confidence {
        lines.push(format!("Confidence: {:.1}%", confidence * 100.0));
    }

    lines.join("\n")
}
