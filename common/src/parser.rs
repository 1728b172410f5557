//! Free-text response parser
//!
//! The remote model answers in loosely formatted text. This module pulls the
//! requested fields out of it line by line:
//! - `Label: value` lines start a field (numbering, bullets and `**` emphasis are ignored)
//! - following unlabeled lines continue the current field
//! - nested bullets with an unknown label (`- Dosage: 2 g/L`) also continue it
//! - fields that never appear, or say "Unknown", stay `"Unknown"`

use crate::metadata::{column_for_header, is_unknown, or_unknown, Column, MetadataRecord};
use regex::Regex;
use std::collections::HashMap;

/// Extracts the diagnosis fields from a free-text model response.
///
/// # Arguments
/// * `response` - raw text returned by the model
///
/// # Returns
/// Record with one value per field, `"Unknown"` where nothing usable was found
///
/// # Examples
/// ```
/// use plant_disease_common::extract_diagnosis;
///
/// let record = extract_diagnosis("1. **Disease:** Early Blight\n2. Solution: Apply copper fungicide");
/// assert_eq!(record.disease, "Early Blight");
/// assert_eq!(record.plant_name, "Unknown");
/// ```
pub fn extract_diagnosis(response: &str) -> MetadataRecord {
    lazy_static::lazy_static! {
        static ref LABEL_LINE: Regex = Regex::new(
            r"^[\s>#*•\-]*(?:\d+[.)]\s*)?[*_]*\s*([A-Za-z][A-Za-z ()/'_\-]{0,40}?)\s*[*_]*\s*[:：]\s*[*_]*\s*(.*?)\s*$"
        ).unwrap();
        static ref EMPHASIS: Regex = Regex::new(r"^[\s*_]+|[\s*_]+$").unwrap();
        static ref BULLET: Regex = Regex::new(r"^(\s*)(?:[-•]|\*\s)").unwrap();
    }

    let mut values: HashMap<Column, Vec<String>> = HashMap::new();
    let mut current: Option<Column> = None;
    // bullet indent of the line that opened the current field
    let mut current_bullet: Option<usize> = None;

    for line in response.lines() {
        if line.trim().is_empty() {
            continue;
        }

        if let Some(caps) = LABEL_LINE.captures(line) {
            let label = caps.get(1).map_or("", |m| m.as_str());
            let value = caps.get(2).map_or("", |m| m.as_str());

            match column_for_header(label) {
                // repeated labels keep the first answer
                Some(column) if !values.contains_key(&column) => {
                    values.insert(column, vec![clean_value(&EMPHASIS, value)]);
                    current = Some(column);
                    current_bullet = bullet_indent(&BULLET, line);
                }
                Some(_) => current = None,
                None => match current {
                    Some(column) if is_nested_bullet(&BULLET, line, current_bullet) => {
                        let text = format!("{}: {}", label.trim(), clean_value(&EMPHASIS, value));
                        if let Some(parts) = values.get_mut(&column) {
                            parts.push(text.trim().to_string());
                        }
                    }
                    // top-level unknown label ("Note:", "Severity:" ...) ends the current field
                    _ => current = None,
                },
            }
            continue;
        }

        if let Some(column) = current {
            if let Some(parts) = values.get_mut(&column) {
                parts.push(clean_value(&EMPHASIS, line));
            }
        }
    }

    let mut record = MetadataRecord::default();
    for column in Column::ALL {
        if let Some(parts) = values.get(&column) {
            let joined = parts
                .iter()
                .map(|p| p.as_str())
                .filter(|p| !p.is_empty())
                .collect::<Vec<_>>()
                .join(" ");
            if !is_unknown(&joined) {
                record.set(column, or_unknown(&joined));
            }
        }
    }
    record
}

fn bullet_indent(bullet: &Regex, line: &str) -> Option<usize> {
    bullet
        .captures(line)
        .map(|caps| caps.get(1).map_or(0, |m| m.as_str().len()))
}

/// Bullet line that sits under the field header rather than beside it
fn is_nested_bullet(bullet: &Regex, line: &str, header_bullet: Option<usize>) -> bool {
    match (bullet_indent(bullet, line), header_bullet) {
        (None, _) => false,
        (Some(_), None) => true,
        (Some(indent), Some(header)) => indent > header,
    }
}

fn clean_value(emphasis: &Regex, value: &str) -> String {
    let value = value.trim().trim_start_matches(['-', '•']).trim();
    emphasis.replace_all(value, "").trim().to_string()
}
