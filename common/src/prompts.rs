//! Prompt generation for the remote classifier
//!
//! - DIAGNOSIS_FIELDS: the fields the model is asked to report, in order
//! - build_diagnosis_prompt: plant pathologist instruction sent with the image

/// Field labels requested from the model; the parser accepts the same labels
pub const DIAGNOSIS_FIELDS: &[&str] = &[
    "Plant Name",
    "Plant Scientific Name",
    "Disease",
    "Causal Agent",
    "Cause of Disease",
    "Solution",
    "Use of Medicine",
];

/// Builds the instruction sent alongside the leaf image.
///
/// # Returns
/// Prompt asking for one `Label: value` line per entry of `DIAGNOSIS_FIELDS`
pub fn build_diagnosis_prompt() -> String {
    let field_list = DIAGNOSIS_FIELDS
        .iter()
        .enumerate()
        .map(|(i, field)| format!("{}. {}", i + 1, field))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"You are an expert plant pathologist. Analyze the uploaded plant image and provide the following information:
{field_list}

Format it neatly using simple text, one "Field: value" line per item. If unknown, write 'Unknown'."#
    )
}

/// Text-only prompt used to check API connectivity
pub fn build_connectivity_prompt() -> &'static str {
    "Hello Gemini! Please tell me what model and plan I'm using."
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_lists_every_field_in_order() {
        let prompt = build_diagnosis_prompt();
        let mut last = 0;
        for (i, field) in DIAGNOSIS_FIELDS.iter().enumerate() {
            let entry = format!("{}. {}", i + 1, field);
            let pos = prompt.find(&entry).expect("field missing from prompt");
            assert!(pos >= last);
            last = pos;
        }
    }

    #[test]
    fn test_prompt_requests_unknown_fallback() {
        assert!(build_diagnosis_prompt().contains("'Unknown'"));
    }
}
