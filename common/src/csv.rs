//! Minimal quoted-CSV line reader for metadata sheets exported as CSV

/// Splits one CSV line into fields.
///
/// Commas inside double quotes are kept, surrounding quotes are removed and
/// `""` inside a quoted field is unescaped.
pub fn parse_csv_line(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut in_quotes = false;
    let mut field_start = 0;

    for (i, c) in line.char_indices() {
        if c == '"' {
            in_quotes = !in_quotes;
        } else if c == ',' && !in_quotes {
            fields.push(unquote(&line[field_start..i]));
            field_start = i + 1;
        }
    }

    // last field
    fields.push(unquote(&line[field_start..]));

    fields
}

fn unquote(s: &str) -> String {
    let s = s.trim();
    if s.starts_with('"') && s.ends_with('"') && s.len() >= 2 {
        s[1..s.len() - 1].replace("\"\"", "\"")
    } else {
        s.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_fields() {
        assert_eq!(parse_csv_line("a,b,c"), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_quoted_comma() {
        let fields = parse_csv_line(r#"Tomato,"Spray copper, then remove leaves",Unknown"#);
        assert_eq!(fields.len(), 3);
        assert_eq!(fields[1], "Spray copper, then remove leaves");
    }

    #[test]
    fn test_escaped_quote() {
        let fields = parse_csv_line(r#""Use ""Mancozeb"" 2g/L",x"#);
        assert_eq!(fields[0], r#"Use "Mancozeb" 2g/L"#);
    }

    #[test]
    fn test_trailing_empty_field() {
        assert_eq!(parse_csv_line("a,"), vec!["a", ""]);
    }
}
