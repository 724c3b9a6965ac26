//! Header field extraction from `label: value` lines.

use tracing::trace;

use crate::models::invoice::HeaderFields;

use super::patterns::{HEADER_LINE, NON_ALNUM};

/// Normalize a label into a header key.
///
/// Trims, replaces every character that is not an ASCII letter or digit with
/// `_`, then lowercases. Applying it to its own output is a no-op.
pub fn normalize_key(label: &str) -> String {
    NON_ALNUM
        .replace_all(label.trim(), "_")
        .to_ascii_lowercase()
}

/// Split a line into a normalized key and trimmed value.
///
/// Returns `None` for lines without a colon. Colons after the first one stay
/// in the value.
pub fn parse_header_line(line: &str) -> Option<(String, String)> {
    let caps = HEADER_LINE.captures(line)?;
    Some((normalize_key(&caps[1]), caps[2].trim().to_string()))
}

/// Collect header fields from normalized lines.
///
/// Every line is tried, including table rows. A repeated key keeps the value
/// from its last occurrence.
pub fn extract_header(lines: &[&str]) -> HeaderFields {
    let mut header = HeaderFields::new();
    for line in lines {
        if let Some((key, value)) = parse_header_line(line) {
            trace!(key = %key, "header field");
            header.insert(key, value);
        }
    }
    header
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_invoice_number() {
        assert_eq!(
            parse_header_line("Invoice Number: INV-2024-001"),
            Some(("invoice_number".to_string(), "INV-2024-001".to_string()))
        );
    }

    #[test]
    fn test_key_normalization() {
        assert_eq!(normalize_key("  GSTIN/UIN  "), "gstin_uin");
        assert_eq!(normalize_key("Date of Supply."), "date_of_supply_");
        assert_eq!(normalize_key("Café"), "caf_");
        assert_eq!(normalize_key(""), "");
    }

    #[test]
    fn test_normalize_key_is_idempotent() {
        for label in ["Invoice No.", "P.O. #", "Bill-To Name", "état", "  x  y  "] {
            let key = normalize_key(label);
            assert_eq!(normalize_key(&key), key);
        }
    }

    #[test]
    fn test_value_keeps_later_colons() {
        assert_eq!(
            parse_header_line("Time:   10:30:15"),
            Some(("time".to_string(), "10:30:15".to_string()))
        );
        assert_eq!(
            parse_header_line("Note:"),
            Some(("note".to_string(), String::new()))
        );
        assert_eq!(
            parse_header_line(": orphan"),
            Some((String::new(), "orphan".to_string()))
        );
    }

    #[test]
    fn test_line_without_colon_is_skipped() {
        assert_eq!(parse_header_line("TAX INVOICE"), None);
    }

    #[test]
    fn test_last_duplicate_wins() {
        let header = extract_header(&["Date: 01/02/2024", "Place: Pune", "Date: 03/02/2024"]);
        assert_eq!(header.len(), 2);
        assert_eq!(header["date"], "03/02/2024");
        assert_eq!(header["place"], "Pune");
    }
}
