//! Line normalization for raw OCR text.

/// Split raw text into trimmed, non-empty lines, keeping their order.
pub fn normalize_lines(text: &str) -> Vec<&str> {
    text.split('\n')
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect()
}

/// Whether a line contains at least one ASCII digit.
pub fn has_digit(line: &str) -> bool {
    line.bytes().any(|b| b.is_ascii_digit())
}
