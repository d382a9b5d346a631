//! Line normalization for OCR text.
//!
//! OCR destroys layout, so line order is the only structural signal left.
//! Every extractor works on the sequence produced here.

/// Split raw OCR text into trimmed, non-empty lines in document order.
pub fn normalize_lines(text: &str) -> Vec<&str> {
    text.split('\n')
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect()
}

/// Truncate `text` to at most `max_chars` characters on a char boundary.
///
/// Returns the kept prefix and whether anything was cut.
pub fn truncate_chars(text: &str, max_chars: usize) -> (&str, bool) {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => (&text[..byte_idx], true),
        None => (text, false),
    }
}
