//! Input preparation for the summarization request

/// First `max_chars` characters of `text`, always on a char boundary
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((offset, _)) => &text[..offset],
        None => text,
    }
}

/// Decode lossily and drop control characters other than newline and tab
pub fn sanitize_text(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes)
        .chars()
        .filter(|c| !c.is_control() || *c == '\n' || *c == '\t')
        .collect()
}

/// Truncate, then sanitize
pub fn prepare_input(text: &str, max_chars: usize) -> String {
    sanitize_text(truncate_chars(text, max_chars).as_bytes())
}
