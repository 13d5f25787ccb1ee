//! String utilities for the domain layer.

/// Shorten message content for one-line display (UTF-8 safe).
///
/// Newlines are flattened to spaces first; `max_len` is measured in bytes and
/// the cut always lands on a character boundary before the ellipsis.
pub fn preview(s: &str, max_len: usize) -> String {
    let flat = s.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.len() <= max_len {
        return flat;
    }
    let mut end = max_len.saturating_sub(3).min(flat.len());
    while end > 0 && !flat.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &flat[..end])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preview_short_passthrough() {
        assert_eq!(preview("TO[OddHandler]: 3", 40), "TO[OddHandler]: 3");
    }

    #[test]
    fn test_preview_flattens_newlines() {
        assert_eq!(preview("line one\n  line two", 40), "line one line two");
    }

    #[test]
    fn test_preview_truncates_on_char_boundary() {
        assert_eq!(preview("hello world", 8), "hello...");
        // 'あ' is 3 bytes: target 4 backs up to 3
        assert_eq!(preview("ああああ", 7), "あ...");
    }
}
