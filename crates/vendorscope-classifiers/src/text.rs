//! Small text helpers shared by the lexicon and the validator.
//!
//! All offsets are byte offsets into the same lowercase haystack.

/// Whether `needle` occurs in `haystack` delimited by non-alphanumeric characters
pub fn contains_word(haystack: &str, needle: &str) -> bool {
    find_word(haystack, needle).is_some()
}

/// Byte offset of the first word-delimited occurrence of `needle`
pub fn find_word(haystack: &str, needle: &str) -> Option<usize> {
    if needle.is_empty() {
        return None;
    }
    haystack
        .match_indices(needle)
        .map(|(start, _)| start)
        .find(|&start| is_word_bounded(haystack, start, start + needle.len()))
}

/// Whether the span `[start, end)` is not glued to alphanumeric neighbours
pub fn is_word_bounded(haystack: &str, start: usize, end: usize) -> bool {
    let before = haystack[..start].chars().next_back();
    let after = haystack[end..].chars().next();
    !before.is_some_and(char::is_alphanumeric) && !after.is_some_and(char::is_alphanumeric)
}

/// Slice of `text` extending `radius` characters either side of `[start, end)`
pub fn window_around(text: &str, start: usize, end: usize, radius: usize) -> &str {
    let from = text[..start]
        .char_indices()
        .rev()
        .nth(radius.saturating_sub(1))
        .map(|(i, _)| i)
        .unwrap_or(0);
    let from = if radius == 0 { start } else { from };

    let to = text[end..]
        .char_indices()
        .nth(radius)
        .map(|(i, _)| end + i)
        .unwrap_or(text.len());

    &text[from..to]
}

/// Upper-case the first character and lower-case the rest
pub fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_word_boundaries() {
        assert!(contains_word("usa o protheus", "usa"));
        assert!(!contains_word("causa perdas", "usa"));
        assert!(contains_word("erp-totvs", "totvs"));
        assert_eq!(find_word("rmx rm", "rm"), Some(4));
    }

    #[test]
    fn test_window_is_char_based() {
        let text = "ação ".repeat(100) + "acme" + &" ção".repeat(100);
        let start = text.find("acme").unwrap();
        let window = window_around(&text, start, start + 4, 10);
        assert_eq!(window.chars().count(), 24);
        assert!(window.contains("acme"));
    }

    #[test]
    fn test_window_clamps_at_edges() {
        let text = "acme usa totvs";
        assert_eq!(window_around(text, 0, 4, 250), text);
    }

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("ÁGUA VIVA"), "Água viva");
        assert_eq!(capitalize(""), "");
    }
}
