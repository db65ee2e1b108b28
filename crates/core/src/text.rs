use unicode_segmentation::UnicodeSegmentation;

pub fn normalize_text(input: &str) -> String {
    input
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .trim()
        .to_string()
}

/// Collapses inner whitespace and maps blank input to `None`.
pub fn normalize_optional(input: Option<String>) -> Option<String> {
    input
        .map(|value| normalize_text(&value))
        .filter(|value| !value.is_empty())
}

pub fn char_count(input: &str) -> usize {
    input.graphemes(true).count()
}

pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}
