use crate::cleaner::duration::parse_duration;
use crate::models::{ContentType, UNKNOWN};

/// Rating vocabulary of US film and TV boards, in canonical spelling.
const KNOWN_RATINGS: &[&str] = &[
    "G", "PG", "PG-13", "R", "NC-17", "NR", "UR",
    "TV-Y", "TV-Y7", "TV-Y7-FV", "TV-G", "TV-PG", "TV-14", "TV-MA",
];

/// Collapse case and spacing variants of a content type label.
pub fn normalize_content_type(raw: &str) -> ContentType {
    let key: String = raw
        .trim()
        .to_lowercase()
        .chars()
        .filter(|c| !matches!(c, ' ' | '_' | '-'))
        .collect();

    match key.as_str() {
        "movie" | "movies" | "film" | "films" => ContentType::Movie,
        "tvshow" | "tvshows" | "tvseries" | "series" => ContentType::TvShow,
        _ => ContentType::Unknown,
    }
}

/// Collapse casing variants of a rating onto the known vocabulary.
///
/// Blank cells, the sentinel itself, and duration text that leaked into the
/// rating column ("74 min") all become [`UNKNOWN`].
pub fn normalize_rating(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case(UNKNOWN) || parse_duration(trimmed).is_some() {
        return UNKNOWN.to_string();
    }

    let key: String = trimmed
        .to_uppercase()
        .chars()
        .map(|c| if c == ' ' || c == '_' { '-' } else { c })
        .collect();

    match key.as_str() {
        "NOT-RATED" => return "NR".to_string(),
        "UNRATED" => return "UR".to_string(),
        _ => {}
    }

    KNOWN_RATINGS
        .iter()
        .find(|r| **r == key)
        .map(|r| r.to_string())
        .unwrap_or(key)
}

/// Trimmed text, or [`UNKNOWN`] when blank.
pub fn text_or_unknown(raw: Option<&str>) -> String {
    match raw.map(str::trim) {
        Some(s) if !s.is_empty() => s.to_string(),
        _ => UNKNOWN.to_string(),
    }
}

/// Split a comma-separated list, dropping blanks and repeats.
/// An empty result is the single-element sentinel list.
pub fn split_list(raw: Option<&str>) -> Vec<String> {
    let mut items: Vec<String> = Vec::new();
    for part in raw.unwrap_or("").split(',') {
        let item = part.trim();
        if !item.is_empty() && !items.iter().any(|i| i == item) {
            items.push(item.to_string());
        }
    }
    if items.is_empty() {
        items.push(UNKNOWN.to_string());
    }
    items
}
