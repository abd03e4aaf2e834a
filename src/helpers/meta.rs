//! Page metadata helpers (title/description clamping, language alternates)

use indexmap::IndexMap;
use serde::Serialize;

/// Clamp a meta value to `max_length` characters, ending clipped values
/// with an ellipsis
pub fn clamp_meta(value: &str, max_length: usize) -> String {
    if value.chars().count() <= max_length {
        return value.to_string();
    }
    let clipped: String = value.chars().take(max_length.saturating_sub(1)).collect();
    format!("{}…", clipped.trim_end())
}

/// Canonical URL plus per-language alternates
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Alternates {
    pub canonical: String,
    pub languages: IndexMap<String, String>,
}

/// Alternates for a single-language site
pub fn alternates(path: &str, language: &str) -> Alternates {
    let mut languages = IndexMap::new();
    languages.insert(language.to_string(), path.to_string());
    Alternates {
        canonical: path.to_string(),
        languages,
    }
}
