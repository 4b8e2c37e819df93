//! Free-text normalization for OSCAL string fields.
//!
//! OSCAL `string` values must match `^\S(.*\S)?$`: non-empty, no leading or
//! trailing whitespace, and no line breaks.

/// Collapse line breaks in a requirement statement to single spaces and strip
/// surrounding whitespace.
///
/// `"a.\nb.\n  "` becomes `"a. b."`. Interior runs of spaces are kept as-is.
pub fn normalize_requirement(text: &str) -> String {
    text.replace("\r\n", " ")
        .replace(['\n', '\r'], " ")
        .trim()
        .to_string()
}

/// Normalize a value destined for an OSCAL string field, falling back to
/// `fallback` when nothing is left after normalization.
pub fn normalize_or(text: &str, fallback: &str) -> String {
    let normalized = normalize_requirement(text);
    if normalized.is_empty() {
        fallback.to_string()
    } else {
        normalized
    }
}
