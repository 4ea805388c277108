//! Name normalization
//!
//! Case and whitespace folding only. Applied to both sides of a name
//! comparison; the row's own `raw_name` is never rewritten.

/// Trim, collapse whitespace runs to one space, lowercase
pub fn normalize_name(name: &str) -> String {
    name.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Remove every whitespace character (OCR often splits digit groups)
pub fn compact_id(raw: &str) -> String {
    raw.chars().filter(|c| !c.is_whitespace()).collect()
}
