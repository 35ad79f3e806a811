//! Field normalization for raw feed values
//!
//! The feed encodes "no value" inconsistently: empty strings, padding
//! spaces, and for location codes a literal zero. These conversions are
//! total and never fail; anything that cannot be represented becomes `None`.

/// Trimmed text, or `None` when the value is empty or only whitespace
pub fn normalize_text(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Base-10 integer, or `None` when the value does not parse
///
/// Surrounding whitespace and a leading sign are accepted, so `" +19 "`
/// yields `Some(19)`. Values outside the `i32` range yield `None`.
pub fn normalize_int(raw: &str) -> Option<i32> {
    raw.trim().parse().ok()
}

/// Location code (stanox), where zero means "no location"
pub fn normalize_location_code(raw: &str) -> Option<i32> {
    normalize_int(raw).filter(|code| *code != 0)
}
