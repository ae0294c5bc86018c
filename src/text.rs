//! Text normalization and price extraction.
//!
//! Both functions are total: malformed or empty input yields an empty string,
//! never an error.

use crate::patterns::PRICE_PATTERNS;

/// Collapses every whitespace run to a single space and trims both ends.
///
/// # Example
///
/// ```rust
/// use rs_farewatch::text::normalize_text;
///
/// assert_eq!(normalize_text("  Hello\n  world \t"), "Hello world");
/// ```
#[must_use]
pub fn normalize_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// [`normalize_text`] for values that may be absent; absence yields `""`.
#[must_use]
pub fn normalize_optional(text: Option<&str>) -> String {
    text.map(normalize_text).unwrap_or_default()
}

/// Finds the first currency-tagged amount in `text`.
///
/// Patterns are tried in [`PRICE_PATTERNS`] order and the leftmost match of
/// the first matching pattern is returned, trimmed. An amount is only taken
/// whole: digits glued to a longer number never count. Returns `""` when
/// nothing looks like a price.
///
/// # Example
///
/// ```rust
/// use rs_farewatch::text::extract_price;
///
/// assert_eq!(extract_price("Fly now for £19.99!"), "£19.99");
/// assert_eq!(extract_price("Total price 24.50 EUR"), "24.50 EUR");
/// assert_eq!(extract_price("Ab 19,99 €"), "19,99 €");
/// assert_eq!(extract_price("Sold out"), "");
/// ```
#[must_use]
pub fn extract_price(text: &str) -> String {
    PRICE_PATTERNS
        .iter()
        .find_map(|re| re.captures(text).and_then(|caps| caps.name("price")))
        .map(|m| m.as_str().trim().to_string())
        .unwrap_or_default()
}
