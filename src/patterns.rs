//! Compiled regex patterns and selector candidate chains for price capture.
//!
//! Regexes are compiled once on first use using `LazyLock`. Selector chains are
//! plain constants: their order is the order in which candidates are tried, so
//! the most specific and most likely correct selector always comes first.

#![allow(clippy::expect_used)]

use std::sync::LazyLock;

use regex::Regex;

use crate::selector::Candidate;

// =============================================================================
// Price Patterns
// =============================================================================

/// Amount with optional grouping and up to two decimals. Either `.` or `,`
/// may group or mark decimals (`1,234.50`, `1.234,50`, `19,99`).
const AMOUNT: &str = r"(?:\d{1,3}(?:[.,]\d{3})+(?:[.,]\d{1,2})?|\d+(?:[.,]\d{1,2})?)";

/// Left edge of a trailing-currency amount: not inside a longer number.
const AMOUNT_START: &str = r"(?:^|[^\d.,])";

/// Right edge of a leading-currency amount: the number ends here.
const AMOUNT_END: &str = r"(?:$|[^\d.,]|[.,](?:$|\D))";

/// Ordered price patterns: symbol-before-amount, code-before-amount,
/// amount-before-symbol, amount-before-code.
///
/// The first pattern with any match wins, and within it the leftmost match.
/// A card showing a struck-through fare next to the discounted one yields
/// whichever appears first in the text. The price itself is the `price`
/// group; the surrounding edges are consumed only to reject partial numbers.
pub static PRICE_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        format!(r"(?P<price>[£€$]\s?{AMOUNT}){AMOUNT_END}"),
        format!(r"(?P<price>\b(?:GBP|EUR|USD)\s?{AMOUNT}){AMOUNT_END}"),
        format!(r"{AMOUNT_START}(?P<price>{AMOUNT}\s?[£€$])"),
        format!(r"{AMOUNT_START}(?P<price>{AMOUNT}\s?(?:GBP|EUR|USD)\b)"),
    ]
    .iter()
    .map(|p| Regex::new(p).expect("PRICE_PATTERNS regex"))
    .collect()
});

/// Pulls the bare number out of a logged price cell (`£1,234.50` → `1,234.50`).
pub static PRICE_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"-?\d+(?:[.,]\d+)*").expect("PRICE_NUMBER regex"));

// =============================================================================
// Selector Chains
// =============================================================================

/// Cookie consent buttons, tried with a short clickability wait each.
pub const COOKIE_ACCEPT_SELECTORS: &[Candidate] = &[
    Candidate::css("button[data-ref='cookie.accept-all']"),
    Candidate::css("button[data-ref='cookie.popup.accept-all']"),
    Candidate::css("button[data-testid='accept-all-cookies']"),
    Candidate::css("button#cookie-popup-with-overlay-accept"),
    Candidate::xpath(
        "//button[contains(translate(., 'ABCDEFGHIJKLMNOPQRSTUVWXYZ', 'abcdefghijklmnopqrstuvwxyz'), 'accept') \
         and contains(translate(., 'ABCDEFGHIJKLMNOPQRSTUVWXYZ', 'abcdefghijklmnopqrstuvwxyz'), 'cookie')]",
    ),
];

/// Flight cards on the results page, one element per bookable flight.
pub const FLIGHT_CARD_SELECTORS: &[Candidate] = &[
    Candidate::css("flight-card"),
    Candidate::css("[data-ref='flight-card']"),
    Candidate::css("[data-testid='flight-card']"),
    Candidate::css("[data-e2e='flight-card']"),
    Candidate::css(".flight-card"),
    Candidate::css("[class*='flight-card']"),
];

/// Price element inside a flight card.
pub const PRICE_SELECTORS: &[Candidate] = &[
    Candidate::css("[data-ref='price']"),
    Candidate::css("[data-testid='price']"),
    Candidate::css("[data-testid='price-value']"),
    Candidate::css("[data-testid='flight-price']"),
    Candidate::css("[data-e2e='flight-price']"),
    Candidate::css(".flight-card__price"),
    Candidate::css(".flight-price"),
    Candidate::css(".price"),
];

/// Departure/arrival time elements inside a flight card.
pub const TIME_SELECTORS: &[Candidate] = &[
    Candidate::css("[data-ref='flight-time']"),
    Candidate::css("[data-testid='flight-time']"),
    Candidate::css(".flight-card__time"),
    Candidate::css(".flight-time"),
    Candidate::css(".flight-info__hour"),
];

/// Attributes consulted, in order, when an element's visible text is empty.
pub const TEXT_ATTRIBUTES: &[&str] = &["textContent", "innerText", "aria-label", "data-label"];
