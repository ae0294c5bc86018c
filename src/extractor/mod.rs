//! Card-level extraction and flight option assembly.
//!
//! Works on any [`Element`], so the same code runs against a live browser and
//! a static snapshot.

use tracing::debug;

use crate::driver::Element;
use crate::error::Result;
use crate::options::SearchConfig;
use crate::patterns::{PRICE_SELECTORS, TEXT_ATTRIBUTES, TIME_SELECTORS};
use crate::result::FlightOption;
use crate::selector::{resolve_first, Candidate};
use crate::text::{extract_price, normalize_optional, normalize_text};

/// Best-effort readable text for an element.
///
/// Visible text first, then [`TEXT_ATTRIBUTES`] in order; the first candidate
/// that is non-empty after normalization wins. Read failures count as empty.
pub fn element_text<E: Element>(element: &E) -> String {
    let visible = element.text().ok();
    std::iter::once(visible)
        .chain(
            TEXT_ATTRIBUTES
                .iter()
                .map(|name| element.attribute(name).ok().flatten()),
        )
        .map(|candidate| normalize_optional(candidate.as_deref()))
        .find(|text| !text.is_empty())
        .unwrap_or_default()
}

/// Text of the first element under `root` matched by the chain.
///
/// A candidate only wins if one of its matches has non-empty text. Returns
/// `""` when the chain is exhausted.
pub fn extract_text<E: Element>(root: &E, candidates: &[Candidate]) -> Result<String> {
    let resolved = resolve_first(candidates, |candidate| {
        Ok(root
            .find_all(candidate)?
            .iter()
            .map(element_text)
            .find(|text| !text.is_empty()))
    })?;
    Ok(resolved.map(|r| r.value).unwrap_or_default())
}

/// Up to two non-empty time strings from the first matching time selector.
pub fn extract_times<E: Element>(root: &E, candidates: &[Candidate]) -> Result<Vec<String>> {
    let resolved = resolve_first(candidates, |candidate| {
        let times: Vec<String> = root
            .find_all(candidate)?
            .iter()
            .map(element_text)
            .filter(|text| !text.is_empty())
            .take(2)
            .collect();
        Ok((!times.is_empty()).then_some(times))
    })?;
    Ok(resolved.map(|r| r.value).unwrap_or_default())
}

/// Price text for a card.
///
/// Uses the price selector chain, trimming the match down to the amount when
/// it carries extra words, and falls back to scanning the whole card text.
pub fn card_price<E: Element>(card: &E) -> Result<String> {
    let selected = extract_text(card, PRICE_SELECTORS)?;
    if !selected.is_empty() {
        let amount = extract_price(&selected);
        return Ok(if amount.is_empty() { selected } else { amount });
    }
    Ok(extract_price(&element_text(card)))
}

/// One option per card, then the outbound/return split.
pub fn assemble<E: Element>(cards: &[E], search: &SearchConfig) -> Result<Vec<FlightOption>> {
    let mut options = Vec::with_capacity(cards.len());
    for (index, card) in cards.iter().enumerate() {
        let price = card_price(card)?;
        let times = extract_times(card, TIME_SELECTORS)?;
        debug!(index, price = %price, times = ?times, "extracted card");
        options.push(FlightOption::from_card(normalize_text(&price), &times, search));
    }
    Ok(split_outbound_return(options, search.return_date()))
}

/// Re-dates the second half of an even-sized list to `return_date`.
///
/// Assumes the page lists outbound cards first and return cards second, in
/// equal numbers. That ordering is not verified against the page; an odd
/// count (or a single card) is left untouched.
#[must_use]
pub fn split_outbound_return(options: Vec<FlightOption>, return_date: &str) -> Vec<FlightOption> {
    let count = options.len();
    if count < 2 || count % 2 != 0 {
        return options;
    }
    let half = count / 2;
    options
        .into_iter()
        .enumerate()
        .map(|(i, option)| if i < half { option } else { option.with_flight_date(return_date) })
        .collect()
}
