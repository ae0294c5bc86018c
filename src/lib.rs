//! # rs-farewatch
//!
//! Tracks round-trip flight prices on the Ryanair booking flow over time.
//!
//! Each run loads the results page for one route/date pairing, pulls a price
//! and schedule out of every flight card, and appends one CSV row per flight
//! to a long-lived price log. Failed runs still append a row, tagged with why
//! they failed, so the log has no gaps.
//!
//! ## Quick Start
//!
//! ```rust
//! use rs_farewatch::driver::DomDriver;
//! use rs_farewatch::{capture, Options, SearchConfig, Status};
//!
//! let page = DomDriver::from_html(
//!     r#"<div class="flight-card"><span class="price">£42.99</span></div>"#,
//! );
//! let search = SearchConfig::new("STN", "BGY", "2024-08-22", "2024-09-04", 1, "GBP")?;
//! let options = Options { debug_dir: None, ..Options::default() };
//!
//! let outcome = capture(&page, &search, &options);
//! assert_eq!(outcome.options[0].price.as_deref(), Some("£42.99"));
//! assert_eq!(outcome.options[0].status, Status::Ok);
//! # Ok::<(), rs_farewatch::Error>(())
//! ```
//!
//! ## Layout
//!
//! - [`text`]: whitespace normalization and price matching
//! - [`selector`]: ordered locator chains, first success wins
//! - [`driver`]: the browser seam, a static-HTML driver and (feature
//!   `chrome`) a live Chrome driver
//! - [`extractor`]: card text, prices, times and outbound/return assembly
//! - [`fetch`]: one capture attempt as a phase machine
//! - [`record`]: CSV rows and the append-only price log
//! - [`history`]: the price log read back as per-route series

use std::path::Path;

use chrono::{DateTime, Utc};

mod error;
mod options;
mod result;

/// Compiled price patterns and selector chains.
pub mod patterns;

/// Text normalization and price extraction.
pub mod text;

/// Locator candidates and first-success resolution.
pub mod selector;

/// Browser automation traits and drivers.
pub mod driver;

/// Per-card extraction and flight option assembly.
pub mod extractor;

/// Capture attempt orchestration.
pub mod fetch;

/// Screenshot and page-source capture on failure.
pub mod diagnostics;

/// Price log rows and CSV persistence.
pub mod record;

/// Price log reader for charting.
pub mod history;

// Public API - re-exports
pub use error::{Error, Result};
pub use fetch::Fetcher;
pub use options::{Options, SearchConfig, SEARCH_BASE_URL};
pub use record::PriceRow;
pub use result::{FetchOutcome, FlightOption, Phase, Status};

use driver::Driver;

/// Runs one capture attempt. Never fails; see [`FetchOutcome`].
#[must_use]
pub fn capture<D: Driver>(driver: &D, search: &SearchConfig, options: &Options) -> FetchOutcome {
    Fetcher::new(driver, options).fetch(search)
}

/// Rows for every option in `outcome`, all stamped `captured_at`.
#[must_use]
pub fn outcome_rows(
    outcome: &FetchOutcome,
    search: &SearchConfig,
    captured_at: DateTime<Utc>,
) -> Vec<PriceRow> {
    outcome
        .options
        .iter()
        .map(|option| PriceRow::new(option, search, captured_at))
        .collect()
}

/// Captures and appends the result to the price log at `csv_path`.
///
/// Capture failures are recorded as status rows, not returned. Only
/// persistence errors surface here.
///
/// # Example
///
/// ```rust
/// use rs_farewatch::driver::DomDriver;
/// use rs_farewatch::{capture_and_record, Options, SearchConfig};
///
/// let dir = tempfile::tempdir()?;
/// let csv = dir.path().join("prices.csv");
/// let page = DomDriver::from_html("<p>Nothing on sale</p>");
/// let search = SearchConfig::new("STN", "BGY", "2024-08-22", "2024-09-04", 1, "GBP")?;
/// let options = Options { debug_dir: None, ..Options::default() };
///
/// let outcome = capture_and_record(&page, &search, &options, &csv)?;
/// assert!(!outcome.is_success());
/// assert!(std::fs::read_to_string(&csv)?.contains("missing-price"));
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn capture_and_record<D: Driver>(
    driver: &D,
    search: &SearchConfig,
    options: &Options,
    csv_path: &Path,
) -> Result<FetchOutcome> {
    let outcome = capture(driver, search, options);
    record::append_rows(csv_path, &outcome_rows(&outcome, search, Utc::now()))?;
    Ok(outcome)
}
