//! Result types for price capture.
//!
//! A capture attempt always produces at least one [`FlightOption`]. Failed
//! attempts produce exactly one synthetic option whose [`Status`] says why, so
//! the price log never has gaps.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::diagnostics::Artifacts;
use crate::options::SearchConfig;

/// Capture status recorded alongside every price row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Status {
    Ok,
    MissingPrice,
    Timeout,
    WebdriverError,
}

impl Status {
    /// The label written to the `status` column and used for artifact names.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::MissingPrice => "missing-price",
            Self::Timeout => "timeout",
            Self::WebdriverError => "webdriver-error",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One bookable flight as seen on the results page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlightOption {
    /// Currency-tagged price text, `None` when nothing was captured.
    pub price: Option<String>,
    /// Departure time as displayed, possibly empty.
    pub depart_time: String,
    /// Arrival time as displayed, possibly empty.
    pub return_time: String,
    pub currency: String,
    pub status: Status,
    /// Date the flight operates on (`YYYY-MM-DD` as given in the search).
    pub flight_date: String,
}

impl FlightOption {
    /// Builds an option from card text. Empty price text means `MissingPrice`.
    #[must_use]
    pub fn from_card(price: String, times: &[String], search: &SearchConfig) -> Self {
        let status = if price.is_empty() { Status::MissingPrice } else { Status::Ok };
        Self {
            price: (!price.is_empty()).then_some(price),
            depart_time: times.first().cloned().unwrap_or_default(),
            return_time: times.get(1).cloned().unwrap_or_default(),
            currency: search.currency().to_string(),
            status,
            flight_date: search.depart_date().to_string(),
        }
    }

    /// A record standing in for a failed or empty capture.
    #[must_use]
    pub fn synthetic(status: Status, price: Option<String>, search: &SearchConfig) -> Self {
        Self {
            price: price.filter(|p| !p.is_empty()),
            depart_time: String::new(),
            return_time: String::new(),
            currency: search.currency().to_string(),
            status,
            flight_date: search.depart_date().to_string(),
        }
    }

    /// The same option dated `flight_date`.
    #[must_use]
    pub fn with_flight_date(self, flight_date: &str) -> Self {
        Self { flight_date: flight_date.to_string(), ..self }
    }
}

/// Where a capture attempt stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Phase {
    Navigating,
    CookieDismiss,
    LocatingCards,
    Extracting,
    /// Flight cards were found and turned into options.
    Assembled,
    /// The search page never finished loading.
    Timeout,
    /// No card and no page-wide price could be found.
    MissingPrice,
    /// The driver failed after navigation started.
    DriverError,
}

impl Phase {
    /// Terminal failure phases; these trigger diagnostic capture.
    #[must_use]
    pub fn is_failure(self) -> bool {
        matches!(self, Self::Timeout | Self::MissingPrice | Self::DriverError)
    }
}

/// Everything one capture attempt produced.
#[derive(Debug, Clone)]
pub struct FetchOutcome {
    /// Never empty.
    pub options: Vec<FlightOption>,
    /// Terminal phase reached.
    pub phase: Phase,
    /// Phase that was running when the attempt failed.
    pub failed_during: Option<Phase>,
    /// Failure description for terminal failure phases.
    pub failure: Option<String>,
    /// Selector that located the flight cards, when one did.
    pub card_selector: Option<String>,
    /// Diagnostics saved for a failure; empty on success or without a
    /// debug directory.
    pub artifacts: Artifacts,
}

impl FetchOutcome {
    #[must_use]
    pub fn is_success(&self) -> bool {
        !self.phase.is_failure()
    }
}
