//! Search and runtime configuration.
//!
//! [`SearchConfig`] identifies the route/date pairing being tracked and is
//! validated once at construction. [`Options`] controls how patiently the
//! fetcher waits on the page and where diagnostics go.

use std::path::PathBuf;
use std::time::Duration;

use url::Url;

use crate::error::{Error, Result};

/// Booking flow entry point for round-trip flight selection.
pub const SEARCH_BASE_URL: &str = "https://www.ryanair.com/gb/en/trip/flights/select";

/// One route/date pairing to price.
///
/// Fields are private so the invariants checked by [`SearchConfig::new`]
/// hold for the lifetime of the value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchConfig {
    origin: String,
    destination: String,
    depart_date: String,
    return_date: String,
    adults: u32,
    currency: String,
}

impl SearchConfig {
    /// Builds a validated search.
    ///
    /// Every string field must be non-blank and `adults` must be at least 1.
    pub fn new(
        origin: impl Into<String>,
        destination: impl Into<String>,
        depart_date: impl Into<String>,
        return_date: impl Into<String>,
        adults: u32,
        currency: impl Into<String>,
    ) -> Result<Self> {
        let config = Self {
            origin: origin.into().trim().to_string(),
            destination: destination.into().trim().to_string(),
            depart_date: depart_date.into().trim().to_string(),
            return_date: return_date.into().trim().to_string(),
            adults,
            currency: currency.into().trim().to_string(),
        };

        for (name, value) in [
            ("origin", &config.origin),
            ("destination", &config.destination),
            ("depart_date", &config.depart_date),
            ("return_date", &config.return_date),
            ("currency", &config.currency),
        ] {
            if value.is_empty() {
                return Err(Error::InvalidConfig(format!("{name} must not be empty")));
            }
        }
        if config.adults == 0 {
            return Err(Error::InvalidConfig("adults must be at least 1".into()));
        }

        Ok(config)
    }

    #[must_use]
    pub fn origin(&self) -> &str {
        &self.origin
    }

    #[must_use]
    pub fn destination(&self) -> &str {
        &self.destination
    }

    #[must_use]
    pub fn depart_date(&self) -> &str {
        &self.depart_date
    }

    #[must_use]
    pub fn return_date(&self) -> &str {
        &self.return_date
    }

    #[must_use]
    pub fn adults(&self) -> u32 {
        self.adults
    }

    #[must_use]
    pub fn currency(&self) -> &str {
        &self.currency
    }

    /// Builds the booking-flow search URL for this pairing.
    ///
    /// The flex-day window is pinned to zero so the results page shows
    /// exactly the requested dates.
    pub fn search_url(&self) -> Result<Url> {
        let adults = self.adults.to_string();
        let params: [(&str, &str); 20] = [
            ("adults", adults.as_str()),
            ("teens", "0"),
            ("children", "0"),
            ("infants", "0"),
            ("originIata", self.origin.as_str()),
            ("destinationIata", self.destination.as_str()),
            ("dateOut", self.depart_date.as_str()),
            ("dateIn", self.return_date.as_str()),
            ("isReturn", "true"),
            ("flexdaysBeforeOut", "0"),
            ("flexdaysOut", "0"),
            ("flexdaysBeforeIn", "0"),
            ("flexdaysIn", "0"),
            ("roundTrip", "true"),
            ("discount", "0"),
            ("promoCode", ""),
            ("isConnectedFlight", "false"),
            ("isDomestic", "false"),
            ("isReturn", "true"),
            ("currency", self.currency.as_str()),
        ];
        Url::parse_with_params(SEARCH_BASE_URL, params)
            .map_err(|e| Error::InvalidConfig(format!("search url: {e}")))
    }
}

/// Runtime options for a capture attempt.
///
/// All fields are public for easy configuration. Use `Default::default()`
/// for standard settings.
///
/// # Example
///
/// ```rust
/// use std::time::Duration;
/// use rs_farewatch::Options;
///
/// let options = Options {
///     page_load_timeout: Duration::from_secs(60),
///     debug_dir: None,
///     ..Options::default()
/// };
/// assert_eq!(options.selector_wait, Duration::from_secs(5));
/// ```
#[derive(Debug, Clone)]
pub struct Options {
    /// Upper bound for the initial page load.
    ///
    /// Default: 40 seconds
    pub page_load_timeout: Duration,

    /// Wait applied to each flight-card candidate before moving to the next.
    ///
    /// Default: 10 seconds
    pub card_wait: Duration,

    /// Wait applied to each consent-button candidate.
    ///
    /// Kept short: an absent banner costs this much per candidate.
    ///
    /// Default: 5 seconds
    pub selector_wait: Duration,

    /// Delay between element lookups while waiting.
    ///
    /// Default: 250 milliseconds
    pub poll_interval: Duration,

    /// Directory for screenshot/page-source pairs on failed captures.
    ///
    /// `None` disables artifact capture.
    ///
    /// Default: `Some("debug_artifacts")`
    pub debug_dir: Option<PathBuf>,

    /// Run the browser without a visible window.
    ///
    /// Default: `false`
    pub headless: bool,

    /// Browser viewport in pixels (width, height).
    ///
    /// Default: `(1400, 900)`
    pub window_size: (u32, u32),
}

impl Default for Options {
    fn default() -> Self {
        Self {
            page_load_timeout: Duration::from_secs(40),
            card_wait: Duration::from_secs(10),
            selector_wait: Duration::from_secs(5),
            poll_interval: Duration::from_millis(250),
            debug_dir: Some(PathBuf::from("debug_artifacts")),
            headless: false,
            window_size: (1400, 900),
        }
    }
}
