//! One capture attempt against the booking flow.
//!
//! ```text
//! Navigating -> CookieDismiss -> LocatingCards -> Extracting -> Assembled
//!      |               (any phase after navigation)  |
//!      v                                             v
//!   Timeout                           MissingPrice / DriverError
//! ```
//!
//! Every path ends with at least one [`FlightOption`]. Failures never surface
//! as errors: they become a single synthetic option tagged with a [`Status`],
//! and the page is captured to the diagnostics directory when one is set.
//! There are no retries here; rerunning is the scheduler's job.

use std::cell::Cell;

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::diagnostics::{Artifacts, DiagnosticsWriter};
use crate::driver::{Condition, Driver, Element, Wait};
use crate::error::{Error, Result};
use crate::extractor;
use crate::options::{Options, SearchConfig};
use crate::patterns::{COOKIE_ACCEPT_SELECTORS, FLIGHT_CARD_SELECTORS};
use crate::result::{FetchOutcome, FlightOption, Phase, Status};
use crate::selector::{resolve_first, Resolved};
use crate::text::{extract_price, normalize_text};

/// Drives one search through a [`Driver`].
pub struct Fetcher<'a, D: Driver> {
    driver: &'a D,
    options: &'a Options,
    diagnostics: Option<DiagnosticsWriter>,
    phase: Cell<Phase>,
}

impl<'a, D: Driver> Fetcher<'a, D> {
    #[must_use]
    pub fn new(driver: &'a D, options: &'a Options) -> Self {
        Self {
            driver,
            options,
            diagnostics: options.debug_dir.clone().map(DiagnosticsWriter::new),
            phase: Cell::new(Phase::Navigating),
        }
    }

    fn enter(&self, phase: Phase) {
        debug!(?phase, "entering phase");
        self.phase.set(phase);
    }

    /// Runs the attempt to completion. Never fails.
    pub fn fetch(&self, search: &SearchConfig) -> FetchOutcome {
        self.enter(Phase::Navigating);
        let loaded = search.search_url().and_then(|url| {
            info!(%url, "navigating");
            self.driver.navigate(url.as_str(), self.options.page_load_timeout)
        });
        match loaded {
            Ok(()) => {}
            Err(err @ Error::NavigationTimeout { .. }) => {
                warn!("timeout while loading the search url");
                return self.fail(Phase::Timeout, Status::Timeout, &err, search);
            }
            Err(err) => {
                warn!(error = %err, "navigation failed");
                return self.fail(Phase::DriverError, Status::WebdriverError, &err, search);
            }
        }

        self.enter(Phase::CookieDismiss);
        self.dismiss_cookies();

        match self.collect(search) {
            Ok(outcome) => outcome,
            Err(err) => {
                warn!(error = %err, "driver error while extracting prices");
                self.fail(Phase::DriverError, Status::WebdriverError, &err, search)
            }
        }
    }

    /// Clicks the first clickable consent button, if any.
    ///
    /// An absent banner is normal. A driver fault here is logged and ends the
    /// phase; card location will surface a dead session on its own.
    fn dismiss_cookies(&self) {
        let wait = Wait::new(self.options.selector_wait, self.options.poll_interval);
        let clicked = resolve_first(COOKIE_ACCEPT_SELECTORS, |candidate| {
            let buttons = self.driver.wait_for(candidate, Condition::Clickable, wait)?;
            match buttons.first() {
                Some(button) => button.click().map(|()| Some(())),
                None => Ok(None),
            }
        });
        match clicked {
            Ok(Some(Resolved { candidate, .. })) => {
                info!(selector = candidate.value, "accepted cookies banner");
            }
            Ok(None) => debug!("no cookie banner found"),
            Err(err) => warn!(error = %err, "failed to accept cookies banner"),
        }
    }

    /// Locates and extracts cards. Any error returned is a driver fault.
    fn collect(&self, search: &SearchConfig) -> Result<FetchOutcome> {
        self.enter(Phase::LocatingCards);
        let wait = Wait::new(self.options.card_wait, self.options.poll_interval);
        let located = resolve_first(FLIGHT_CARD_SELECTORS, |candidate| {
            let cards = self.driver.wait_for(candidate, Condition::Present, wait)?;
            Ok((!cards.is_empty()).then_some(cards))
        })?;

        let Some(Resolved { candidate, value: cards, .. }) = located else {
            return self.page_fallback(search);
        };
        info!(selector = %candidate, count = cards.len(), "located flight cards");

        self.enter(Phase::Extracting);
        let options = extractor::assemble(&cards, search)?;
        for option in &options {
            info!(
                price = option.price.as_deref().unwrap_or(""),
                date = %option.flight_date,
                status = %option.status,
                "found flight option"
            );
        }

        self.enter(Phase::Assembled);
        Ok(FetchOutcome {
            options,
            phase: Phase::Assembled,
            failed_during: None,
            failure: None,
            card_selector: Some(candidate.to_string()),
            artifacts: Artifacts::default(),
        })
    }

    /// No cards: one option from whatever price the page body shows.
    fn page_fallback(&self, search: &SearchConfig) -> Result<FetchOutcome> {
        let price = extract_price(&normalize_text(&self.driver.body_text()?));

        if price.is_empty() {
            warn!("no flight cards and no price on page");
            return Ok(self.terminal(
                Phase::MissingPrice,
                Status::MissingPrice,
                "no flight cards or page price found".into(),
                search,
            ));
        }

        info!(price = %price, "found page-wide price");
        self.enter(Phase::Assembled);
        Ok(FetchOutcome {
            options: vec![FlightOption::synthetic(Status::Ok, Some(price), search)],
            phase: Phase::Assembled,
            failed_during: None,
            failure: None,
            card_selector: None,
            artifacts: Artifacts::default(),
        })
    }

    fn fail(&self, phase: Phase, status: Status, err: &Error, search: &SearchConfig) -> FetchOutcome {
        self.terminal(phase, status, err.to_string(), search)
    }

    /// Single synthetic record plus diagnostics for a failure phase.
    fn terminal(
        &self,
        phase: Phase,
        status: Status,
        failure: String,
        search: &SearchConfig,
    ) -> FetchOutcome {
        let failed_during = self.phase.replace(phase);
        let artifacts = self
            .diagnostics
            .as_ref()
            .map(|writer| writer.capture(self.driver, status.as_str(), Utc::now()))
            .unwrap_or_default();
        FetchOutcome {
            options: vec![FlightOption::synthetic(status, None, search)],
            phase,
            failed_during: Some(failed_during),
            failure: Some(failure),
            card_selector: None,
            artifacts,
        }
    }
}
