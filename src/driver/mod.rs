//! Browser automation seam.
//!
//! The capture pipeline only talks to a browser through [`Driver`] and
//! [`Element`]. Every call blocks until it completes or its own timeout
//! expires. Two implementations ship with the crate:
//!
//! - [`DomDriver`]: a static HTML snapshot parsed with `dom_query`, used to
//!   replay saved result pages and in tests.
//! - `ChromeDriver` (feature `chrome`): a live Chrome session over the
//!   DevTools protocol.

use std::thread;
use std::time::{Duration, Instant};

use crate::error::{Error, Result};
use crate::selector::Candidate;

pub mod dom;
#[cfg(feature = "chrome")]
pub mod chrome;

pub use dom::{DomDriver, DomElement};
#[cfg(feature = "chrome")]
pub use chrome::{ChromeDriver, ChromeElement};

/// State an element must reach before a wait succeeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Condition {
    /// Attached to the document.
    Present,
    /// Present and rendered.
    Visible,
    /// Visible and enabled.
    Clickable,
}

/// Bounds for a polling wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Wait {
    pub timeout: Duration,
    pub poll: Duration,
}

impl Wait {
    #[must_use]
    pub const fn new(timeout: Duration, poll: Duration) -> Self {
        Self { timeout, poll }
    }
}

/// A handle to one element on the current page.
pub trait Element: Sized {
    /// Rendered text, empty when the element is not displayed.
    fn text(&self) -> Result<String>;

    /// Attribute or DOM property value; `None` when absent.
    fn attribute(&self, name: &str) -> Result<Option<String>>;

    fn is_displayed(&self) -> Result<bool> {
        Ok(true)
    }

    fn is_enabled(&self) -> Result<bool> {
        Ok(true)
    }

    fn click(&self) -> Result<()>;

    /// Descendants of this element matching `candidate`, in document order.
    fn find_all(&self, candidate: &Candidate) -> Result<Vec<Self>>;

    /// Whether this element currently satisfies `condition`.
    ///
    /// Read failures count as "not yet"; the element may be mid-render.
    fn satisfies(&self, condition: Condition) -> bool {
        match condition {
            Condition::Present => true,
            Condition::Visible => self.is_displayed().unwrap_or(false),
            Condition::Clickable => {
                self.is_displayed().unwrap_or(false) && self.is_enabled().unwrap_or(false)
            }
        }
    }
}

/// A browser session positioned on one page at a time.
pub trait Driver {
    type Element: Element;

    /// Loads `url`, failing with [`Error::NavigationTimeout`] after `timeout`.
    fn navigate(&self, url: &str, timeout: Duration) -> Result<()>;

    /// Elements anywhere in the document matching `candidate`.
    fn find_all(&self, candidate: &Candidate) -> Result<Vec<Self::Element>>;

    /// Visible text of the whole page body.
    fn body_text(&self) -> Result<String>;

    /// Full-page PNG.
    fn screenshot(&self) -> Result<Vec<u8>>;

    /// Current serialized DOM.
    fn page_source(&self) -> Result<String>;

    /// Polls [`Driver::find_all`] until at least one match satisfies
    /// `condition`, returning those matches.
    ///
    /// The lookup runs at least once, so a zero timeout is a single probe.
    /// Fails with [`Error::ElementWaitTimeout`] when the window closes.
    fn wait_for(
        &self,
        candidate: &Candidate,
        condition: Condition,
        wait: Wait,
    ) -> Result<Vec<Self::Element>> {
        let started = Instant::now();
        loop {
            let ready: Vec<_> = self
                .find_all(candidate)?
                .into_iter()
                .filter(|el| el.satisfies(condition))
                .collect();
            if !ready.is_empty() {
                return Ok(ready);
            }

            let elapsed = started.elapsed();
            if elapsed >= wait.timeout {
                return Err(Error::ElementWaitTimeout { locator: candidate.to_string() });
            }
            thread::sleep(wait.poll.min(wait.timeout - elapsed));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
        <html><body>
            <button class="accept" disabled>Accept cookies</button>
            <button class="accept">Accept all cookies</button>
            <div class="ghost" style="display: none">hidden</div>
        </body></html>
    "#;

    fn no_wait() -> Wait {
        Wait::new(Duration::ZERO, Duration::ZERO)
    }

    #[test]
    fn wait_for_clickable_skips_disabled_buttons() {
        let driver = DomDriver::from_html(PAGE);
        let found = driver
            .wait_for(&Candidate::css("button.accept"), Condition::Clickable, no_wait())
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].text().unwrap().trim(), "Accept all cookies");
    }

    #[test]
    fn wait_for_visible_times_out_on_hidden_element() {
        let driver = DomDriver::from_html(PAGE);
        let result = driver.wait_for(&Candidate::css(".ghost"), Condition::Visible, no_wait());
        assert!(matches!(result, Err(Error::ElementWaitTimeout { .. })));
    }

    #[test]
    fn wait_for_present_accepts_hidden_element() {
        let driver = DomDriver::from_html(PAGE);
        let found = driver
            .wait_for(&Candidate::css(".ghost"), Condition::Present, no_wait())
            .unwrap();
        assert_eq!(found.len(), 1);
    }

    /// Page whose elements only appear after a number of lookups.
    struct Countdown {
        page: DomDriver,
        remaining: std::cell::Cell<u32>,
    }

    impl Driver for Countdown {
        type Element = DomElement;

        fn navigate(&self, _url: &str, _timeout: Duration) -> Result<()> {
            Ok(())
        }

        fn find_all(&self, candidate: &Candidate) -> Result<Vec<DomElement>> {
            match self.remaining.get() {
                0 => self.page.find_all(candidate),
                n => {
                    self.remaining.set(n - 1);
                    Ok(Vec::new())
                }
            }
        }

        fn body_text(&self) -> Result<String> {
            self.page.body_text()
        }

        fn screenshot(&self) -> Result<Vec<u8>> {
            self.page.screenshot()
        }

        fn page_source(&self) -> Result<String> {
            self.page.page_source()
        }
    }

    #[test]
    fn wait_for_polls_until_elements_appear() {
        let driver = Countdown { page: DomDriver::from_html(PAGE), remaining: 3.into() };
        let wait = Wait::new(Duration::from_secs(2), Duration::from_millis(5));
        let found = driver
            .wait_for(&Candidate::css("button.accept"), Condition::Present, wait)
            .unwrap();
        assert_eq!(found.len(), 2);
        assert_eq!(driver.remaining.get(), 0);
    }

    #[test]
    fn wait_for_respects_timeout() {
        let driver = Countdown { page: DomDriver::from_html(PAGE), remaining: u32::MAX.into() };
        let wait = Wait::new(Duration::from_millis(30), Duration::from_millis(10));
        let started = Instant::now();
        let result = driver.wait_for(&Candidate::css("button.accept"), Condition::Present, wait);
        assert!(matches!(result, Err(Error::ElementWaitTimeout { .. })));
        assert!(started.elapsed() >= Duration::from_millis(30));
    }
}
