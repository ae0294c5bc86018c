//! Live Chrome session over the DevTools protocol (`headless_chrome`).
//!
//! Element handles are stored as DOM node ids and rebound to the tab on each
//! call, so they hold no borrow of the session.

use std::ffi::OsStr;
use std::sync::Arc;
use std::time::Duration;

use headless_chrome::browser::tab::element::Element as CdpElement;
use headless_chrome::browser::tab::NoElementFound;
use headless_chrome::protocol::cdp::Page::CaptureScreenshotFormatOption;
use headless_chrome::protocol::cdp::DOM::NodeId;
use headless_chrome::util::Timeout;
use headless_chrome::{Browser, LaunchOptions, Tab};
use serde_json::{json, Value};
use tracing::info;

use super::{Driver, Element};
use crate::error::{Error, Result};
use crate::options::Options;
use crate::selector::{Candidate, Strategy};

const IS_DISPLAYED_JS: &str = "function() { \
    const r = this.getBoundingClientRect(); \
    const s = window.getComputedStyle(this); \
    return r.width > 0 && r.height > 0 && s.visibility !== 'hidden' && s.display !== 'none'; }";

const PROPERTY_OR_ATTRIBUTE_JS: &str = "function(name) { \
    const v = this[name]; \
    return typeof v === 'string' ? v : this.getAttribute(name); }";

const BODY_TEXT_JS: &str = "document.body ? document.body.innerText : ''";

fn fault(err: &anyhow::Error) -> Error {
    Error::DriverFault(err.to_string())
}

/// Empty result for "no such element", fault for anything else.
fn matches_or_empty<T>(found: anyhow::Result<Vec<T>>) -> Result<Vec<T>> {
    match found {
        Ok(elements) => Ok(elements),
        Err(err) if err.downcast_ref::<NoElementFound>().is_some() => Ok(Vec::new()),
        Err(err) => Err(fault(&err)),
    }
}

fn string_value(value: Option<Value>) -> Option<String> {
    match value {
        Some(Value::String(s)) => Some(s),
        _ => None,
    }
}

/// A Chrome tab driven over CDP.
pub struct ChromeDriver {
    // Dropping the browser kills the Chrome process; keep it alive with the tab.
    _browser: Browser,
    tab: Arc<Tab>,
}

impl ChromeDriver {
    /// Starts Chrome with the flags CI containers need and opens one tab.
    pub fn launch(options: &Options) -> Result<Self> {
        let launch = LaunchOptions::default_builder()
            .headless(options.headless)
            .sandbox(false)
            .window_size(Some(options.window_size))
            .args(vec![OsStr::new("--disable-gpu"), OsStr::new("--disable-dev-shm-usage")])
            .idle_browser_timeout(options.page_load_timeout * 4)
            .build()
            .map_err(|e| Error::DriverFault(format!("launch options: {e}")))?;

        let browser = Browser::new(launch).map_err(|e| fault(&e))?;
        let tab = browser.new_tab().map_err(|e| fault(&e))?;
        info!(headless = options.headless, "started chrome");

        Ok(Self { _browser: browser, tab })
    }

    fn wrap(&self, elements: Vec<CdpElement<'_>>) -> Vec<ChromeElement> {
        elements
            .into_iter()
            .map(|el| ChromeElement { tab: Arc::clone(&self.tab), node_id: el.node_id })
            .collect()
    }
}

impl Driver for ChromeDriver {
    type Element = ChromeElement;

    fn navigate(&self, url: &str, timeout: Duration) -> Result<()> {
        self.tab.set_default_timeout(timeout);
        let loaded = self
            .tab
            .navigate_to(url)
            .and_then(|tab| tab.wait_until_navigated());
        match loaded {
            Ok(_) => Ok(()),
            Err(err) if err.downcast_ref::<Timeout>().is_some() => {
                Err(Error::NavigationTimeout { url: url.to_string() })
            }
            Err(err) => Err(fault(&err)),
        }
    }

    fn find_all(&self, candidate: &Candidate) -> Result<Vec<ChromeElement>> {
        let found = match candidate.strategy {
            Strategy::Css => self.tab.find_elements(candidate.value),
            Strategy::XPath => self.tab.find_elements_by_xpath(candidate.value),
        };
        Ok(self.wrap(matches_or_empty(found)?))
    }

    fn body_text(&self) -> Result<String> {
        let result = self.tab.evaluate(BODY_TEXT_JS, false).map_err(|e| fault(&e))?;
        Ok(string_value(result.value).unwrap_or_default())
    }

    fn screenshot(&self) -> Result<Vec<u8>> {
        self.tab
            .capture_screenshot(CaptureScreenshotFormatOption::Png, None, None, true)
            .map_err(|e| fault(&e))
    }

    fn page_source(&self) -> Result<String> {
        self.tab.get_content().map_err(|e| fault(&e))
    }
}

/// A node on the live page, identified by its DevTools node id.
#[derive(Clone)]
pub struct ChromeElement {
    tab: Arc<Tab>,
    node_id: NodeId,
}

impl ChromeElement {
    fn bind(&self) -> Result<CdpElement<'_>> {
        CdpElement::new(&self.tab, self.node_id).map_err(|e| fault(&e))
    }
}

impl Element for ChromeElement {
    fn text(&self) -> Result<String> {
        self.bind()?.get_inner_text().map_err(|e| fault(&e))
    }

    fn attribute(&self, name: &str) -> Result<Option<String>> {
        let result = self
            .bind()?
            .call_js_fn(PROPERTY_OR_ATTRIBUTE_JS, vec![json!(name)], false)
            .map_err(|e| fault(&e))?;
        Ok(string_value(result.value))
    }

    fn is_displayed(&self) -> Result<bool> {
        let result = self
            .bind()?
            .call_js_fn(IS_DISPLAYED_JS, vec![], false)
            .map_err(|e| fault(&e))?;
        Ok(matches!(result.value, Some(Value::Bool(true))))
    }

    fn is_enabled(&self) -> Result<bool> {
        let disabled = self
            .bind()?
            .get_attribute_value("disabled")
            .map_err(|e| fault(&e))?;
        Ok(disabled.is_none())
    }

    fn click(&self) -> Result<()> {
        self.bind()?.click().map_err(|e| fault(&e))?;
        Ok(())
    }

    fn find_all(&self, candidate: &Candidate) -> Result<Vec<Self>> {
        let element = self.bind()?;
        let found = match candidate.strategy {
            Strategy::Css => element.find_elements(candidate.value),
            Strategy::XPath => element.find_elements_by_xpath(candidate.value),
        };
        Ok(matches_or_empty(found)?
            .into_iter()
            .map(|el| ChromeElement { tab: Arc::clone(&self.tab), node_id: el.node_id })
            .collect())
    }
}
