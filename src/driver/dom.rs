//! Offline driver over a static HTML snapshot.
//!
//! Backed by the `dom_query` crate. Navigation never leaves the snapshot, so a
//! saved results page (or a hand-written fixture) can be run through the full
//! capture pipeline without a browser. Only CSS locators are supported; XPath
//! candidates resolve to no elements.

use std::cell::RefCell;
use std::path::Path;
use std::rc::Rc;
use std::time::Duration;

use dom_query::{Document, NodeId, Selection};
use tracing::debug;

use super::{Condition, Driver, Element, Wait};
use crate::error::{Error, Result};
use crate::selector::{Candidate, Strategy};
use crate::text::normalize_text;

/// Parse HTML into a document.
#[must_use]
pub fn parse(html: &str) -> Document {
    Document::from(html)
}

/// Ids of CSS matches below `sel`, empty for XPath or unparsable selectors.
fn select_css(sel: &Selection, candidate: &Candidate) -> Vec<NodeId> {
    if candidate.strategy == Strategy::XPath {
        debug!(%candidate, "xpath is not supported on static documents");
        return Vec::new();
    }
    sel.try_select(candidate.value)
        .map(|found| found.nodes().iter().map(|node| node.id).collect())
        .unwrap_or_default()
}

/// Whether the element itself hides its subtree.
fn hides_subtree(sel: &Selection) -> bool {
    if sel.has_attr("hidden") {
        return true;
    }
    sel.attr("style").is_some_and(|style| {
        let style: String = style.chars().filter(|c| !c.is_whitespace()).collect();
        let style = style.to_ascii_lowercase();
        style.contains("display:none") || style.contains("visibility:hidden")
    })
}

/// Walks up from `sel` looking for a hiding ancestor.
fn is_rendered(sel: &Selection) -> bool {
    let mut current = sel.clone();
    while !current.is_empty() {
        if hides_subtree(&current) {
            return false;
        }
        current = current.parent();
    }
    true
}

/// A snapshot page that ignores navigation.
pub struct DomDriver {
    document: Rc<Document>,
    visited: RefCell<Vec<String>>,
    clicks: Rc<RefCell<Vec<String>>>,
}

impl DomDriver {
    #[must_use]
    pub fn from_html(html: &str) -> Self {
        Self {
            document: Rc::new(parse(html)),
            visited: RefCell::new(Vec::new()),
            clicks: Rc::new(RefCell::new(Vec::new())),
        }
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let html = std::fs::read_to_string(path)?;
        Ok(Self::from_html(&html))
    }

    /// URLs passed to [`Driver::navigate`], oldest first.
    #[must_use]
    pub fn visited(&self) -> Vec<String> {
        self.visited.borrow().clone()
    }

    /// Normalized text of every clicked element, oldest first.
    #[must_use]
    pub fn clicks(&self) -> Vec<String> {
        self.clicks.borrow().clone()
    }

    fn root(&self) -> Selection<'_> {
        self.document.select("html")
    }

    fn element(&self, id: NodeId) -> DomElement {
        DomElement { page: Rc::clone(&self.document), id, clicks: Rc::clone(&self.clicks) }
    }
}

impl Driver for DomDriver {
    type Element = DomElement;

    fn navigate(&self, url: &str, _timeout: Duration) -> Result<()> {
        self.visited.borrow_mut().push(url.to_string());
        Ok(())
    }

    fn find_all(&self, candidate: &Candidate) -> Result<Vec<DomElement>> {
        Ok(select_css(&self.root(), candidate)
            .into_iter()
            .map(|id| self.element(id))
            .collect())
    }

    fn body_text(&self) -> Result<String> {
        Ok(self.document.select("body").text().to_string())
    }

    fn screenshot(&self) -> Result<Vec<u8>> {
        Err(Error::DriverFault("static documents cannot be rendered".into()))
    }

    fn page_source(&self) -> Result<String> {
        Ok(self.document.html().to_string())
    }

    /// Single probe: a snapshot never changes, so polling cannot help.
    fn wait_for(
        &self,
        candidate: &Candidate,
        condition: Condition,
        _wait: Wait,
    ) -> Result<Vec<DomElement>> {
        let ready: Vec<_> = self
            .find_all(candidate)?
            .into_iter()
            .filter(|el| el.satisfies(condition))
            .collect();
        if ready.is_empty() {
            return Err(Error::ElementWaitTimeout { locator: candidate.to_string() });
        }
        Ok(ready)
    }
}

/// A node of a [`DomDriver`] snapshot.
///
/// Shares the page document, so the node keeps its real ancestors and
/// table rows or cells stay intact.
pub struct DomElement {
    page: Rc<Document>,
    id: NodeId,
    clicks: Rc<RefCell<Vec<String>>>,
}

impl DomElement {
    fn selection(&self) -> Selection<'_> {
        self.page.tree.get(&self.id).map(Selection::from).unwrap_or_default()
    }

    fn content(&self) -> String {
        self.selection().text().to_string()
    }

    fn rendered(&self) -> bool {
        let sel = self.selection();
        !sel.is_empty() && is_rendered(&sel)
    }
}

impl Element for DomElement {
    fn text(&self) -> Result<String> {
        Ok(if self.rendered() { self.content() } else { String::new() })
    }

    fn attribute(&self, name: &str) -> Result<Option<String>> {
        Ok(match name {
            "textContent" => Some(self.content()),
            "innerText" => Some(self.text()?),
            _ => self.selection().attr(name).map(|v| v.to_string()),
        })
    }

    fn is_displayed(&self) -> Result<bool> {
        Ok(self.rendered())
    }

    fn is_enabled(&self) -> Result<bool> {
        Ok(!self.selection().has_attr("disabled"))
    }

    fn click(&self) -> Result<()> {
        self.clicks.borrow_mut().push(normalize_text(&self.content()));
        Ok(())
    }

    fn find_all(&self, candidate: &Candidate) -> Result<Vec<Self>> {
        Ok(select_css(&self.selection(), candidate)
            .into_iter()
            .map(|id| Self { page: Rc::clone(&self.page), id, clicks: Rc::clone(&self.clicks) })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
        <html><body>
            <section style="display:none"><span class="deal">£5.00</span></section>
            <div class="card" data-label="Outbound">
                <span class="price" aria-label="Fare £19.99">£19.99</span>
                <span class="time">06:30</span><span class="time">08:45</span>
            </div>
        </body></html>
    "#;

    #[test]
    fn test_parse_and_select() {
        let driver = DomDriver::from_html(PAGE);
        let cards = driver.find_all(&Candidate::css(".card")).unwrap();
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].attribute("data-label").unwrap().as_deref(), Some("Outbound"));
    }

    #[test]
    fn scoped_queries_only_see_descendants() {
        let driver = DomDriver::from_html(PAGE);
        let card = driver.find_all(&Candidate::css(".card")).unwrap().remove(0);
        let times = card.find_all(&Candidate::css(".time")).unwrap();
        let texts: Vec<String> = times.iter().map(|t| t.text().unwrap()).collect();
        assert_eq!(texts, vec!["06:30", "08:45"]);
        assert!(card.find_all(&Candidate::css(".deal")).unwrap().is_empty());
    }

    #[test]
    fn hidden_ancestor_blanks_visible_text() {
        let driver = DomDriver::from_html(PAGE);
        let deal = driver.find_all(&Candidate::css(".deal")).unwrap().remove(0);
        assert!(!deal.is_displayed().unwrap());
        assert_eq!(deal.text().unwrap(), "");
        assert_eq!(deal.attribute("textContent").unwrap().as_deref(), Some("£5.00"));
    }

    #[test]
    fn xpath_resolves_to_nothing() {
        let driver = DomDriver::from_html(PAGE);
        assert!(driver.find_all(&Candidate::xpath("//div")).unwrap().is_empty());
    }

    #[test]
    fn navigation_and_clicks_are_recorded() {
        let driver = DomDriver::from_html(PAGE);
        driver.navigate("https://example.com/select", Duration::from_secs(1)).unwrap();
        let price = driver.find_all(&Candidate::css(".price")).unwrap().remove(0);
        price.click().unwrap();

        assert_eq!(driver.visited(), vec!["https://example.com/select"]);
        assert_eq!(driver.clicks(), vec!["£19.99"]);
    }

    #[test]
    fn table_rows_keep_their_cells() {
        let driver = DomDriver::from_html(
            r#"<table><tr class="row"><td class="price">£42.00</td><td class="time">07:15</td></tr></table>"#,
        );
        let row = driver.find_all(&Candidate::css("tr.row")).unwrap().remove(0);
        let price = row.find_all(&Candidate::css("td.price")).unwrap();

        assert_eq!(price.len(), 1);
        assert_eq!(price[0].text().unwrap(), "£42.00");
        assert!(row.text().unwrap().contains("07:15"));
    }

    #[test]
    fn screenshots_are_unavailable() {
        let driver = DomDriver::from_html(PAGE);
        assert!(matches!(driver.screenshot(), Err(Error::DriverFault(_))));
        assert!(driver.page_source().unwrap().contains("class=\"card\""));
    }
}
