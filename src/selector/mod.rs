//! Selector Infrastructure
//!
//! A [`Candidate`] is one way of locating an element: a strategy tag plus the
//! locator text. Chains of candidates are static, ordered slices (see
//! [`crate::patterns`]) and are resolved with [`resolve_first`]: each candidate
//! is attempted in declared order and the first one that produces a value wins.

use std::fmt;

use tracing::debug;

use crate::error::Result;

/// Locator strategy understood by a browser driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strategy {
    Css,
    XPath,
}

/// One selector in a fallback chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Candidate {
    pub strategy: Strategy,
    pub value: &'static str,
}

impl Candidate {
    #[must_use]
    pub const fn css(value: &'static str) -> Self {
        Self { strategy: Strategy::Css, value }
    }

    #[must_use]
    pub const fn xpath(value: &'static str) -> Self {
        Self { strategy: Strategy::XPath, value }
    }
}

impl fmt::Display for Candidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.strategy {
            Strategy::Css => write!(f, "css={}", self.value),
            Strategy::XPath => write!(f, "xpath={}", self.value),
        }
    }
}

/// Outcome of a successful chain resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolved<T> {
    /// The candidate that produced `value`.
    pub candidate: Candidate,
    /// Zero-based position of `candidate` in the chain.
    pub index: usize,
    pub value: T,
}

/// Resolves a chain: first candidate whose attempt yields `Some` wins.
///
/// `attempt` returns `Ok(None)` for "nothing here". Wait timeouts
/// ([`Error::ElementWaitTimeout`](crate::Error::ElementWaitTimeout)) are
/// treated the same way, so a slow or absent early candidate never hides a
/// later one. Any other error aborts the chain and is returned.
///
/// Returns `Ok(None)` once every candidate has been attempted without success.
///
/// # Example
///
/// ```rust
/// use rs_farewatch::selector::{resolve_first, Candidate};
///
/// let chain = [Candidate::css(".a"), Candidate::css(".b")];
/// let hit = resolve_first(&chain, |c| Ok((c.value == ".b").then_some(42)))?;
/// assert_eq!(hit.map(|r| (r.index, r.value)), Some((1, 42)));
/// # Ok::<(), rs_farewatch::Error>(())
/// ```
pub fn resolve_first<T, F>(candidates: &[Candidate], mut attempt: F) -> Result<Option<Resolved<T>>>
where
    F: FnMut(&Candidate) -> Result<Option<T>>,
{
    for (index, candidate) in candidates.iter().enumerate() {
        match attempt(candidate) {
            Ok(Some(value)) => {
                debug!(%candidate, index, "selector matched");
                return Ok(Some(Resolved { candidate: *candidate, index, value }));
            }
            Ok(None) => debug!(%candidate, "selector missed"),
            Err(err) if err.is_timeout() => debug!(%candidate, "selector timed out"),
            Err(err) => return Err(err),
        }
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    const CHAIN: &[Candidate] = &[
        Candidate::css(".first"),
        Candidate::css(".second"),
        Candidate::xpath("//third"),
        Candidate::css(".fourth"),
    ];

    #[test]
    fn only_matching_candidate_wins_after_earlier_attempts() {
        let mut attempted = Vec::new();
        let result = resolve_first(CHAIN, |c| {
            attempted.push(*c);
            Ok((c.value == "//third").then(|| "found".to_string()))
        })
        .unwrap();

        let resolved = result.unwrap();
        assert_eq!(resolved.candidate, Candidate::xpath("//third"));
        assert_eq!(resolved.index, 2);
        assert_eq!(resolved.value, "found");
        assert_eq!(attempted, CHAIN[..3].to_vec());
    }

    #[test]
    fn timeouts_fall_through_to_next_candidate() {
        let result = resolve_first(CHAIN, |c| {
            if c.value == ".first" {
                Err(Error::ElementWaitTimeout { locator: c.to_string() })
            } else {
                Ok(Some(c.value))
            }
        })
        .unwrap();

        assert_eq!(result.map(|r| r.value), Some(".second"));
    }

    #[test]
    fn driver_faults_abort_the_chain() {
        let mut calls = 0;
        let result: Result<Option<Resolved<()>>> = resolve_first(CHAIN, |_| {
            calls += 1;
            Err(Error::DriverFault("session gone".into()))
        });

        assert!(matches!(result, Err(Error::DriverFault(_))));
        assert_eq!(calls, 1);
    }

    #[test]
    fn exhausted_chain_is_none() {
        let mut calls = 0;
        let result: Option<Resolved<()>> = resolve_first(CHAIN, |_| {
            calls += 1;
            Ok(None)
        })
        .unwrap();

        assert!(result.is_none());
        assert_eq!(calls, CHAIN.len());
    }

    #[test]
    fn display_includes_strategy() {
        assert_eq!(Candidate::css(".price").to_string(), "css=.price");
        assert_eq!(Candidate::xpath("//b").to_string(), "xpath=//b");
    }
}
