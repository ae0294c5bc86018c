//! Error types for rs-farewatch.
//!
//! Automation faults (`NavigationTimeout`, `ElementWaitTimeout`, `DriverFault`)
//! never escape a fetch: the fetcher turns them into status-tagged synthetic
//! results. The remaining variants belong to configuration and persistence and
//! are returned to the caller.

use std::path::PathBuf;

/// Error type for capture and persistence operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The page did not finish loading within the page-load timeout.
    #[error("Timed out loading {url}")]
    NavigationTimeout { url: String },

    /// No element matched a locator within its wait window.
    #[error("Timed out waiting for element: {locator}")]
    ElementWaitTimeout { locator: String },

    /// Any lower-level browser automation fault.
    #[error("Browser driver fault: {0}")]
    DriverFault(String),

    /// A search or runtime setting violates its invariants.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The target CSV file carries a header other than the current schema.
    #[error("{} has an incompatible header: {}", path.display(), found.join(","))]
    SchemaMismatch { path: PathBuf, found: Vec<String> },

    /// Filesystem failure.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// CSV encoding or decoding failure.
    #[error(transparent)]
    Csv(#[from] csv::Error),
}

impl Error {
    /// True for the two wait-expiry variants.
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            Self::NavigationTimeout { .. } | Self::ElementWaitTimeout { .. }
        )
    }
}

/// Result type alias for capture and persistence operations.
pub type Result<T> = std::result::Result<T, Error>;
