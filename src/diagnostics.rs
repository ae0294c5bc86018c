//! Screenshot and page-source capture for failed attempts.
//!
//! Artifacts are advisory: nothing reads them back, and a failure to write
//! them is logged and otherwise ignored.

use std::fs;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::driver::Driver;

/// Files written for one failure. A `None` path was not written.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Artifacts {
    pub screenshot: Option<PathBuf>,
    pub page_source: Option<PathBuf>,
}

/// Writes `<label>-<YYYYmmdd-HHMMSS>.png` / `.html` pairs into one directory.
#[derive(Debug, Clone)]
pub struct DiagnosticsWriter {
    dir: PathBuf,
}

impl DiagnosticsWriter {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Captures the current page under `label`, stamped with `now`.
    ///
    /// Each file is attempted independently, so a driver that cannot render
    /// still leaves its page source behind.
    pub fn capture<D: Driver>(&self, driver: &D, label: &str, now: DateTime<Utc>) -> Artifacts {
        if let Err(err) = fs::create_dir_all(&self.dir) {
            warn!(dir = %self.dir.display(), error = %err, "cannot create debug directory");
            return Artifacts::default();
        }

        let stem = format!("{label}-{}", now.format("%Y%m%d-%H%M%S"));
        let screenshot_path = self.dir.join(format!("{stem}.png"));
        let html_path = self.dir.join(format!("{stem}.html"));

        let screenshot = driver
            .screenshot()
            .and_then(|png| Ok(fs::write(&screenshot_path, png)?))
            .map(|()| screenshot_path)
            .map_err(|err| warn!(error = %err, "failed to save screenshot"))
            .ok();

        let page_source = driver
            .page_source()
            .and_then(|html| Ok(fs::write(&html_path, html)?))
            .map(|()| html_path)
            .map_err(|err| warn!(error = %err, "failed to save page source"))
            .ok();

        if screenshot.is_some() || page_source.is_some() {
            info!(dir = %self.dir.display(), label, "saved debug artifacts");
        }
        Artifacts { screenshot, page_source }
    }
}
