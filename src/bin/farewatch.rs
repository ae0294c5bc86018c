//! Captures today's price for one route/date pairing and appends it to the
//! price log. Meant to be run on a schedule.

use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

use anyhow::Context;
use chrono::Utc;
use clap::Parser;
use rs_farewatch::driver::ChromeDriver;
use rs_farewatch::record::{append_rows, migrate_legacy};
use rs_farewatch::{outcome_rows, FlightOption, Fetcher, Options, PriceRow, SearchConfig, Status};
use tracing::{error, info, warn};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "farewatch", about = "Track Ryanair return flight prices.")]
struct Cli {
    /// Origin airport IATA code
    #[arg(long, default_value = "STN")]
    origin: String,

    /// Destination airport IATA code
    #[arg(long, default_value = "BGY")]
    destination: String,

    /// Outbound date (YYYY-MM-DD)
    #[arg(long, default_value = "2024-08-22")]
    depart_date: String,

    /// Return date (YYYY-MM-DD)
    #[arg(long, default_value = "2024-09-04")]
    return_date: String,

    #[arg(long, default_value_t = 1)]
    adults: u32,

    /// Currency to display
    #[arg(long, default_value = "GBP")]
    currency: String,

    /// CSV price log
    #[arg(long, default_value = "data/flight_prices.csv")]
    csv_path: PathBuf,

    /// Log file, written alongside stderr
    #[arg(long, default_value = "logs/farewatch.log")]
    log_path: PathBuf,

    /// Page load timeout in seconds
    #[arg(long, default_value_t = 40)]
    timeout: u64,

    /// Per-selector wait for the cookie banner, in seconds
    #[arg(long, default_value_t = 5)]
    selector_wait: u64,

    /// Run Chrome without a window
    #[arg(long)]
    headless: bool,

    /// Directory for screenshots and page source of failed runs
    #[arg(long, default_value = "debug_artifacts")]
    debug_dir: PathBuf,

    /// Do not save debug artifacts
    #[arg(long)]
    no_debug: bool,

    /// Debug-level logging
    #[arg(short, long)]
    verbose: bool,

    /// Convert a legacy-layout price log before appending
    #[arg(long)]
    migrate_legacy: bool,
}

impl Cli {
    fn options(&self) -> Options {
        Options {
            page_load_timeout: Duration::from_secs(self.timeout),
            selector_wait: Duration::from_secs(self.selector_wait),
            debug_dir: (!self.no_debug).then(|| self.debug_dir.clone()),
            headless: self.headless,
            ..Options::default()
        }
    }
}

fn init_logging(log_path: &Path, verbose: bool) -> anyhow::Result<()> {
    if let Some(parent) = log_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating log directory {}", parent.display()))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_path)
        .with_context(|| format!("opening log file {}", log_path.display()))?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if verbose { "debug" } else { "info" }));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(fmt::layer().with_writer(Mutex::new(file)).with_ansi(false))
        .init();
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_path, cli.verbose)?;

    let search = SearchConfig::new(
        &cli.origin,
        &cli.destination,
        &cli.depart_date,
        &cli.return_date,
        cli.adults,
        &cli.currency,
    )?;
    let options = cli.options();

    if cli.migrate_legacy && migrate_legacy(&cli.csv_path)? {
        info!(path = %cli.csv_path.display(), "price log migrated to current layout");
    }

    let captured_at = Utc::now();
    let driver = match ChromeDriver::launch(&options) {
        Ok(driver) => driver,
        Err(err) => {
            error!(error = %err, "could not start chrome");
            let failed = FlightOption::synthetic(Status::WebdriverError, None, &search);
            append_rows(&cli.csv_path, &[PriceRow::new(&failed, &search, captured_at)])?;
            return Err(err).context("starting chrome");
        }
    };

    let outcome = Fetcher::new(&driver, &options).fetch(&search);
    if let Some(failure) = &outcome.failure {
        warn!(
            phase = ?outcome.phase,
            failed_during = ?outcome.failed_during,
            failure = %failure,
            screenshot = ?outcome.artifacts.screenshot,
            page_source = ?outcome.artifacts.page_source,
            "capture failed"
        );
    }

    append_rows(&cli.csv_path, &outcome_rows(&outcome, &search, captured_at))?;
    Ok(())
}
