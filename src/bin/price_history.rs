//! Prints the price log as per-route series (JSON), one object per
//! (origin, destination, departure date).

use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use rs_farewatch::history::{load_series, PriceSeries};
use serde::Serialize;

#[derive(Parser, Debug)]
#[command(name = "price_history", about = "Summarize captured flight prices.")]
struct Cli {
    /// CSV price log
    #[arg(long, default_value = "data/flight_prices.csv")]
    csv_path: PathBuf,

    /// Emit min/max/latest only, without individual points
    #[arg(long)]
    summary: bool,
}

#[derive(Serialize)]
struct Summary<'a> {
    slug: String,
    origin: &'a str,
    destination: &'a str,
    departure_date: &'a str,
    captures: usize,
    min: Option<f64>,
    max: Option<f64>,
    latest: Option<f64>,
}

impl<'a> From<&'a PriceSeries> for Summary<'a> {
    fn from(series: &'a PriceSeries) -> Self {
        Self {
            slug: series.slug(),
            origin: &series.origin,
            destination: &series.destination,
            departure_date: &series.departure_date,
            captures: series.points.len(),
            min: series.min(),
            max: series.max(),
            latest: series.latest().map(|p| p.price),
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let series = match load_series(&cli.csv_path) {
        Ok(series) => series,
        Err(e) => {
            eprintln!("Error reading {}: {e}", cli.csv_path.display());
            return ExitCode::FAILURE;
        }
    };

    let json = if cli.summary {
        let summaries: Vec<Summary> = series.iter().map(Summary::from).collect();
        serde_json::to_string_pretty(&summaries)
    } else {
        serde_json::to_string_pretty(&series)
    };

    match json {
        Ok(json) => {
            let mut stdout = io::stdout().lock();
            if writeln!(stdout, "{json}").is_err() {
                return ExitCode::FAILURE;
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error encoding series: {e}");
            ExitCode::FAILURE
        }
    }
}
