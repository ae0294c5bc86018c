//! Reads the price log back as per-route series for charting.

use std::collections::BTreeMap;
use std::path::Path;

use chrono::{DateTime, NaiveDateTime};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::patterns::PRICE_NUMBER;
use crate::record::{matches_schema, read_header, CSV_HEADERS, TIMESTAMP_FORMAT};

/// Numeric value of a logged price cell, ignoring currency marks and
/// thousands separators. `None` for blanks and unparsable text.
///
/// The last `.` or `,` is the decimal mark when one or two digits follow it
/// (`1.234,56`, `19,99`); every other separator groups thousands.
#[must_use]
pub fn parse_price(value: &str) -> Option<f64> {
    let number = PRICE_NUMBER.find(value.trim())?.as_str();
    let (whole, fraction) = match number.rfind(['.', ',']) {
        Some(at) if (2..=3).contains(&(number.len() - at)) => (&number[..at], &number[at + 1..]),
        _ => (number, ""),
    };
    let mut plain: String = whole.chars().filter(|c| *c != '.' && *c != ',').collect();
    if !fraction.is_empty() {
        plain.push('.');
        plain.push_str(fraction);
    }
    plain.parse().ok()
}

/// Capture time of a logged row. Accepts the log's own layout and RFC 3339.
#[must_use]
pub fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    NaiveDateTime::parse_from_str(value, TIMESTAMP_FORMAT)
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(value).ok().map(|dt| dt.naive_utc()))
}

/// Replaces anything but alphanumerics, `-` and `_` with `-`.
#[must_use]
pub fn slugify(value: &str) -> String {
    value
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '-' })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PricePoint {
    pub captured_at: NaiveDateTime,
    pub price: f64,
}

/// Prices captured over time for one (origin, destination, departure date).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceSeries {
    pub origin: String,
    pub destination: String,
    pub departure_date: String,
    /// Oldest capture first.
    pub points: Vec<PricePoint>,
}

impl PriceSeries {
    #[must_use]
    pub fn min(&self) -> Option<f64> {
        self.points.iter().map(|p| p.price).reduce(f64::min)
    }

    #[must_use]
    pub fn max(&self) -> Option<f64> {
        self.points.iter().map(|p| p.price).reduce(f64::max)
    }

    #[must_use]
    pub fn latest(&self) -> Option<&PricePoint> {
        self.points.last()
    }

    /// File stem for per-series output, e.g. `STN_BGY_2024-08-22T06-30`.
    #[must_use]
    pub fn slug(&self) -> String {
        [&self.origin, &self.destination, &self.departure_date]
            .map(|part| slugify(part))
            .join("_")
    }
}

#[derive(Debug, Deserialize)]
struct LoggedRow {
    timestamp_utc: String,
    origin: String,
    destination: String,
    departure_date: String,
    price: String,
}

/// Loads every series from the log at `path`.
///
/// Rows whose timestamp or price does not parse are dropped. Series come back
/// ordered by key, points ordered by capture time. A log under any header but
/// [`CSV_HEADERS`] fails with [`Error::SchemaMismatch`]; legacy logs need
/// [`crate::record::migrate_legacy`] first.
pub fn load_series(path: &Path) -> Result<Vec<PriceSeries>> {
    if let Some(found) = read_header(path)? {
        if !matches_schema(&found, &CSV_HEADERS) {
            return Err(Error::SchemaMismatch { path: path.to_path_buf(), found });
        }
    }
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_path(path)?;
    let mut groups: BTreeMap<(String, String, String), Vec<PricePoint>> = BTreeMap::new();
    let mut dropped = 0usize;

    for row in reader.deserialize::<LoggedRow>() {
        let Ok(row) = row else {
            dropped += 1;
            continue;
        };
        let (Some(captured_at), Some(price)) = (parse_timestamp(&row.timestamp_utc), parse_price(&row.price)) else {
            dropped += 1;
            continue;
        };
        groups
            .entry((row.origin, row.destination, row.departure_date))
            .or_default()
            .push(PricePoint { captured_at, price });
    }
    if dropped > 0 {
        debug!(path = %path.display(), dropped, "skipped unparsable rows");
    }

    Ok(groups
        .into_iter()
        .map(|((origin, destination, departure_date), mut points)| {
            points.sort_by_key(|p| p.captured_at);
            PriceSeries { origin, destination, departure_date, points }
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prices_parse_without_currency_marks() {
        assert_eq!(parse_price("£1,234.50"), Some(1234.5));
        assert_eq!(parse_price("89 EUR"), Some(89.0));
        assert_eq!(parse_price("€1.234,56"), Some(1234.56));
        assert_eq!(parse_price("19,99 €"), Some(19.99));
        assert_eq!(parse_price("£1,056"), Some(1056.0));
        assert_eq!(parse_price("  "), None);
        assert_eq!(parse_price("n/a"), None);
    }

    #[test]
    fn timestamps_accept_both_layouts() {
        let plain = parse_timestamp("2024-08-01T06:05:09").unwrap();
        let rfc = parse_timestamp("2024-08-01T06:05:09+00:00").unwrap();
        assert_eq!(plain, rfc);
        assert!(parse_timestamp("yesterday").is_none());
    }

    #[test]
    fn slug_replaces_separators() {
        assert_eq!(slugify("2024-08-22T06:30"), "2024-08-22T06-30");
        assert_eq!(slugify("STN_x y"), "STN_x-y");
    }

    #[test]
    fn series_summaries() {
        let at = |s| parse_timestamp(s).unwrap();
        let series = PriceSeries {
            origin: "STN".into(),
            destination: "BGY".into(),
            departure_date: "2024-08-22T06:30".into(),
            points: vec![
                PricePoint { captured_at: at("2024-08-01T00:00:00"), price: 40.0 },
                PricePoint { captured_at: at("2024-08-02T00:00:00"), price: 25.5 },
                PricePoint { captured_at: at("2024-08-03T00:00:00"), price: 31.0 },
            ],
        };
        assert_eq!(series.min(), Some(25.5));
        assert_eq!(series.max(), Some(40.0));
        assert_eq!(series.latest().map(|p| p.price), Some(31.0));
        assert_eq!(series.slug(), "STN_BGY_2024-08-22T06-30");
    }
}
