//! Price log rows and the append-only CSV writer.
//!
//! The log has one fixed column set, [`CSV_HEADERS`]. The header is written
//! only when the file is created; later runs append rows and never rewrite
//! earlier ones. Files created under the older [`LEGACY_HEADERS`] layout are
//! refused until converted with [`migrate_legacy`].

use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{Error, Result};
use crate::options::SearchConfig;
use crate::result::FlightOption;

/// Column order of the price log.
pub const CSV_HEADERS: [&str; 8] = [
    "timestamp_utc",
    "origin",
    "destination",
    "departure_date",
    "arrival_date",
    "price",
    "currency",
    "status",
];

/// Column order of logs written before per-flight times were captured.
pub const LEGACY_HEADERS: [&str; 9] = [
    "timestamp_utc",
    "origin",
    "destination",
    "depart_date",
    "return_date",
    "price",
    "currency",
    "status",
    "notes",
];

/// Capture timestamp layout (`2024-08-01T06:05:09`).
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// One line of the price log. Field order is column order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceRow {
    pub timestamp_utc: String,
    pub origin: String,
    pub destination: String,
    pub departure_date: String,
    pub arrival_date: String,
    pub price: String,
    pub currency: String,
    pub status: String,
}

impl PriceRow {
    /// Flattens an option for the log. Pure: same inputs, same row.
    #[must_use]
    pub fn new(option: &FlightOption, search: &SearchConfig, captured_at: DateTime<Utc>) -> Self {
        Self {
            timestamp_utc: captured_at.format(TIMESTAMP_FORMAT).to_string(),
            origin: search.origin().to_string(),
            destination: search.destination().to_string(),
            departure_date: combine_date_time(&option.flight_date, &option.depart_time),
            arrival_date: combine_date_time(&option.flight_date, &option.return_time),
            price: option.price.clone().unwrap_or_default(),
            currency: option.currency.clone(),
            status: option.status.to_string(),
        }
    }
}

/// `DATE` when `time` is blank, else `DATETtime`.
#[must_use]
pub fn combine_date_time(date: &str, time: &str) -> String {
    let time = time.trim();
    if time.is_empty() {
        date.to_string()
    } else {
        format!("{date}T{time}")
    }
}

/// First record of `path`, or `None` when the file is missing or empty.
pub(crate) fn read_header(path: &Path) -> Result<Option<Vec<String>>> {
    if !path.exists() || fs::metadata(path)?.len() == 0 {
        return Ok(None);
    }
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)?;
    Ok(reader
        .records()
        .next()
        .transpose()?
        .map(|record| record.iter().map(str::to_string).collect()))
}

pub(crate) fn matches_schema(found: &[String], schema: &[&str]) -> bool {
    found.len() == schema.len() && found.iter().zip(schema).all(|(a, b)| a == b)
}

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

/// Appends `rows` to the log at `path`, creating it with a header if needed.
///
/// Fails with [`Error::SchemaMismatch`] if the existing header is anything
/// other than [`CSV_HEADERS`]; nothing is written in that case.
pub fn append_rows(path: &Path, rows: &[PriceRow]) -> Result<usize> {
    ensure_parent(path)?;
    let header = read_header(path)?;
    if let Some(found) = &header {
        if !matches_schema(found, &CSV_HEADERS) {
            return Err(Error::SchemaMismatch { path: path.to_path_buf(), found: found.clone() });
        }
    }

    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(file);
    if header.is_none() {
        writer.write_record(CSV_HEADERS)?;
    }
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;

    info!(path = %path.display(), rows = rows.len(), "appended rows");
    Ok(rows.len())
}

/// Appends a single row. See [`append_rows`].
pub fn append_row(path: &Path, row: &PriceRow) -> Result<()> {
    append_rows(path, std::slice::from_ref(row)).map(|_| ())
}

/// Converts a legacy-layout log to the current layout in place.
///
/// Legacy rows carry the searched dates, not per-flight times, and
/// `return_date` is the date of a different flight. The row's `depart_date`
/// therefore fills both `departure_date` and `arrival_date`; `return_date`
/// and `notes` are dropped. Returns `Ok(false)` when the file is missing,
/// empty, or already current. Any other header is a [`Error::SchemaMismatch`].
pub fn migrate_legacy(path: &Path) -> Result<bool> {
    let Some(found) = read_header(path)? else {
        return Ok(false);
    };
    if matches_schema(&found, &CSV_HEADERS) {
        return Ok(false);
    }
    if !matches_schema(&found, &LEGACY_HEADERS) {
        return Err(Error::SchemaMismatch { path: path.to_path_buf(), found });
    }

    let staging = staging_path(path);
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_path(path)?;
    {
        let mut writer = csv::Writer::from_writer(File::create(&staging)?);
        writer.write_record(CSV_HEADERS)?;
        let mut migrated = 0usize;
        for record in reader.records() {
            let record = record?;
            let field = |i: usize| record.get(i).unwrap_or("");
            writer.write_record([
                field(0),
                field(1),
                field(2),
                field(3),
                field(3),
                field(5),
                field(6),
                field(7),
            ])?;
            migrated += 1;
        }
        writer.flush()?;
        writer.into_inner().map_err(|e| Error::Io(e.into_error()))?.sync_all()?;
        info!(path = %path.display(), rows = migrated, "migrated legacy price log");
    }
    fs::rename(&staging, path)?;
    Ok(true)
}

fn staging_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".migrating");
    path.with_file_name(name)
}
