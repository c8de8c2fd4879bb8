use std::io;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::Deserialize;
use thiserror::Error;

use crate::domain::history::{HistoricalItem, is_done_status};

#[derive(Error, Debug)]
pub enum HistoryCsvError {
    #[error("failed to read history csv: {0}")]
    Read(#[from] io::Error),
    #[error("failed to parse history csv: {0}")]
    Parse(#[from] csv::Error),
    #[error("column not found in csv header: {0}")]
    MissingColumn(String),
    #[error("invalid timestamp in row {row}: {value}")]
    InvalidTimestamp { row: usize, value: String },
}

/// Header names of the columns read from an issue export.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct CsvColumns {
    pub created: String,
    pub resolved: String,
    pub status: String,
}

impl Default for CsvColumns {
    fn default() -> Self {
        Self {
            created: "Created".to_string(),
            resolved: "Resolved".to_string(),
            status: "Status".to_string(),
        }
    }
}

/// Every exported row as a [`HistoricalItem`], plus the number of rows whose
/// status is not done-equivalent.
#[derive(Debug, Clone, PartialEq)]
pub struct HistorySnapshot {
    pub items: Vec<HistoricalItem>,
    pub remaining_count: usize,
}

const DATE_TIME_FORMATS: [&str; 6] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%d/%b/%y %I:%M %p",
    "%d/%b/%Y %I:%M %p",
];

pub fn load_history_from_csv_file<S: AsRef<str>>(
    path: &str,
    columns: &CsvColumns,
    done_statuses: &[S],
) -> Result<HistorySnapshot, HistoryCsvError> {
    let contents = std::fs::read_to_string(path)?;
    deserialize_history_from_csv_str(&contents, columns, done_statuses)
}

pub fn deserialize_history_from_csv_str<S: AsRef<str>>(
    input: &str,
    columns: &CsvColumns,
    done_statuses: &[S],
) -> Result<HistorySnapshot, HistoryCsvError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(input.as_bytes());

    let headers = reader.headers()?.clone();
    let column_index = |name: &str| {
        headers
            .iter()
            .position(|header| header == name)
            .ok_or_else(|| HistoryCsvError::MissingColumn(name.to_string()))
    };
    let created_idx = column_index(&columns.created)?;
    let resolved_idx = column_index(&columns.resolved)?;
    let status_idx = column_index(&columns.status)?;

    let mut items = Vec::new();
    let mut remaining_count = 0;
    for (idx, record) in reader.records().enumerate() {
        let record = record?;
        // Header is line 1.
        let row = idx + 2;

        let created_value = record.get(created_idx).unwrap_or_default();
        let created_at = parse_timestamp(created_value).ok_or_else(|| {
            HistoryCsvError::InvalidTimestamp {
                row,
                value: created_value.to_string(),
            }
        })?;

        let resolved_value = record.get(resolved_idx).unwrap_or_default();
        let resolved_at = if resolved_value.is_empty() {
            None
        } else {
            Some(parse_timestamp(resolved_value).ok_or_else(|| {
                HistoryCsvError::InvalidTimestamp {
                    row,
                    value: resolved_value.to_string(),
                }
            })?)
        };

        let status = record.get(status_idx).unwrap_or_default();
        if !is_done_status(status, done_statuses) {
            remaining_count += 1;
        }
        items.push(HistoricalItem::new(created_at, resolved_at, status));
    }

    tracing::debug!(rows = items.len(), remaining_count, "loaded history csv");
    Ok(HistorySnapshot {
        items,
        remaining_count,
    })
}

/// Accepts RFC 3339, Jira API and export timestamps, ISO date-times and plain
/// dates. Offsets are converted to UTC.
pub fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Some(parsed.naive_utc());
    }
    if let Ok(parsed) = DateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f%z") {
        return Some(parsed.naive_utc());
    }
    for format in DATE_TIME_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(value, format) {
            return Some(parsed);
        }
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
}
