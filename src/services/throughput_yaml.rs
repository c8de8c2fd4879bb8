use std::io::{self, Write};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::throughput::Throughput;
use crate::services::history_statistics::{HistoricalStatistics, bucket_counts};

#[derive(Error, Debug)]
pub enum ThroughputYamlError {
    #[error("failed to read throughput yaml: {0}")]
    Read(#[from] io::Error),
    #[error("failed to parse throughput yaml: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("invalid date format: {0} (expected YYYY-MM-DD)")]
    InvalidDate(String),
    #[error("throughput date {0} appears more than once")]
    DuplicateDate(NaiveDate),
    #[error(
        "throughput records are {bucket_days} days apart and cannot be regrouped into {period_length_days}-day periods"
    )]
    IncompatiblePeriod { bucket_days: u32, period_length_days: u32 },
}

#[derive(Serialize, Deserialize)]
struct ThroughputRecord {
    date: String,
    completed_issues: usize,
}

pub fn serialize_throughput_to_yaml<W: Write>(writer: &mut W, data: &[Throughput]) -> io::Result<()> {
    let records: Vec<ThroughputRecord> = data
        .iter()
        .map(|t| ThroughputRecord {
            date: t.date.format("%Y-%m-%d").to_string(),
            completed_issues: t.completed_issues,
        })
        .collect();

    let yaml = serde_yaml::to_string(&records).map_err(io::Error::other)?;
    writer.write_all(yaml.as_bytes())
}

pub fn deserialize_throughput_from_yaml_str(input: &str) -> Result<Vec<Throughput>, ThroughputYamlError> {
    let records: Vec<ThroughputRecord> = serde_yaml::from_str(input)?;
    records
        .into_iter()
        .map(|record| {
            let date = NaiveDate::parse_from_str(&record.date, "%Y-%m-%d")
                .map_err(|_| ThroughputYamlError::InvalidDate(record.date.clone()))?;
            Ok(Throughput {
                date,
                completed_issues: record.completed_issues,
            })
        })
        .collect()
}

/// Statistics for a throughput file. Such files carry no cycle times, so
/// only throughput-based sampling modes can use them.
pub fn load_statistics_from_throughput_yaml_file(
    path: &str,
    period_length_days: u32,
) -> Result<HistoricalStatistics, ThroughputYamlError> {
    let contents = std::fs::read_to_string(path)?;
    let records = deserialize_throughput_from_yaml_str(&contents)?;
    Ok(HistoricalStatistics {
        period_length_days,
        cycle_times: Vec::new(),
        throughput: regroup_throughput(records, period_length_days)?,
    })
}

/// Regroups file records into `period_length_days` buckets from the earliest
/// record, filling missing dates with zero buckets.
///
/// The file's own bucket length is the greatest common divisor of the gaps
/// between consecutive dates; the target period must be a whole multiple of
/// it. A single record is taken as one full period.
pub fn regroup_throughput(
    mut records: Vec<Throughput>,
    period_length_days: u32,
) -> Result<Vec<Throughput>, ThroughputYamlError> {
    records.sort_by_key(|t| t.date);
    if let Some(pair) = records.windows(2).find(|pair| pair[0].date == pair[1].date) {
        return Err(ThroughputYamlError::DuplicateDate(pair[0].date));
    }

    let bucket_days = records
        .windows(2)
        .map(|pair| pair[1].date.signed_duration_since(pair[0].date).num_days() as u64)
        .fold(0, gcd);
    if bucket_days > 0 && u64::from(period_length_days) % bucket_days != 0 {
        return Err(ThroughputYamlError::IncompatiblePeriod {
            bucket_days: u32::try_from(bucket_days).unwrap_or(u32::MAX),
            period_length_days,
        });
    }

    tracing::debug!(records = records.len(), bucket_days, period_length_days, "regrouping throughput");
    Ok(bucket_counts(
        records.iter().map(|t| (t.date, t.completed_issues)),
        period_length_days,
    ))
}

fn gcd(a: u64, b: u64) -> u64 {
    if b == 0 { a } else { gcd(b, a % b) }
}
