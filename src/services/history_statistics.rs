use chrono::NaiveDate;
use serde::Serialize;

use crate::domain::history::HistoricalItem;
use crate::domain::throughput::Throughput;
use crate::services::forecast::ForecastError;

/// Samples derived from completed history.
///
/// `cycle_times` are continuous fractional days, one per completed item in
/// input order. `throughput` holds one entry per contiguous bucket of
/// `period_length_days`, starting at the earliest resolution date, with empty
/// buckets kept as zero counts.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct HistoricalStatistics {
    pub period_length_days: u32,
    pub cycle_times: Vec<f64>,
    pub throughput: Vec<Throughput>,
}

impl HistoricalStatistics {
    pub fn completed_items(&self) -> usize {
        self.throughput.iter().map(|t| t.completed_issues).sum()
    }

    pub fn throughput_counts(&self) -> Vec<usize> {
        self.throughput.iter().map(|t| t.completed_issues).collect()
    }
}

pub fn extract_statistics<S: AsRef<str>>(
    items: &[HistoricalItem],
    period_length_days: u32,
    min_completed_items: usize,
    done_statuses: &[S],
) -> Result<HistoricalStatistics, ForecastError> {
    if period_length_days == 0 {
        return Err(ForecastError::InvalidConfiguration(
            "period length must be at least one day".to_string(),
        ));
    }

    let mut cycle_times = Vec::new();
    let mut resolution_dates = Vec::new();
    for item in items.iter().filter(|item| item.has_done_status(done_statuses)) {
        let Some(resolved_at) = item.resolved_at else {
            continue;
        };
        match item.cycle_time_days() {
            Some(days) => {
                cycle_times.push(days);
                resolution_dates.push(resolved_at.date());
            }
            None => {
                tracing::warn!(
                    created_at = %item.created_at,
                    resolved_at = %resolved_at,
                    "skipping item resolved before it was created"
                );
            }
        }
    }

    if cycle_times.len() < min_completed_items {
        return Err(ForecastError::InsufficientHistory {
            found: cycle_times.len(),
            required: min_completed_items,
        });
    }

    let throughput = bucket_throughput(&resolution_dates, period_length_days);
    tracing::debug!(
        completed = cycle_times.len(),
        buckets = throughput.len(),
        period_length_days,
        "extracted historical statistics"
    );

    Ok(HistoricalStatistics {
        period_length_days,
        cycle_times,
        throughput,
    })
}

/// Counts resolutions per contiguous bucket. For an inclusive span of `D`
/// days the result has `ceil(D / period_length_days)` entries.
pub fn bucket_throughput(resolution_dates: &[NaiveDate], period_length_days: u32) -> Vec<Throughput> {
    bucket_counts(resolution_dates.iter().map(|date| (*date, 1)), period_length_days)
}

/// Sums `(date, count)` pairs into contiguous buckets that start at the
/// earliest date. Zero counts still extend the span.
pub fn bucket_counts<I>(entries: I, period_length_days: u32) -> Vec<Throughput>
where
    I: IntoIterator<Item = (NaiveDate, usize)>,
{
    let entries: Vec<(NaiveDate, usize)> = entries.into_iter().collect();
    let (Some(first), Some(last)) = (
        entries.iter().map(|(date, _)| *date).min(),
        entries.iter().map(|(date, _)| *date).max(),
    ) else {
        return Vec::new();
    };
    let period = i64::from(period_length_days.max(1));

    let bucket_of = |date: NaiveDate| (date.signed_duration_since(first).num_days() / period) as usize;
    let mut counts = vec![0usize; bucket_of(last) + 1];
    for (date, count) in &entries {
        counts[bucket_of(*date)] += count;
    }

    counts
        .into_iter()
        .enumerate()
        .map(|(idx, completed_issues)| Throughput {
            date: first + chrono::Duration::days(idx as i64 * period),
            completed_issues,
        })
        .collect()
}
