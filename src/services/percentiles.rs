//! Percentile helpers and the reduction of trial results into a forecast.
//!
//! - Empty input => `None`.
//! - Nearest rank: the value at index `floor(len * percentile / 100)` of the
//!   ascending slice, clamped to `[0, len-1]`. The result is always one of the
//!   input values, never an interpolation between two of them.
use std::collections::BTreeSet;

use chrono::{Days, NaiveDate};

use crate::services::simulation::TrialResult;
use crate::services::simulation_types::{ConfidenceInterval, ForecastResult, ForecastSummary};

/// Returns the nearest-rank percentile from a slice that is already sorted in
/// ascending order.
pub fn value_sorted<T: Copy>(sorted_values: &[T], percentile: u8) -> Option<T> {
    if sorted_values.is_empty() {
        return None;
    }
    let rank = sorted_values.len() * usize::from(percentile) / 100;
    let index = rank.min(sorted_values.len() - 1);
    sorted_values.get(index).copied()
}

/// Middle element, or the mean of the two middle elements for even lengths.
pub fn median_sorted(sorted_values: &[TrialResult]) -> f64 {
    let len = sorted_values.len();
    if len == 0 {
        return 0.0;
    }
    let upper = sorted_values[len / 2] as f64;
    if len % 2 == 1 {
        upper
    } else {
        (sorted_values[len / 2 - 1] as f64 + upper) / 2.0
    }
}

/// Mean and population standard deviation; `(0.0, 0.0)` for empty input.
pub fn mean_and_std_dev(values: &[f64]) -> (f64, f64) {
    if values.is_empty() {
        return (0.0, 0.0);
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    (mean, variance.sqrt())
}

pub fn completion_date(reference_date: NaiveDate, periods: TrialResult, period_length_days: u32) -> (u64, NaiveDate) {
    let days = (periods as u64).saturating_mul(u64::from(period_length_days));
    let date = reference_date
        .checked_add_days(Days::new(days))
        .unwrap_or(NaiveDate::MAX);
    (days, date)
}

/// Summarizes all trial results and picks one confidence interval per
/// distinct level, ascending. `trial_results` keeps its simulation order.
pub fn reduce(
    trial_results: Vec<TrialResult>,
    confidence_levels: &[u8],
    period_length_days: u32,
    reference_date: NaiveDate,
) -> ForecastResult {
    let mut sorted = trial_results.clone();
    sorted.sort_unstable();

    let levels: BTreeSet<u8> = confidence_levels.iter().copied().collect();
    let confidence_intervals = levels
        .into_iter()
        .filter_map(|level| {
            let periods_required = value_sorted(&sorted, level)?;
            let (days_remaining, completion_date) =
                completion_date(reference_date, periods_required, period_length_days);
            Some(ConfidenceInterval {
                confidence_level: level,
                periods_required,
                days_remaining,
                completion_date,
            })
        })
        .collect();

    let as_f64: Vec<f64> = trial_results.iter().map(|value| *value as f64).collect();
    let (mean, standard_deviation) = mean_and_std_dev(&as_f64);

    ForecastResult {
        iterations: trial_results.len(),
        period_length_days,
        reference_date,
        confidence_intervals,
        summary: ForecastSummary {
            mean,
            median: median_sorted(&sorted),
            standard_deviation,
        },
        raw_trial_results: trial_results,
    }
}
