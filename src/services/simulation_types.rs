use chrono::NaiveDate;
use serde::Serialize;

use crate::services::history_statistics::HistoricalStatistics;
use crate::services::simulation::TrialResult;
use crate::services::simulation_config::SamplingMode;

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct ConfidenceInterval {
    pub confidence_level: u8,
    pub periods_required: TrialResult,
    pub days_remaining: u64,
    pub completion_date: NaiveDate,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct ForecastSummary {
    pub mean: f64,
    pub median: f64,
    pub standard_deviation: f64,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct ForecastResult {
    pub iterations: usize,
    pub period_length_days: u32,
    pub reference_date: NaiveDate,
    pub confidence_intervals: Vec<ConfidenceInterval>,
    pub summary: ForecastSummary,
    pub raw_trial_results: Vec<TrialResult>,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct ForecastOutput {
    pub data_source: String,
    pub remaining_items: usize,
    pub sampling_mode: SamplingMode,
    pub result: ForecastResult,
    pub history: HistoricalStatistics,
}
