use std::io;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::history::DEFAULT_DONE_STATUSES;
use crate::services::forecast::ForecastError;
use crate::services::history_csv::CsvColumns;

pub const DEFAULT_ITERATIONS: usize = 10_000;
pub const DEFAULT_PERIOD_LENGTH_DAYS: u32 = 7;
pub const DEFAULT_MAX_PERIODS: usize = 10_000;
pub const DEFAULT_MIN_COMPLETED_ITEMS: usize = 2;
pub const DEFAULT_CONFIDENCE_LEVELS: [u8; 4] = [50, 75, 85, 95];

#[derive(Error, Debug)]
pub enum SimulationConfigError {
    #[error("failed to read config file: {0}")]
    Read(#[from] io::Error),
    #[error("failed to parse config yaml: {0}")]
    Parse(#[from] serde_yaml::Error),
}

/// How a simulated period's velocity is drawn from history.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum SamplingMode {
    /// Resample observed throughput buckets with replacement.
    #[default]
    Bootstrap,
    /// Draw from a normal distribution fit to the throughput buckets.
    Normal,
    /// Convert resampled cycle times to items per period.
    CycleTime,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct SimulationConfig {
    pub iterations: usize,
    pub period_length_days: u32,
    pub blocker_probability: f64,
    pub blocker_impact_range: (f64, f64),
    pub confidence_levels: Vec<u8>,
    pub sampling_mode: SamplingMode,
    /// Items worked on concurrently; only used by [`SamplingMode::CycleTime`].
    pub work_in_progress: u32,
    pub max_periods: usize,
    pub min_completed_items: usize,
    pub done_statuses: Vec<String>,
    pub seed: Option<u64>,
    pub parallel: bool,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            iterations: DEFAULT_ITERATIONS,
            period_length_days: DEFAULT_PERIOD_LENGTH_DAYS,
            blocker_probability: 0.0,
            blocker_impact_range: (0.0, 0.0),
            confidence_levels: DEFAULT_CONFIDENCE_LEVELS.to_vec(),
            sampling_mode: SamplingMode::default(),
            work_in_progress: 1,
            max_periods: DEFAULT_MAX_PERIODS,
            min_completed_items: DEFAULT_MIN_COMPLETED_ITEMS,
            done_statuses: DEFAULT_DONE_STATUSES.iter().map(|s| s.to_string()).collect(),
            seed: None,
            parallel: false,
        }
    }
}

impl SimulationConfig {
    /// Rejects configurations that cannot produce a meaningful forecast.
    pub fn validate(&self) -> Result<(), ForecastError> {
        if self.iterations == 0 {
            return Err(invalid("iterations must be greater than zero"));
        }
        if self.period_length_days == 0 {
            return Err(invalid("period length must be at least one day"));
        }
        if !is_unit_interval(self.blocker_probability) {
            return Err(invalid(format!(
                "blocker probability {} is outside [0, 1]",
                self.blocker_probability
            )));
        }
        let (impact_min, impact_max) = self.blocker_impact_range;
        if !is_unit_interval(impact_min) || !is_unit_interval(impact_max) {
            return Err(invalid(format!(
                "blocker impact range [{impact_min}, {impact_max}] is outside [0, 1]"
            )));
        }
        if impact_min > impact_max {
            return Err(invalid(format!(
                "blocker impact minimum {impact_min} exceeds maximum {impact_max}"
            )));
        }
        if self.confidence_levels.is_empty() {
            return Err(invalid("at least one confidence level is required"));
        }
        if let Some(level) = self
            .confidence_levels
            .iter()
            .find(|level| **level == 0 || **level >= 100)
        {
            return Err(invalid(format!(
                "confidence level {level} is outside (0, 100)"
            )));
        }
        if self.work_in_progress == 0 {
            return Err(invalid("work in progress must be at least one"));
        }
        if self.max_periods == 0 {
            return Err(invalid("max periods must be greater than zero"));
        }
        if self.min_completed_items == 0 {
            return Err(invalid("minimum completed items must be at least one"));
        }
        Ok(())
    }
}

fn invalid(reason: impl Into<String>) -> ForecastError {
    ForecastError::InvalidConfiguration(reason.into())
}

fn is_unit_interval(value: f64) -> bool {
    (0.0..=1.0).contains(&value)
}

/// Contents of a settings YAML file.
#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct ForecastSettings {
    pub simulation: SimulationConfig,
    pub columns: CsvColumns,
}

impl ForecastSettings {
    pub fn from_yaml_file(path: &str) -> Result<Self, SimulationConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&contents)
    }

    pub fn from_yaml_str(input: &str) -> Result<Self, SimulationConfigError> {
        if input.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(input)?)
    }
}
