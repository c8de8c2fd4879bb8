use chrono::NaiveDate;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use thiserror::Error;

use crate::domain::history::HistoricalItem;
use crate::services::history_statistics::{HistoricalStatistics, extract_statistics};
use crate::services::percentiles::reduce;
use crate::services::sampler::HistorySampler;
use crate::services::simulation::run_simulation;
use crate::services::simulation_config::SimulationConfig;
use crate::services::simulation_types::ForecastOutput;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ForecastError {
    #[error("insufficient history: {found} completed items, at least {required} required")]
    InsufficientHistory { found: usize, required: usize },
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
    #[error("trial {trial} did not finish the backlog within {max_periods} periods")]
    NonConvergentTrial { trial: usize, max_periods: usize },
}

/// Forecasts completion of `remaining_count` items from completed history.
///
/// The configuration is validated before anything else; history extraction,
/// simulation and reduction follow. All randomness comes from `rng`.
pub fn forecast<R: Rng + ?Sized>(
    items: &[HistoricalItem],
    remaining_count: usize,
    config: &SimulationConfig,
    reference_date: NaiveDate,
    rng: &mut R,
) -> Result<ForecastOutput, ForecastError> {
    config.validate()?;

    let history = extract_statistics(
        items,
        config.period_length_days,
        config.min_completed_items,
        &config.done_statuses,
    )?;
    forecast_from_statistics(history, remaining_count, config, reference_date, rng)
}

/// Forecasts from already extracted statistics, e.g. a throughput file.
pub fn forecast_from_statistics<R: Rng + ?Sized>(
    history: HistoricalStatistics,
    remaining_count: usize,
    config: &SimulationConfig,
    reference_date: NaiveDate,
    rng: &mut R,
) -> Result<ForecastOutput, ForecastError> {
    config.validate()?;
    if history.completed_items() < config.min_completed_items {
        return Err(ForecastError::InsufficientHistory {
            found: history.completed_items(),
            required: config.min_completed_items,
        });
    }
    let sampler = HistorySampler::from_statistics(&history, config)?;

    tracing::info!(
        completed = history.completed_items(),
        remaining_count,
        iterations = config.iterations,
        mode = ?config.sampling_mode,
        "running forecast"
    );

    let trial_results = run_simulation(
        remaining_count,
        config.iterations,
        &sampler,
        config.max_periods,
        config.parallel,
        rng,
    )?;
    let result = reduce(
        trial_results,
        &config.confidence_levels,
        config.period_length_days,
        reference_date,
    );

    tracing::info!(
        mean = result.summary.mean,
        median = result.summary.median,
        std_dev = result.summary.standard_deviation,
        "forecast finished"
    );

    Ok(ForecastOutput {
        data_source: String::new(),
        remaining_items: remaining_count,
        sampling_mode: config.sampling_mode,
        result,
        history,
    })
}

/// Random source for a run: seeded from `config.seed`, or from OS entropy
/// when no seed is configured.
pub fn seeded_rng(config: &SimulationConfig) -> StdRng {
    match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

/// [`forecast`] with the random source from [`seeded_rng`].
pub fn forecast_seeded(
    items: &[HistoricalItem],
    remaining_count: usize,
    config: &SimulationConfig,
    reference_date: NaiveDate,
) -> Result<ForecastOutput, ForecastError> {
    forecast(items, remaining_count, config, reference_date, &mut seeded_rng(config))
}
