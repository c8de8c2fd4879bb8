use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;

use crate::services::forecast::ForecastError;
use crate::services::sampler::VelocitySampler;

/// Periods needed to clear the backlog in one trial.
pub type TrialResult = usize;

/// Consumes `remaining_count` items one simulated period at a time.
///
/// Fails with [`ForecastError::NonConvergentTrial`] once `max_periods` have
/// elapsed with work still left; `trial` only labels that error.
pub fn run_trial<S, R>(
    remaining_count: usize,
    sampler: &S,
    max_periods: usize,
    trial: usize,
    rng: &mut R,
) -> Result<TrialResult, ForecastError>
where
    S: VelocitySampler,
    R: Rng + ?Sized,
{
    let mut remaining = remaining_count as f64;
    let mut periods = 0;

    while remaining > 0.0 {
        if periods >= max_periods {
            return Err(ForecastError::NonConvergentTrial { trial, max_periods });
        }
        remaining -= sampler.draw_velocity(rng);
        periods += 1;
    }

    Ok(periods)
}

/// Runs `iterations` independent trials.
///
/// Every trial gets its own `StdRng`, seeded from `rng` up front, so the
/// results are the same whether trials run sequentially or on the rayon
/// pool. Results keep trial order.
pub fn run_simulation<S, R>(
    remaining_count: usize,
    iterations: usize,
    sampler: &S,
    max_periods: usize,
    parallel: bool,
    rng: &mut R,
) -> Result<Vec<TrialResult>, ForecastError>
where
    S: VelocitySampler + Sync,
    R: Rng + ?Sized,
{
    if iterations == 0 {
        return Err(ForecastError::InvalidConfiguration(
            "iterations must be greater than zero".to_string(),
        ));
    }
    if remaining_count == 0 {
        return Ok(vec![0; iterations]);
    }

    let seeds: Vec<u64> = (0..iterations).map(|_| rng.next_u64()).collect();
    let single = |(trial, seed): (usize, &u64)| {
        let mut trial_rng = StdRng::seed_from_u64(*seed);
        run_trial(remaining_count, sampler, max_periods, trial, &mut trial_rng)
    };

    let outcomes: Vec<Result<TrialResult, ForecastError>> = if parallel {
        seeds.par_iter().enumerate().map(single).collect()
    } else {
        seeds.iter().enumerate().map(single).collect()
    };

    // First failure by trial index, independent of scheduling.
    let results = outcomes.into_iter().collect::<Result<Vec<_>, _>>()?;
    tracing::debug!(iterations, remaining_count, parallel, "simulation finished");
    Ok(results)
}
