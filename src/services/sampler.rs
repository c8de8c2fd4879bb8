use rand::Rng;
use rand::seq::SliceRandom;
use rand_distr::{Distribution, Normal};

use crate::services::forecast::ForecastError;
use crate::services::history_statistics::HistoricalStatistics;
use crate::services::percentiles::mean_and_std_dev;
use crate::services::simulation_config::{SamplingMode, SimulationConfig};

/// A lane finishes at most one item per day.
const MIN_CYCLE_TIME_DAYS: f64 = 1.0;

/// Draws the number of items completed in one simulated period.
pub trait VelocitySampler {
    fn draw_velocity<R: Rng + ?Sized>(&self, rng: &mut R) -> f64;
}

/// Random capacity loss applied on top of a drawn velocity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Blocker {
    pub probability: f64,
    pub impact_min: f64,
    pub impact_max: f64,
}

impl Blocker {
    pub fn none() -> Self {
        Self {
            probability: 0.0,
            impact_min: 0.0,
            impact_max: 0.0,
        }
    }

    pub fn apply<R: Rng + ?Sized>(&self, velocity: f64, rng: &mut R) -> f64 {
        if self.probability <= 0.0 || !rng.gen_bool(self.probability.min(1.0)) {
            return velocity;
        }
        let impact = if self.impact_max > self.impact_min {
            rng.gen_range(self.impact_min..=self.impact_max)
        } else {
            self.impact_min
        };
        velocity * (1.0 - impact)
    }
}

#[derive(Debug, Clone)]
pub enum Baseline {
    Bootstrap { throughput: Vec<f64> },
    Normal { distribution: Normal<f64> },
    CycleTime { cycle_times: Vec<f64>, lane_days: f64 },
}

/// Velocity sampler built from historical statistics.
#[derive(Debug, Clone)]
pub struct HistorySampler {
    pub baseline: Baseline,
    pub blocker: Blocker,
}

impl HistorySampler {
    pub fn new(baseline: Baseline, blocker: Blocker) -> Self {
        Self { baseline, blocker }
    }

    pub fn from_statistics(
        statistics: &HistoricalStatistics,
        config: &SimulationConfig,
    ) -> Result<Self, ForecastError> {
        let sample_is_empty = match config.sampling_mode {
            SamplingMode::CycleTime => statistics.cycle_times.is_empty(),
            SamplingMode::Bootstrap | SamplingMode::Normal => statistics.throughput.is_empty(),
        };
        if sample_is_empty {
            return Err(ForecastError::InsufficientHistory {
                found: 0,
                required: config.min_completed_items.max(1),
            });
        }

        let throughput: Vec<f64> = statistics
            .throughput
            .iter()
            .map(|t| t.completed_issues as f64)
            .collect();

        let baseline = match config.sampling_mode {
            SamplingMode::Bootstrap => Baseline::Bootstrap { throughput },
            SamplingMode::Normal => {
                let (mean, std_dev) = mean_and_std_dev(&throughput);
                let distribution = Normal::new(mean, std_dev).map_err(|e| {
                    ForecastError::InvalidConfiguration(format!(
                        "cannot fit normal distribution to throughput: {e}"
                    ))
                })?;
                Baseline::Normal { distribution }
            }
            SamplingMode::CycleTime => Baseline::CycleTime {
                cycle_times: statistics.cycle_times.clone(),
                lane_days: f64::from(config.work_in_progress) * f64::from(config.period_length_days),
            },
        };

        let (impact_min, impact_max) = config.blocker_impact_range;
        let blocker = Blocker {
            probability: config.blocker_probability,
            impact_min,
            impact_max,
        };

        Ok(Self::new(baseline, blocker))
    }

    fn draw_baseline<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        match &self.baseline {
            Baseline::Bootstrap { throughput } => throughput.choose(rng).copied().unwrap_or(0.0),
            Baseline::Normal { distribution } => distribution.sample(rng),
            // Little's law: throughput = work in progress / cycle time.
            Baseline::CycleTime {
                cycle_times,
                lane_days,
            } => cycle_times
                .choose(rng)
                .map(|cycle_time| lane_days / cycle_time.max(MIN_CYCLE_TIME_DAYS))
                .unwrap_or(0.0),
        }
    }
}

impl VelocitySampler for HistorySampler {
    fn draw_velocity<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        let velocity = self.draw_baseline(rng).max(0.0);
        self.blocker.apply(velocity, rng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn bootstrap(values: &[f64]) -> HistorySampler {
        HistorySampler::new(
            Baseline::Bootstrap {
                throughput: values.to_vec(),
            },
            Blocker::none(),
        )
    }

    #[test]
    fn bootstrap_only_draws_observed_values() {
        let sampler = bootstrap(&[0.0, 2.0, 5.0]);
        let mut rng = StdRng::seed_from_u64(1);
        let mut seen_zero = false;
        for _ in 0..500 {
            let value = sampler.draw_velocity(&mut rng);
            assert!([0.0, 2.0, 5.0].contains(&value));
            seen_zero |= value == 0.0;
        }
        assert!(seen_zero, "zero buckets must be drawable");
    }

    #[test]
    fn normal_draws_are_clamped_at_zero() {
        let sampler = HistorySampler::new(
            Baseline::Normal {
                distribution: Normal::new(-3.0, 0.0).unwrap(),
            },
            Blocker::none(),
        );
        let mut rng = StdRng::seed_from_u64(2);
        assert_eq!(sampler.draw_velocity(&mut rng), 0.0);
    }

    #[test]
    fn normal_draws_scatter_around_the_mean() {
        let sampler = HistorySampler::new(
            Baseline::Normal {
                distribution: Normal::new(10.0, 2.0).unwrap(),
            },
            Blocker::none(),
        );
        let mut rng = StdRng::seed_from_u64(3);
        let draws: Vec<f64> = (0..2000).map(|_| sampler.draw_velocity(&mut rng)).collect();
        let (mean, std_dev) = mean_and_std_dev(&draws);
        assert!((mean - 10.0).abs() < 0.3, "mean {mean}");
        assert!((std_dev - 2.0).abs() < 0.3, "std dev {std_dev}");
    }

    #[test]
    fn cycle_time_draws_follow_littles_law() {
        let sampler = HistorySampler::new(
            Baseline::CycleTime {
                cycle_times: vec![2.0],
                lane_days: 7.0,
            },
            Blocker::none(),
        );
        let mut rng = StdRng::seed_from_u64(4);
        assert_eq!(sampler.draw_velocity(&mut rng), 3.5);
    }

    #[test]
    fn same_day_cycle_times_count_as_one_day() {
        let sampler = HistorySampler::new(
            Baseline::CycleTime {
                cycle_times: vec![0.0],
                lane_days: 14.0,
            },
            Blocker::none(),
        );
        let mut rng = StdRng::seed_from_u64(5);
        assert_eq!(sampler.draw_velocity(&mut rng), 14.0);
    }

    #[test]
    fn certain_blocker_with_fixed_impact_scales_velocity() {
        let blocker = Blocker {
            probability: 1.0,
            impact_min: 0.25,
            impact_max: 0.25,
        };
        let mut rng = StdRng::seed_from_u64(6);
        assert_eq!(blocker.apply(4.0, &mut rng), 3.0);
    }

    #[test]
    fn full_blocker_stops_all_work() {
        let mut sampler = bootstrap(&[3.0, 4.0]);
        sampler.blocker = Blocker {
            probability: 1.0,
            impact_min: 1.0,
            impact_max: 1.0,
        };
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..50 {
            assert_eq!(sampler.draw_velocity(&mut rng), 0.0);
        }
    }

    #[test]
    fn blocker_impact_stays_within_range() {
        let blocker = Blocker {
            probability: 1.0,
            impact_min: 0.2,
            impact_max: 0.6,
        };
        let mut rng = StdRng::seed_from_u64(8);
        for _ in 0..500 {
            let value = blocker.apply(10.0, &mut rng);
            assert!((4.0 - 1e-9..=8.0 + 1e-9).contains(&value), "value {value}");
        }
    }

    #[test]
    fn disabled_blocker_passes_velocity_through() {
        let mut rng = StdRng::seed_from_u64(9);
        assert_eq!(Blocker::none().apply(5.0, &mut rng), 5.0);
    }

    #[test]
    fn same_seed_gives_same_draws() {
        let mut sampler = bootstrap(&[1.0, 2.0, 3.0, 4.0]);
        sampler.blocker = Blocker {
            probability: 0.3,
            impact_min: 0.1,
            impact_max: 0.9,
        };
        let mut first = StdRng::seed_from_u64(10);
        let mut second = StdRng::seed_from_u64(10);
        let a: Vec<f64> = (0..100).map(|_| sampler.draw_velocity(&mut first)).collect();
        let b: Vec<f64> = (0..100).map(|_| sampler.draw_velocity(&mut second)).collect();
        assert_eq!(a, b);
    }
}
