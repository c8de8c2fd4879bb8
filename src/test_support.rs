use std::sync::atomic::{AtomicUsize, Ordering};

use chrono::{NaiveDate, NaiveDateTime};
use rand::Rng;

use crate::domain::history::HistoricalItem;
use crate::services::sampler::VelocitySampler;

// A sampler that always returns the same velocity and counts its draws.
pub struct ConstantSampler {
    pub velocity: f64,
    pub draws: AtomicUsize,
}

impl ConstantSampler {
    pub fn new(velocity: f64) -> Self {
        Self {
            velocity,
            draws: AtomicUsize::new(0),
        }
    }

    pub fn draw_count(&self) -> usize {
        self.draws.load(Ordering::SeqCst)
    }
}

impl VelocitySampler for ConstantSampler {
    fn draw_velocity<R: Rng + ?Sized>(&self, _rng: &mut R) -> f64 {
        self.draws.fetch_add(1, Ordering::SeqCst);
        self.velocity
    }
}

pub fn on_date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

pub fn at(year: i32, month: u32, day: u32, hour: u32) -> NaiveDateTime {
    on_date(year, month, day).and_hms_opt(hour, 0, 0).unwrap()
}

pub fn done_item(created_at: NaiveDateTime, resolved_at: NaiveDateTime) -> HistoricalItem {
    HistoricalItem::new(created_at, Some(resolved_at), "Done")
}

/// Completed items that produce the given per-period throughput counts,
/// each taking `cycle_days` from creation to resolution.
pub fn history_with_throughput(
    start: NaiveDate,
    period_length_days: u32,
    counts: &[usize],
    cycle_days: i64,
) -> Vec<HistoricalItem> {
    let mut items = Vec::new();
    for (bucket, count) in counts.iter().enumerate() {
        let resolved = start + chrono::Duration::days(bucket as i64 * i64::from(period_length_days));
        let resolved_at = resolved.and_hms_opt(12, 0, 0).unwrap();
        for _ in 0..*count {
            items.push(done_item(
                resolved_at - chrono::Duration::days(cycle_days),
                resolved_at,
            ));
        }
    }
    items
}
