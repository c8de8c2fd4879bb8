use chrono::NaiveDate;
use plotters::prelude::*;
use thiserror::Error;

use crate::services::percentiles::completion_date;
use crate::services::simulation::TrialResult;
use crate::services::simulation_types::ForecastResult;

#[derive(Error, Debug)]
pub enum CumulativePlotError {
    #[error("forecast has no trial results")]
    EmptyForecast,
    #[error("failed to render cumulative plot: {0}")]
    Plot(String),
}

/// Share of trials finished within `periods_required`.
#[derive(Debug, Clone, PartialEq)]
pub struct CumulativePoint {
    pub periods_required: TrialResult,
    pub completion_date: NaiveDate,
    pub probability: f64,
}

/// One point per distinct trial outcome, ascending. The last point always has
/// probability 1.
pub fn cumulative_probability(result: &ForecastResult) -> Vec<CumulativePoint> {
    let mut sorted = result.raw_trial_results.clone();
    sorted.sort_unstable();
    let total = sorted.len() as f64;

    let mut points: Vec<CumulativePoint> = Vec::new();
    for (idx, periods) in sorted.iter().enumerate() {
        let probability = (idx + 1) as f64 / total;
        match points.last_mut() {
            Some(last) if last.periods_required == *periods => last.probability = probability,
            _ => points.push(CumulativePoint {
                periods_required: *periods,
                completion_date: completion_date(result.reference_date, *periods, result.period_length_days).1,
                probability,
            }),
        }
    }
    points
}

pub fn write_cumulative_png(output_path: &str, result: &ForecastResult) -> Result<(), CumulativePlotError> {
    let points = cumulative_probability(result);
    let Some(last) = points.last() else {
        return Err(CumulativePlotError::EmptyForecast);
    };
    let max_x = axis_position(last.periods_required).saturating_add(1);

    let root = BitMapBackend::new(output_path, (900, 600)).into_drawing_area();
    root.fill(&WHITE)
        .map_err(|e| CumulativePlotError::Plot(e.to_string()))?;

    let mut chart = ChartBuilder::on(&root)
        .margin(20)
        .caption("Probability of Completion", ("sans-serif", 30))
        .x_label_area_size(55)
        .y_label_area_size(65)
        .build_cartesian_2d(0..max_x, 0.0..1.0)
        .map_err(|e| CumulativePlotError::Plot(e.to_string()))?;

    let reference_date = result.reference_date;
    let period_length_days = result.period_length_days;
    chart
        .configure_mesh()
        .x_desc("Completion date")
        .y_desc("Probability")
        .label_style(("sans-serif", 18))
        .axis_desc_style(("sans-serif", 22))
        .x_labels(10)
        .x_label_formatter(&|periods| {
            let periods = usize::try_from(*periods).unwrap_or(0);
            completion_date(reference_date, periods, period_length_days)
                .1
                .format("%Y-%m-%d")
                .to_string()
        })
        .y_label_formatter(&|probability| format!("{:.0}%", probability * 100.0))
        .draw()
        .map_err(|e| CumulativePlotError::Plot(e.to_string()))?;

    let line_color = RGBColor(30, 122, 204);
    chart
        .draw_series(LineSeries::new(
            points
                .iter()
                .map(|point| (axis_position(point.periods_required), point.probability)),
            line_color.stroke_width(2),
        ))
        .map_err(|e| CumulativePlotError::Plot(e.to_string()))?;

    root.present()
        .map_err(|e| CumulativePlotError::Plot(e.to_string()))?;
    Ok(())
}

/// Period counts beyond the `i32` chart axis are pinned to its end.
fn axis_position(periods: TrialResult) -> i32 {
    i32::try_from(periods).unwrap_or(i32::MAX)
}
