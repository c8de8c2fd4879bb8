use crate::services::simulation_types::{ConfidenceInterval, ForecastOutput};

pub fn format_forecast_report(output: &ForecastOutput) -> String {
    let result = &output.result;

    let mut lines = Vec::new();
    lines.push("Forecast Report".to_string());
    lines.push(format!("Data source: {}", output.data_source));
    lines.push(format!("Reference date: {}", result.reference_date));
    lines.push(format!("Iterations: {}", result.iterations));
    lines.push(format!("Remaining items: {}", output.remaining_items));
    lines.push(format!("Period length: {} days", result.period_length_days));
    lines.push(format!("Sampling mode: {:?}", output.sampling_mode));
    lines.push(format!(
        "Periods: mean {:.2}, median {:.2}, std dev {:.2}",
        result.summary.mean, result.summary.median, result.summary.standard_deviation
    ));
    lines.push(String::new());
    lines.push("Confidence | Date | Periods | Days".to_string());
    lines.push("-----------|------|---------|-----".to_string());
    lines.extend(result.confidence_intervals.iter().map(format_interval_row));

    lines.join("\n")
}

fn format_interval_row(interval: &ConfidenceInterval) -> String {
    format!(
        "P{level} | {date} | {periods} | {days}",
        level = interval.confidence_level,
        date = interval.completion_date,
        periods = interval.periods_required,
        days = interval.days_remaining
    )
}
