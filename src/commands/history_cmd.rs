use thiserror::Error;

use crate::services::forecast::ForecastError;
use crate::services::history_csv::{HistoryCsvError, load_history_from_csv_file};
use crate::services::history_statistics::extract_statistics;
use crate::services::simulation_config::{ForecastSettings, SimulationConfigError};
use crate::services::throughput_yaml::serialize_throughput_to_yaml;

#[derive(Error, Debug)]
pub enum HistoryCommandError {
    #[error(transparent)]
    Settings(#[from] SimulationConfigError),
    #[error(transparent)]
    History(#[from] HistoryCsvError),
    #[error(transparent)]
    Statistics(#[from] ForecastError),
    #[error("failed to serialize history: {0}")]
    Serialize(#[from] serde_yaml::Error),
    #[error("failed to write history output: {0}")]
    Write(#[from] std::io::Error),
}

pub fn history_command(
    input: &str,
    output: &str,
    config: Option<&str>,
    period: Option<u32>,
    throughput_output: Option<&str>,
) -> Result<(), HistoryCommandError> {
    let settings = match config {
        Some(path) => ForecastSettings::from_yaml_file(path)?,
        None => ForecastSettings::default(),
    };
    let mut simulation = settings.simulation;
    if let Some(period) = period {
        simulation.period_length_days = period;
    }

    let snapshot = load_history_from_csv_file(input, &settings.columns, &simulation.done_statuses)?;
    let statistics = extract_statistics(
        &snapshot.items,
        simulation.period_length_days,
        simulation.min_completed_items,
        &simulation.done_statuses,
    )?;

    std::fs::write(output, serde_yaml::to_string(&statistics)?)?;
    println!(
        "History of {} completed items ({} remaining) written to {output}",
        statistics.completed_items(),
        snapshot.remaining_count
    );

    if let Some(path) = throughput_output {
        let mut buffer = Vec::new();
        serialize_throughput_to_yaml(&mut buffer, &statistics.throughput)?;
        std::fs::write(path, buffer)?;
        println!("Throughput data written to {path}");
    }
    Ok(())
}
