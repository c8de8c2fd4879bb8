use std::path::Path;

use thiserror::Error;

use crate::commands::base_commands::ForecastArgs;
use crate::commands::report_format::format_forecast_report;
use crate::services::cumulative_plot::{CumulativePlotError, write_cumulative_png};
use crate::services::forecast::{ForecastError, forecast_from_statistics, seeded_rng};
use crate::services::histogram::{HistogramError, write_histogram_png};
use crate::services::history_csv::{CsvColumns, HistoryCsvError, load_history_from_csv_file};
use crate::services::history_statistics::extract_statistics;
use crate::services::simulation_config::{ForecastSettings, SimulationConfig, SimulationConfigError};
use crate::services::simulation_types::ForecastOutput;
use crate::services::throughput_plot::{ThroughputPlotError, write_throughput_png};
use crate::services::throughput_yaml::{ThroughputYamlError, load_statistics_from_throughput_yaml_file};

#[derive(Error, Debug)]
pub enum ForecastCommandError {
    #[error(transparent)]
    Settings(#[from] SimulationConfigError),
    #[error(transparent)]
    History(#[from] HistoryCsvError),
    #[error(transparent)]
    Throughput(#[from] ThroughputYamlError),
    #[error(transparent)]
    Forecast(#[from] ForecastError),
    #[error("either an issue export or a throughput file is required")]
    MissingDataSource,
    #[error("--remaining is required when forecasting from a throughput file")]
    MissingRemaining,
    #[error("failed to serialize forecast: {0}")]
    Serialize(String),
    #[error("failed to write forecast output: {0}")]
    Write(#[from] std::io::Error),
    #[error(transparent)]
    Histogram(#[from] HistogramError),
    #[error(transparent)]
    ThroughputPlot(#[from] ThroughputPlotError),
    #[error(transparent)]
    CumulativePlot(#[from] CumulativePlotError),
}

pub fn forecast_command(args: ForecastArgs) -> Result<(), ForecastCommandError> {
    let settings = match &args.config {
        Some(path) => ForecastSettings::from_yaml_file(path)?,
        None => ForecastSettings::default(),
    };
    let mut config = settings.simulation;
    apply_overrides(&args, &mut config);
    config.validate()?;

    let output = run_forecast(&args, &settings.columns, &config)?;

    let serialized = if is_json_path(&args.output) {
        serde_json::to_string_pretty(&output).map_err(|e| ForecastCommandError::Serialize(e.to_string()))?
    } else {
        serde_yaml::to_string(&output).map_err(|e| ForecastCommandError::Serialize(e.to_string()))?
    };
    std::fs::write(&args.output, serialized)?;

    println!("{}", format_forecast_report(&output));
    println!();
    println!(
        "Forecast for {} items written to {}",
        output.remaining_items, args.output
    );

    if let Some(prefix) = &args.charts {
        for path in write_charts(prefix, &output)? {
            println!("Chart written to {path}");
        }
    }
    Ok(())
}

fn run_forecast(
    args: &ForecastArgs,
    columns: &CsvColumns,
    config: &SimulationConfig,
) -> Result<ForecastOutput, ForecastCommandError> {
    let (data_source, history, remaining_count) = match (&args.input, &args.throughput) {
        (Some(input), _) => {
            let snapshot = load_history_from_csv_file(input, columns, &config.done_statuses)?;
            let history = extract_statistics(
                &snapshot.items,
                config.period_length_days,
                config.min_completed_items,
                &config.done_statuses,
            )?;
            let remaining = args.remaining.unwrap_or(snapshot.remaining_count);
            (input, history, remaining)
        }
        (None, Some(throughput)) => {
            let history = load_statistics_from_throughput_yaml_file(throughput, config.period_length_days)?;
            let remaining = args.remaining.ok_or(ForecastCommandError::MissingRemaining)?;
            (throughput, history, remaining)
        }
        (None, None) => return Err(ForecastCommandError::MissingDataSource),
    };

    let mut output = forecast_from_statistics(
        history,
        remaining_count,
        config,
        args.start_date,
        &mut seeded_rng(config),
    )?;
    output.data_source = file_name(data_source);
    Ok(output)
}

/// Command line flags take precedence over the settings file.
fn apply_overrides(args: &ForecastArgs, config: &mut SimulationConfig) {
    if let Some(iterations) = args.iterations {
        config.iterations = iterations;
    }
    if let Some(period) = args.period {
        config.period_length_days = period;
    }
    if let Some(mode) = args.mode {
        config.sampling_mode = mode;
    }
    if let Some(seed) = args.seed {
        config.seed = Some(seed);
    }
    if args.parallel {
        config.parallel = true;
    }
}

fn write_charts(prefix: &str, output: &ForecastOutput) -> Result<Vec<String>, ForecastCommandError> {
    let mut written = Vec::new();

    let trials: Vec<f64> = output
        .result
        .raw_trial_results
        .iter()
        .map(|periods| *periods as f64)
        .collect();
    let forecast_path = format!("{prefix}.forecast.png");
    write_histogram_png(&forecast_path, &trials, "Forecast Distribution", "Periods required")?;
    written.push(forecast_path);

    if !output.history.cycle_times.is_empty() {
        let cycle_time_path = format!("{prefix}.cycle-time.png");
        write_histogram_png(
            &cycle_time_path,
            &output.history.cycle_times,
            "Cycle Time Distribution",
            "Cycle time (days)",
        )?;
        written.push(cycle_time_path);
    }

    if !output.history.throughput.is_empty() {
        let throughput_path = format!("{prefix}.throughput.png");
        write_throughput_png(&throughput_path, &output.history.throughput)?;
        written.push(throughput_path);
    }

    let cumulative_path = format!("{prefix}.cumulative.png");
    write_cumulative_png(&cumulative_path, &output.result)?;
    written.push(cumulative_path);

    tracing::debug!(charts = written.len(), prefix, "rendered charts");
    Ok(written)
}

fn is_json_path(path: &str) -> bool {
    Path::new(path)
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}

fn file_name(path: &str) -> String {
    Path::new(path)
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string())
}
