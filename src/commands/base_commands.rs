use chrono::{Local, NaiveDate};
use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;

use crate::services::simulation_config::SamplingMode;

#[derive(Parser)]
#[command(name = "backlog-forecast", author, version, about)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Forecast when the remaining backlog will be done
    Forecast(ForecastArgs),
    /// Extract cycle times and throughput from an issue export
    History {
        /// Issue export CSV
        #[arg(short, long)]
        input: String,
        /// Output YAML file
        #[arg(short, long)]
        output: String,
        /// Optional settings YAML (done statuses, column names)
        #[arg(short, long)]
        config: Option<String>,
        /// Throughput bucket length: days, or D, W, M
        #[arg(short, long, value_parser = parse_period)]
        period: Option<u32>,
        /// Also write the throughput buckets as a throughput YAML
        #[arg(short, long)]
        throughput_output: Option<String>,
    },
    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Args, Debug, Clone)]
pub struct ForecastArgs {
    /// Issue export CSV with created, resolved and status columns
    #[arg(short, long, required_unless_present = "throughput", conflicts_with = "throughput")]
    pub input: Option<String>,
    /// Throughput YAML to forecast from instead of an issue export
    #[arg(short = 'f', long)]
    pub throughput: Option<String>,
    /// Output file; JSON if the name ends in .json, YAML otherwise
    #[arg(short, long)]
    pub output: String,
    /// Optional settings YAML
    #[arg(short, long)]
    pub config: Option<String>,
    /// Remaining items; defaults to the rows of the export that are not done
    #[arg(short, long)]
    pub remaining: Option<usize>,
    /// Number of simulation iterations
    #[arg(short = 'n', long)]
    pub iterations: Option<usize>,
    /// Period length: days, or D, W, M
    #[arg(short, long, value_parser = parse_period)]
    pub period: Option<u32>,
    /// Velocity sampling mode
    #[arg(short, long, value_enum)]
    pub mode: Option<SamplingMode>,
    /// Seed for reproducible forecasts
    #[arg(long)]
    pub seed: Option<u64>,
    /// Run trials on all cores
    #[arg(long)]
    pub parallel: bool,
    /// Reference date the forecast counts from (YYYY-MM-DD)
    #[arg(short, long, value_parser = parse_date, default_value_t = today())]
    pub start_date: NaiveDate,
    /// Write PNG charts to files starting with this prefix
    #[arg(long)]
    pub charts: Option<String>,
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

fn parse_date(value: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| format!("invalid date '{value}' (expected YYYY-MM-DD)"))
}

/// Period length in days: a positive integer, or `D`, `W`, `M` for 1, 7 and
/// 30 days.
pub fn parse_period(value: &str) -> Result<u32, String> {
    match value.trim().to_ascii_uppercase().as_str() {
        "D" => Ok(1),
        "W" => Ok(7),
        "M" => Ok(30),
        other => match other.parse::<u32>() {
            Ok(days) if days > 0 => Ok(days),
            _ => Err(format!(
                "invalid period '{value}' (expected a number of days, or D, W, M)"
            )),
        },
    }
}
