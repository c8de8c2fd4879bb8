use std::process::ExitCode;

use backlog_forecast::commands::base_commands::{CliArgs, Commands};
use backlog_forecast::commands::forecast_cmd::forecast_command;
use backlog_forecast::commands::history_cmd::history_command;
use backlog_forecast::logging::init_tracing;
use clap::{CommandFactory, Parser};

fn main() -> ExitCode {
    init_tracing();
    let args = CliArgs::parse();
    match args.command {
        Commands::Forecast(forecast) => {
            if let Err(e) = forecast_command(forecast) {
                eprintln!("Failed to forecast: {e}");
                return ExitCode::FAILURE;
            }
        }
        Commands::History {
            input,
            output,
            config,
            period,
            throughput_output,
        } => {
            if let Err(e) = history_command(
                &input,
                &output,
                config.as_deref(),
                period,
                throughput_output.as_deref(),
            ) {
                eprintln!("Failed to extract history: {e}");
                return ExitCode::FAILURE;
            }
        }
        Commands::Completions { shell } => {
            let mut command = CliArgs::command();
            let name = command.get_name().to_string();
            clap_complete::generate(shell, &mut command, name, &mut std::io::stdout());
        }
    }
    ExitCode::SUCCESS
}
