pub mod cumulative_plot;
pub mod forecast;
pub mod histogram;
pub mod history_csv;
pub mod history_statistics;
pub mod percentiles;
pub mod sampler;
pub mod simulation;
pub mod simulation_config;
pub mod simulation_types;
pub mod throughput_plot;
pub mod throughput_yaml;
