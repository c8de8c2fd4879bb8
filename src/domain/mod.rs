pub mod history;
pub mod throughput;
