pub mod commands;
pub mod config;
pub mod differ;
pub mod error;
pub mod flatten;
pub mod model;
pub mod orchestrator;
pub mod owner;
pub mod report;
pub mod snapshot;
pub mod store;
pub mod telemetry;
#[cfg(test)]
pub mod test_utils;
