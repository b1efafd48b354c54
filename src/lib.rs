pub mod cli;
pub mod commands;
pub mod logging;
pub mod market_data;
pub mod math;
pub mod observability;
pub mod orchestrator;
pub mod state;
pub mod strategy;
pub mod types;
