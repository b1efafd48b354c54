//! CLI command handlers.
//!
//! This module contains the implementation for each CLI subcommand,
//! delegating to the prediction pipeline and the state store.

mod export;
mod predict;
mod state;

pub use export::run_export;
pub use predict::run_predict;
pub use state::{run_state_reset, run_state_show};
