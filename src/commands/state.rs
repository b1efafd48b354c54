//! State command handlers.

use crate::cli::StateArgs;
use crate::state::{LoadOutcome, StateStore, DEFAULT_PARAMS};

use serde_json::json;
use tracing::info;

/// Print the persisted state as JSON, noting when defaults would be used.
///
/// # Errors
/// Returns error if the state file exists but cannot be read.
pub fn run_state_show(state: StateArgs) -> Result<(), Box<dyn std::error::Error>> {
    let store = StateStore::new(state.state_file);
    let outcome = store.load()?;

    let body = match &outcome {
        LoadOutcome::Loaded(s) => json!({
            "path": store.path().display().to_string(),
            "source": "file",
            "params": s.params,
            "last_residual": s.last_residual,
        }),
        LoadOutcome::Defaulted { state, reason } => json!({
            "path": store.path().display().to_string(),
            "source": "default",
            "reason": reason.to_string(),
            "params": state.params,
            "last_residual": state.last_residual,
        }),
    };
    println!("{}", serde_json::to_string_pretty(&body)?);

    Ok(())
}

/// Overwrite the state file with the default parameters.
///
/// # Errors
/// Returns error if the atomic write fails.
pub fn run_state_reset(state: StateArgs) -> Result<(), Box<dyn std::error::Error>> {
    let store = StateStore::new(state.state_file);
    store.save(DEFAULT_PARAMS, 0.0)?;
    info!(path = %store.path().display(), params = %DEFAULT_PARAMS, "State reset to defaults");

    Ok(())
}
