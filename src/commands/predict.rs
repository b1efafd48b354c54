//! Predict command handler.
//!
//! Implements the `predict` subcommand: one orchestrated run over the CSV
//! price history, printing the result record as JSON.

use crate::cli::{HistoryArgs, StateArgs};
use crate::logging::{CsvRecorder, MultiRecorder, TracingRecorder};
use crate::market_data::CsvPriceProvider;
use crate::orchestrator::Orchestrator;

use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

/// Run one prediction and print the result record.
///
/// # Errors
/// Returns error if arguments are invalid or the run fails. A failed run
/// prints nothing to stdout.
pub async fn run_predict(
    history: HistoryArgs,
    state: StateArgs,
    history_csv: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = history.to_predictor_config(&state)?;
    info!(
        symbol = %config.symbol,
        start = %config.start_date,
        state_file = %config.state_path.display(),
        "Starting prediction run"
    );

    let mut recorder = MultiRecorder::new(vec![Box::new(TracingRecorder::new())]);
    if let Some(path) = history_csv {
        recorder.add(Box::new(CsvRecorder::new(path)));
    }

    let provider = Arc::new(CsvPriceProvider::new(history.data_dir));
    let orchestrator = Orchestrator::new(config, provider).with_recorder(Arc::new(recorder));

    let outcome = orchestrator.run().await?;
    println!("{}", serde_json::to_string_pretty(&outcome)?);

    Ok(())
}
