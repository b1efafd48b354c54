//! Export command handler.
//!
//! Writes the derived dataset for the configured symbol and range.

use crate::cli::{ExportCliConfig, HistoryArgs};
use crate::market_data::{export_derived, CsvPriceProvider, PriceProvider, ProviderError};

use std::path::PathBuf;
use tracing::info;

/// Fetch history and write the derived CSV.
///
/// # Errors
/// Returns error if arguments are invalid, history cannot be loaded, or the
/// output cannot be written.
pub async fn run_export(
    history: HistoryArgs,
    output: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = ExportCliConfig::from_args(&history, output)?;
    let request = config
        .predictor
        .history_request(chrono::Utc::now().date_naive());

    let provider = CsvPriceProvider::new(&config.data_dir);
    let timeout = config.predictor.provider_timeout;
    let prices = tokio::time::timeout(timeout, provider.fetch_history(&request))
        .await
        .map_err(|_| ProviderError::Timeout(timeout))??;

    let rows = export_derived(&prices, &config.output)?;
    info!(rows, path = %config.output.display(), "Export complete");

    Ok(())
}
