//! Predictor configuration.
//!
//! Everything the run needs is passed in explicitly; nothing is read from
//! process-global state inside the library.

use crate::market_data::HistoryRequest;
use crate::state::{DEFAULT_PARAMS, STATE_FILE};
use crate::types::FilterParameters;
use chrono::NaiveDate;
use std::path::PathBuf;
use std::time::Duration;

/// Default instrument
pub const DEFAULT_SYMBOL: &str = "META";

/// Default provider timeout in seconds
pub const DEFAULT_PROVIDER_TIMEOUT_SECS: u64 = 30;

/// First day of history requested by default.
pub fn default_start_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2020, 1, 1).unwrap_or(NaiveDate::MIN)
}

/// Configuration for one prediction run.
#[derive(Debug, Clone, PartialEq)]
pub struct PredictorConfig {
    /// Location of the persisted filter state (opaque key)
    pub state_path: PathBuf,
    /// Parameters used when no valid state exists
    pub default_params: FilterParameters,
    /// Instrument to fetch (e.g., "META")
    pub symbol: String,
    /// First day of history (inclusive)
    pub start_date: NaiveDate,
    /// End of history (exclusive); `None` means today
    pub end_date: Option<NaiveDate>,
    /// Upper bound on the price provider call
    pub provider_timeout: Duration,
}

impl Default for PredictorConfig {
    fn default() -> Self {
        Self {
            state_path: PathBuf::from(STATE_FILE),
            default_params: DEFAULT_PARAMS,
            symbol: DEFAULT_SYMBOL.to_string(),
            start_date: default_start_date(),
            end_date: None,
            provider_timeout: Duration::from_secs(DEFAULT_PROVIDER_TIMEOUT_SECS),
        }
    }
}

impl PredictorConfig {
    /// Build the provider request, resolving an open end date to `today`.
    pub fn history_request(&self, today: NaiveDate) -> HistoryRequest {
        HistoryRequest {
            symbol: self.symbol.clone(),
            start: self.start_date,
            end: self.end_date.unwrap_or(today),
        }
    }
}
