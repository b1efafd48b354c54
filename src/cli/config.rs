//! CLI configuration bridging CLI arguments to domain types.
//!
//! Command handlers work with validated, typed configurations rather than
//! raw argument strings.

use super::{HistoryArgs, StateArgs};
use crate::orchestrator::PredictorConfig;
use crate::state::DEFAULT_PARAMS;
use chrono::NaiveDate;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur when converting CLI arguments.
#[derive(Debug, Error)]
pub enum CliConfigError {
    #[error("Invalid date '{0}'. Expected format: YYYY-MM-DD")]
    InvalidDate(String),

    #[error("Start date {start} must be before end date {end}")]
    InvertedRange { start: NaiveDate, end: NaiveDate },

    #[error("Symbol must not be empty")]
    EmptySymbol,

    #[error("Timeout must be at least one second")]
    ZeroTimeout,
}

fn parse_date(raw: &str) -> Result<NaiveDate, CliConfigError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| CliConfigError::InvalidDate(raw.to_string()))
}

impl HistoryArgs {
    /// Validate and build the predictor configuration.
    ///
    /// # Errors
    /// Returns `CliConfigError` for malformed dates, an inverted range, an
    /// empty symbol or a zero timeout.
    pub fn to_predictor_config(&self, state: &StateArgs) -> Result<PredictorConfig, CliConfigError> {
        let symbol = self.symbol.trim().to_uppercase();
        if symbol.is_empty() {
            return Err(CliConfigError::EmptySymbol);
        }
        if self.timeout_secs == 0 {
            return Err(CliConfigError::ZeroTimeout);
        }

        let start_date = parse_date(&self.start_date)?;
        let end_date = self.end_date.as_deref().map(parse_date).transpose()?;
        if let Some(end) = end_date {
            if start_date >= end {
                return Err(CliConfigError::InvertedRange {
                    start: start_date,
                    end,
                });
            }
        }

        Ok(PredictorConfig {
            state_path: state.state_file.clone(),
            default_params: DEFAULT_PARAMS,
            symbol,
            start_date,
            end_date,
            provider_timeout: Duration::from_secs(self.timeout_secs),
        })
    }
}

/// Configuration for the `export` command.
#[derive(Debug, Clone)]
pub struct ExportCliConfig {
    pub predictor: PredictorConfig,
    pub data_dir: PathBuf,
    pub output: PathBuf,
}

impl ExportCliConfig {
    /// # Errors
    /// Same validation as [`HistoryArgs::to_predictor_config`].
    pub fn from_args(history: &HistoryArgs, output: Option<PathBuf>) -> Result<Self, CliConfigError> {
        // Export never touches filter state; the path is unused.
        let state = StateArgs {
            state_file: PathBuf::from(crate::state::STATE_FILE),
        };
        let predictor = history.to_predictor_config(&state)?;
        let output =
            output.unwrap_or_else(|| PathBuf::from(format!("{}Data.csv", predictor.symbol)));
        Ok(Self {
            predictor,
            data_dir: history.data_dir.clone(),
            output,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args() -> HistoryArgs {
        HistoryArgs {
            symbol: "meta".to_string(),
            data_dir: PathBuf::from("data"),
            start_date: "2020-01-01".to_string(),
            end_date: None,
            timeout_secs: 30,
        }
    }

    fn state() -> StateArgs {
        StateArgs {
            state_file: PathBuf::from("kalman_params.json"),
        }
    }

    #[test]
    fn test_valid_args_convert() {
        let config = args().to_predictor_config(&state()).unwrap();
        assert_eq!(config.symbol, "META");
        assert_eq!(config.start_date, NaiveDate::from_ymd_opt(2020, 1, 1).unwrap());
        assert_eq!(config.provider_timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_invalid_inputs_rejected() {
        let bad_date = HistoryArgs {
            start_date: "01/01/2020".to_string(),
            ..args()
        };
        assert!(matches!(
            bad_date.to_predictor_config(&state()),
            Err(CliConfigError::InvalidDate(_))
        ));

        let inverted = HistoryArgs {
            end_date: Some("2019-12-31".to_string()),
            ..args()
        };
        assert!(matches!(
            inverted.to_predictor_config(&state()),
            Err(CliConfigError::InvertedRange { .. })
        ));

        let no_timeout = HistoryArgs {
            timeout_secs: 0,
            ..args()
        };
        assert!(matches!(
            no_timeout.to_predictor_config(&state()),
            Err(CliConfigError::ZeroTimeout)
        ));
    }

    #[test]
    fn test_export_default_output() {
        let config = ExportCliConfig::from_args(&args(), None).unwrap();
        assert_eq!(config.output, PathBuf::from("METAData.csv"));
    }
}
