//! Prediction pipeline.
//!
//! One run: fetch bars → derive the close series → load checkpoint → filter →
//! save checkpoint → decide → return the result record. Each step is order dependent and any
//! failure aborts the run without a partial result.
//!
//! # Concurrency
//! Runs are meant to be serialized per state file. The store does no locking,
//! so two overlapping runs may both read the same checkpoint and the later
//! save wins.

pub mod config;
pub mod error;

pub use config::PredictorConfig;
pub use error::PredictionError;

use crate::logging::{PredictionRecord, PredictionRecorder};
use crate::market_data::{derive, PriceProvider, ProviderError};
use crate::math::{FilterError, KalmanFilter};
use crate::state::StateStore;
use crate::strategy::{decide, Decision};
use crate::types::FilterParameters;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

/// Externally observable result of one run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictionOutcome {
    #[serde(rename = "Latest Close Price")]
    pub latest_observed_value: f64,
    #[serde(rename = "Predicted Next Close Price")]
    pub predicted_value: f64,
    #[serde(rename = "Action")]
    pub decision: Decision,
}

/// Outcome plus the checkpoint bookkeeping of the run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    pub outcome: PredictionOutcome,
    /// Parameters used (and persisted unchanged)
    pub params: FilterParameters,
    /// Residual read from the checkpoint at the start of the run
    pub previous_residual: f64,
    /// Residual persisted at the end of the run
    pub residual: f64,
    /// Whether the run started from defaults
    pub state_defaulted: bool,
    /// Number of observations filtered
    pub observations: usize,
}

/// Sequences provider, state store, filter and decision for one run.
pub struct Orchestrator {
    config: PredictorConfig,
    provider: Arc<dyn PriceProvider>,
    store: StateStore,
    recorder: Option<Arc<dyn PredictionRecorder>>,
}

impl Orchestrator {
    pub fn new(config: PredictorConfig, provider: Arc<dyn PriceProvider>) -> Self {
        let store =
            StateStore::new(config.state_path.clone()).with_default_params(config.default_params);
        Self {
            config,
            provider,
            store,
            recorder: None,
        }
    }

    /// Attach a recorder that receives every successful prediction.
    #[must_use]
    pub fn with_recorder(mut self, recorder: Arc<dyn PredictionRecorder>) -> Self {
        self.recorder = Some(recorder);
        self
    }

    pub fn store(&self) -> &StateStore {
        &self.store
    }

    /// Run once and return the result record.
    ///
    /// # Errors
    /// See [`PredictionError`]. No partial record is ever returned.
    pub async fn run(&self) -> Result<PredictionOutcome, PredictionError> {
        self.run_detailed().await.map(|report| report.outcome)
    }

    /// Run once and return the result record with checkpoint details.
    pub async fn run_detailed(&self) -> Result<RunReport, PredictionError> {
        let request = self.config.history_request(Utc::now().date_naive());

        let history = tokio::time::timeout(
            self.config.provider_timeout,
            self.provider.fetch_history(&request),
        )
        .await
        .map_err(|_| ProviderError::Timeout(self.config.provider_timeout))??;
        info!(symbol = %request.symbol, bars = history.len(), "Price data fetched.");

        // Same frame as the exported dataset: first bar and rows without a
        // log return are not observations.
        let closes: Vec<f64> = derive(&history).iter().map(|row| row.close).collect();
        let latest_observed_value = closes.last().copied().ok_or(FilterError::EmptySeries)?;

        let loaded = self.store.load()?;
        let state = loaded.state();

        let trace = KalmanFilter::new(state.params).run(&closes)?;
        let predicted_value = trace.final_state();
        let residual = trace.final_residual();
        info!(
            steps = trace.steps(),
            previous_residual = state.last_residual,
            residual,
            "Kalman filter applied."
        );

        self.store.save(state.params, residual)?;

        let decision = decide(predicted_value, latest_observed_value);
        info!(
            latest_close = latest_observed_value,
            predicted_close = predicted_value,
            action = %decision,
            "Recommended action for next session."
        );

        let report = RunReport {
            outcome: PredictionOutcome {
                latest_observed_value,
                predicted_value,
                decision,
            },
            params: state.params,
            previous_residual: state.last_residual,
            residual,
            state_defaulted: loaded.is_defaulted(),
            observations: closes.len(),
        };

        self.record(&report).await;
        Ok(report)
    }

    /// Best-effort: the run has already succeeded at this point.
    async fn record(&self, report: &RunReport) {
        let Some(recorder) = &self.recorder else {
            return;
        };
        let record = PredictionRecord {
            timestamp: Utc::now(),
            symbol: self.config.symbol.clone(),
            latest_close: report.outcome.latest_observed_value,
            predicted_close: report.outcome.predicted_value,
            decision: report.outcome.decision,
            residual: report.residual,
            state_defaulted: report.state_defaulted,
        };
        if let Err(e) = recorder.record(&record).await {
            warn!(error = %e, "Failed to record prediction");
        }
        if let Err(e) = recorder.flush().await {
            warn!(error = %e, "Failed to flush prediction recorder");
        }
    }
}
