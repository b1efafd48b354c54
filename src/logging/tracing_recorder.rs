//! Tracing-based Prediction Recorder
//!
//! Emits one structured log event per prediction. Zero additional
//! dependencies; any tracing subscriber (including JSON output) picks it up.

use super::recorder::{PredictionRecord, PredictionRecorder, RecordError};
use async_trait::async_trait;
use tracing::info;

/// Recorder that emits structured tracing logs
pub struct TracingRecorder;

impl TracingRecorder {
    /// Create a new tracing recorder
    pub fn new() -> Self {
        Self
    }
}

impl Default for TracingRecorder {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PredictionRecorder for TracingRecorder {
    async fn record(&self, record: &PredictionRecord) -> Result<(), RecordError> {
        info!(
            target: "predictions",
            timestamp = %record.timestamp.to_rfc3339(),
            symbol = %record.symbol,
            latest_close = record.latest_close,
            predicted_close = record.predicted_close,
            action = %record.decision,
            residual = record.residual,
            state_defaulted = record.state_defaulted,
            "Prediction recorded"
        );
        Ok(())
    }
}
