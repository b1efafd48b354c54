//! Prediction Recording System
//!
//! Provides a pluggable `PredictionRecorder` trait so each run's result can be
//! kept as history without the predictor knowing where it goes.

use crate::strategy::Decision;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

/// Error type for recording operations
#[derive(Debug, Error)]
pub enum RecordError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Quote a CSV field when it holds a delimiter, quote or line break.
fn csv_field(value: &str) -> std::borrow::Cow<'_, str> {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\"")).into()
    } else {
        value.into()
    }
}

/// One completed prediction run.
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionRecord {
    /// When the run completed
    pub timestamp: DateTime<Utc>,
    /// Instrument the series belongs to (e.g., "META")
    pub symbol: String,
    /// Most recent close in the series
    pub latest_close: f64,
    /// Filtered estimate used as next close
    pub predicted_close: f64,
    pub decision: Decision,
    /// Final innovation of the run (the value persisted)
    pub residual: f64,
    /// Whether the run started from default parameters
    pub state_defaulted: bool,
}

impl PredictionRecord {
    /// Format as CSV line.
    pub fn to_csv_line(&self) -> String {
        format!(
            "{},{},{},{},{},{},{}",
            self.timestamp.to_rfc3339(),
            csv_field(&self.symbol),
            self.latest_close,
            self.predicted_close,
            self.decision,
            self.residual,
            self.state_defaulted,
        )
    }

    /// CSV header
    pub fn csv_header() -> &'static str {
        "timestamp,symbol,latest_close,predicted_close,action,residual,state_defaulted"
    }
}

/// Trait for recording predictions to various backends
#[async_trait]
pub trait PredictionRecorder: Send + Sync {
    /// Record a prediction.
    async fn record(&self, record: &PredictionRecord) -> Result<(), RecordError>;

    /// Flush any buffered records (optional, default no-op)
    async fn flush(&self) -> Result<(), RecordError> {
        Ok(())
    }
}

/// A recorder that fans out to multiple backends
pub struct MultiRecorder {
    recorders: Vec<Box<dyn PredictionRecorder>>,
}

impl MultiRecorder {
    /// Create a new multi-recorder with the given backends
    pub fn new(recorders: Vec<Box<dyn PredictionRecorder>>) -> Self {
        Self { recorders }
    }

    /// Add a recorder
    pub fn add(&mut self, recorder: Box<dyn PredictionRecorder>) {
        self.recorders.push(recorder);
    }
}

#[async_trait]
impl PredictionRecorder for MultiRecorder {
    async fn record(&self, record: &PredictionRecord) -> Result<(), RecordError> {
        let mut error_count = 0;
        let mut last_error = None;

        for recorder in &self.recorders {
            if let Err(e) = recorder.record(record).await {
                tracing::error!(error = %e, "Failed to record prediction to backend");
                last_error = Some(e);
                error_count += 1;
            }
        }

        // Only an error when every backend failed
        if error_count > 0 && error_count == self.recorders.len() {
            if let Some(e) = last_error {
                return Err(e);
            }
        }

        Ok(())
    }

    async fn flush(&self) -> Result<(), RecordError> {
        for recorder in &self.recorders {
            recorder.flush().await?;
        }
        Ok(())
    }
}
