//! Prediction Recording Module
//!
//! Provides backends for recording completed predictions:
//! - `PredictionRecorder` trait - Pluggable recorder interface
//! - `CsvRecorder` - Append-only CSV prediction history
//! - `TracingRecorder` - Structured log line per prediction

pub mod csv_recorder;
pub mod recorder;
pub mod tracing_recorder;

pub use csv_recorder::CsvRecorder;
pub use recorder::{MultiRecorder, PredictionRecord, PredictionRecorder, RecordError};
pub use tracing_recorder::TracingRecorder;
