//! CSV Prediction Recorder
//!
//! Appends one line per prediction to a CSV file, writing the header once.

use super::recorder::{PredictionRecord, PredictionRecorder, RecordError};
use async_trait::async_trait;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

/// CSV file recorder
///
/// Uses `spawn_blocking` to avoid blocking the async runtime during file I/O.
pub struct CsvRecorder {
    file_path: Arc<PathBuf>,
    /// Mutex to serialize writes and track header state
    state: Arc<Mutex<CsvState>>,
}

struct CsvState {
    header_written: bool,
}

impl CsvRecorder {
    /// Create a new CSV recorder
    pub fn new(file_path: PathBuf) -> Self {
        Self {
            file_path: Arc::new(file_path),
            state: Arc::new(Mutex::new(CsvState {
                header_written: false,
            })),
        }
    }
}

#[async_trait]
impl PredictionRecorder for CsvRecorder {
    async fn record(&self, record: &PredictionRecord) -> Result<(), RecordError> {
        let file_path = Arc::clone(&self.file_path);
        let state = Arc::clone(&self.state);
        let csv_line = record.to_csv_line();

        tokio::task::spawn_blocking(move || {
            // Handle mutex poisoning gracefully
            let mut guard = state.lock().unwrap_or_else(|e| e.into_inner());

            let mut file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&*file_path)?;

            if !guard.header_written {
                let needs_header = file.metadata().map(|m| m.len() == 0).unwrap_or(true);
                if needs_header {
                    writeln!(file, "{}", PredictionRecord::csv_header())?;
                }
                guard.header_written = true;
            }

            writeln!(file, "{}", csv_line)?;

            Ok::<(), RecordError>(())
        })
        .await
        .map_err(|e| RecordError::Io(std::io::Error::other(e)))??;

        Ok(())
    }

    /// Sync appended lines to disk. Nothing to do before the first record.
    async fn flush(&self) -> Result<(), RecordError> {
        let file_path = Arc::clone(&self.file_path);
        let state = Arc::clone(&self.state);

        tokio::task::spawn_blocking(move || {
            let _guard = state.lock().unwrap_or_else(|e| e.into_inner());
            match OpenOptions::new().append(true).open(&*file_path) {
                Ok(file) => file.sync_all()?,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
            Ok::<(), RecordError>(())
        })
        .await
        .map_err(|e| RecordError::Io(std::io::Error::other(e)))??;

        Ok(())
    }
}
