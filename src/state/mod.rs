//! Filter checkpoint persistence with atomic file writes.
//!
//! Keeps the fixed model parameters and the most recent prediction error
//! between runs so successive invocations continue one recursion history.
//!
//! # Safety
//! - Uses atomic file writes (write to a uniquely named temp file, fsync,
//!   rename) for durability; a failed save removes its temp file
//! - Missing or unparsable state degrades to [`DEFAULT_PARAMS`]; any other
//!   I/O failure is surfaced, never silently defaulted
//! - No locking: overlapping runs against the same path can lose updates, so
//!   callers must serialize invocations per state file

use crate::types::FilterParameters;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::{info, warn};

/// Default state file path
pub const STATE_FILE: &str = "kalman_params.json";

/// Cold-start prior used whenever no valid checkpoint exists.
pub const DEFAULT_PARAMS: FilterParameters = FilterParameters::new(0.3, 0.9, 0.8, 1.1);

/// Errors from the durable state resource.
#[derive(Debug, Error)]
pub enum StateError {
    #[error("State I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("State serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Refusing to persist non-finite residual: {0}")]
    NonFiniteResidual(f64),

    #[error("Refusing to persist non-finite parameters: {0}")]
    NonFiniteParams(FilterParameters),
}

/// The only durable entity: fixed parameters plus the last innovation.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct PersistedFilterState {
    pub params: FilterParameters,
    pub last_residual: f64,
}

impl Default for PersistedFilterState {
    fn default() -> Self {
        Self {
            params: DEFAULT_PARAMS,
            last_residual: 0.0,
        }
    }
}

/// Why a load fell back to defaults.
#[derive(Debug, Clone, PartialEq)]
pub enum DefaultReason {
    /// No state file at the configured path
    Missing,
    /// File exists but does not hold a valid state record
    Corrupt(String),
}

impl std::fmt::Display for DefaultReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DefaultReason::Missing => write!(f, "no state file found"),
            DefaultReason::Corrupt(e) => write!(f, "corrupted state file: {}", e),
        }
    }
}

/// Result of [`StateStore::load`].
#[derive(Debug, Clone, PartialEq)]
pub enum LoadOutcome {
    Loaded(PersistedFilterState),
    Defaulted {
        state: PersistedFilterState,
        reason: DefaultReason,
    },
}

impl LoadOutcome {
    pub fn state(&self) -> PersistedFilterState {
        match self {
            LoadOutcome::Loaded(state) => *state,
            LoadOutcome::Defaulted { state, .. } => *state,
        }
    }

    pub fn is_defaulted(&self) -> bool {
        matches!(self, LoadOutcome::Defaulted { .. })
    }
}

/// File-backed store for [`PersistedFilterState`].
///
/// The path is treated as an opaque key supplied by configuration.
#[derive(Debug, Clone)]
pub struct StateStore {
    path: PathBuf,
    default_params: FilterParameters,
}

impl StateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            default_params: DEFAULT_PARAMS,
        }
    }

    /// Override the parameters used when no checkpoint exists.
    #[must_use]
    pub fn with_default_params(mut self, params: FilterParameters) -> Self {
        self.default_params = params;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn defaulted(&self, reason: DefaultReason) -> LoadOutcome {
        LoadOutcome::Defaulted {
            state: PersistedFilterState {
                params: self.default_params,
                last_residual: 0.0,
            },
            reason,
        }
    }

    /// Load state from disk.
    ///
    /// A missing file or a body that does not parse as a valid record yields
    /// `LoadOutcome::Defaulted`.
    ///
    /// # Errors
    /// Returns `StateError::Io` for read failures other than "not found".
    pub fn load(&self) -> Result<LoadOutcome, StateError> {
        let data = match fs::read_to_string(&self.path) {
            Ok(data) => data,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                let outcome = self.defaulted(DefaultReason::Missing);
                info!(path = %self.path.display(), "No state file found. Using default parameters.");
                return Ok(outcome);
            }
            Err(e) if e.kind() == ErrorKind::InvalidData => {
                // Not valid UTF-8
                warn!(path = %self.path.display(), error = %e, "Corrupted state file. Using default parameters.");
                return Ok(self.defaulted(DefaultReason::Corrupt(e.to_string())));
            }
            Err(source) => {
                return Err(StateError::Io {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        match serde_json::from_str::<PersistedFilterState>(&data) {
            Ok(state) if state.params.is_finite() && state.last_residual.is_finite() => {
                info!(
                    path = %self.path.display(),
                    params = %state.params,
                    last_residual = state.last_residual,
                    "State file loaded successfully."
                );
                Ok(LoadOutcome::Loaded(state))
            }
            Ok(_) => {
                warn!(path = %self.path.display(), "State file holds non-finite values. Using default parameters.");
                Ok(self.defaulted(DefaultReason::Corrupt(
                    "non-finite values".to_string(),
                )))
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Corrupted state file. Using default parameters.");
                Ok(self.defaulted(DefaultReason::Corrupt(e.to_string())))
            }
        }
    }

    /// Persist state to disk atomically, replacing any previous record.
    ///
    /// Uses write-to-temp, fsync, rename so a crash leaves either the old
    /// file or the new one, never a partial write.
    ///
    /// # Errors
    /// Returns error if values are non-finite or file operations fail.
    pub fn save(&self, params: FilterParameters, last_residual: f64) -> Result<(), StateError> {
        if !params.is_finite() {
            return Err(StateError::NonFiniteParams(params));
        }
        if !last_residual.is_finite() {
            return Err(StateError::NonFiniteResidual(last_residual));
        }

        let state = PersistedFilterState {
            params,
            last_residual,
        };
        let json = serde_json::to_string_pretty(&state)?;
        let io_err = |source: std::io::Error| StateError::Io {
            path: self.path.clone(),
            source,
        };

        // Temp file lives beside the target so the rename stays on one
        // filesystem. It is deleted on drop if any step below fails.
        let mut temp = NamedTempFile::new_in(self.parent_dir()).map_err(io_err)?;
        temp.write_all(json.as_bytes()).map_err(io_err)?;
        temp.as_file().sync_all().map_err(io_err)?;
        temp.persist(&self.path).map_err(|e| io_err(e.error))?;

        info!(path = %self.path.display(), last_residual, "State saved to cache.");
        Ok(())
    }

    fn parent_dir(&self) -> &Path {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        }
    }
}

impl Default for StateStore {
    fn default() -> Self {
        Self::new(STATE_FILE)
    }
}
