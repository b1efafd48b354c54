//! Common Types Module
//!
//! Shared types used across the codebase to avoid circular dependencies.

use serde::{Deserialize, Serialize};

/// Fixed parameters of the scalar state-space model.
///
/// Serialized as an ordered list `[Z, T, H, Q]` so the persisted record keeps
/// exactly four entries.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 4]", into = "[f64; 4]")]
pub struct FilterParameters {
    /// Observation loading coefficient (Z)
    pub loading: f64,
    /// State transition coefficient (T)
    pub transition: f64,
    /// Observation noise variance (H)
    pub obs_noise: f64,
    /// Process noise variance (Q)
    pub process_noise: f64,
}

impl FilterParameters {
    pub const fn new(loading: f64, transition: f64, obs_noise: f64, process_noise: f64) -> Self {
        Self {
            loading,
            transition,
            obs_noise,
            process_noise,
        }
    }

    /// Returns `true` when all four coefficients are finite numbers.
    pub fn is_finite(&self) -> bool {
        self.as_array().iter().all(|v| v.is_finite())
    }

    pub fn as_array(&self) -> [f64; 4] {
        [
            self.loading,
            self.transition,
            self.obs_noise,
            self.process_noise,
        ]
    }
}

impl From<[f64; 4]> for FilterParameters {
    fn from([z, t, h, q]: [f64; 4]) -> Self {
        Self::new(z, t, h, q)
    }
}

impl From<FilterParameters> for [f64; 4] {
    fn from(p: FilterParameters) -> Self {
        p.as_array()
    }
}

impl std::fmt::Display for FilterParameters {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Z={} T={} H={} Q={}",
            self.loading, self.transition, self.obs_noise, self.process_noise
        )
    }
}
