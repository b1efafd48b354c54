//! Scalar Kalman Filter for next-period price level estimation.
//!
//! Runs the predict/update recursion of a univariate linear-Gaussian
//! state-space model over a series of closing prices. Parameters are fixed
//! inputs; nothing here estimates them.
//!
//! # Mathematical Model
//!
//! **State equation**:
//! ```text
//! a[t+1] = T * a[t] + η,  where η ~ N(0, Q)
//! ```
//!
//! **Observation equation**:
//! ```text
//! y[t] = Z * a[t] + ε,  where ε ~ N(0, H)
//! ```
//!
//! Per step `t = 1..=S`, consuming `y[t-1]`:
//! ```text
//! F        = Z * P_pred[t-1] * Z + H
//! v        = y[t-1] - Z * a_pred[t-1]
//! a_upd[t] = a_pred[t-1] + P_pred[t-1] * Z * v / F
//! P_upd[t] = P_pred[t-1] - P_pred[t-1] * Z * Z * P_pred[t-1] / F
//! a_pred[t] = T * a_upd[t]
//! P_pred[t] = T * P_upd[t] * T + Q
//! ```
//!
//! # Usage
//!
//! ```rust
//! use kalmansignal::math::KalmanFilter;
//! use kalmansignal::types::FilterParameters;
//!
//! let filter = KalmanFilter::new(FilterParameters::new(0.3, 0.9, 0.8, 1.1));
//! let trace = filter.run(&[100.0, 102.0, 101.0, 105.0]).unwrap();
//! println!("Predicted next close: {}", trace.final_state());
//! ```

use crate::types::FilterParameters;
use thiserror::Error;
use tracing::debug;

/// Prior variance of the updated state before any observation is absorbed.
pub const INITIAL_UPDATED_VARIANCE: f64 = 1000.0;

/// Innovation covariances smaller than this in magnitude are treated as zero.
pub const DEGENERATE_EPSILON: f64 = f64::EPSILON;

/// Errors raised by the filter recursion.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum FilterError {
    /// No observations were supplied.
    #[error("Observation series is empty")]
    EmptySeries,

    /// Innovation covariance collapsed to (numerically) zero.
    #[error("Degenerate filter at step {step}: innovation variance {innovation_variance}")]
    DegenerateFilter { step: usize, innovation_variance: f64 },

    /// An observation was NaN or infinite.
    #[error("Non-finite observation at index {index}: {value}")]
    NonFiniteObservation { index: usize, value: f64 },
}

/// Output of a single recursion step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepOutput {
    /// Innovation `v` (observation minus its prediction)
    pub residual: f64,
    /// Filtered state after absorbing the observation
    pub updated_state: f64,
    /// Filtered variance after absorbing the observation
    pub updated_variance: f64,
    /// One-step-ahead state projection
    pub predicted_state: f64,
    /// One-step-ahead variance projection
    pub predicted_variance: f64,
}

/// Per-run record of every intermediate quantity.
///
/// State/variance sequences have length `S + 1` (index 0 is the prior);
/// `residuals` has length `S`.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterTrace {
    pub predicted_state: Vec<f64>,
    pub predicted_variance: Vec<f64>,
    pub updated_state: Vec<f64>,
    pub updated_variance: Vec<f64>,
    pub residuals: Vec<f64>,
}

impl FilterTrace {
    fn with_capacity(steps: usize) -> Self {
        let mut trace = Self {
            predicted_state: Vec::with_capacity(steps + 1),
            predicted_variance: Vec::with_capacity(steps + 1),
            updated_state: Vec::with_capacity(steps + 1),
            updated_variance: Vec::with_capacity(steps + 1),
            residuals: Vec::with_capacity(steps),
        };
        trace.predicted_state.push(0.0);
        trace.predicted_variance.push(0.0);
        trace.updated_state.push(0.0);
        trace.updated_variance.push(INITIAL_UPDATED_VARIANCE);
        trace
    }

    fn push(&mut self, step: StepOutput) {
        self.residuals.push(step.residual);
        self.updated_state.push(step.updated_state);
        self.updated_variance.push(step.updated_variance);
        self.predicted_state.push(step.predicted_state);
        self.predicted_variance.push(step.predicted_variance);
    }

    /// Number of observations absorbed.
    #[inline]
    pub fn steps(&self) -> usize {
        self.residuals.len()
    }

    /// Filtered estimate after the last observation, used as the predicted
    /// next value.
    #[inline]
    pub fn final_state(&self) -> f64 {
        self.updated_state.last().copied().unwrap_or(0.0)
    }

    /// Innovation of the last step.
    #[inline]
    pub fn final_residual(&self) -> f64 {
        self.residuals.last().copied().unwrap_or(0.0)
    }
}

/// Scalar Kalman filter over a fixed parameter set.
#[derive(Debug, Clone, Copy)]
pub struct KalmanFilter {
    params: FilterParameters,
}

impl KalmanFilter {
    pub fn new(params: FilterParameters) -> Self {
        Self { params }
    }

    /// Advance the recursion by one observation.
    ///
    /// `step` is the 1-based step index, reported in errors only.
    ///
    /// # Errors
    /// - `DegenerateFilter` if `|F| < DEGENERATE_EPSILON` or `F` is not finite
    pub fn step(
        &self,
        step: usize,
        predicted_state: f64,
        predicted_variance: f64,
        observation: f64,
    ) -> Result<StepOutput, FilterError> {
        let FilterParameters {
            loading: z,
            transition: t,
            obs_noise: h,
            process_noise: q,
        } = self.params;

        let f = z * predicted_variance * z + h;
        if !f.is_finite() || f.abs() < DEGENERATE_EPSILON {
            return Err(FilterError::DegenerateFilter {
                step,
                innovation_variance: f,
            });
        }
        let f_inv = 1.0 / f;

        let residual = observation - z * predicted_state;
        let updated_state = predicted_state + predicted_variance * z * f_inv * residual;
        let updated_variance =
            predicted_variance - predicted_variance * z * f_inv * z * predicted_variance;

        Ok(StepOutput {
            residual,
            updated_state,
            updated_variance,
            predicted_state: t * updated_state,
            predicted_variance: t * updated_variance * t + q,
        })
    }

    /// Run the full recursion over `observations`.
    ///
    /// # Errors
    /// - `EmptySeries` if `observations` is empty
    /// - `NonFiniteObservation` if any observation is NaN/inf (checked up front)
    /// - `DegenerateFilter` if any step's innovation variance collapses
    pub fn run(&self, observations: &[f64]) -> Result<FilterTrace, FilterError> {
        if observations.is_empty() {
            return Err(FilterError::EmptySeries);
        }
        if let Some((index, &value)) = observations
            .iter()
            .enumerate()
            .find(|(_, v)| !v.is_finite())
        {
            return Err(FilterError::NonFiniteObservation { index, value });
        }

        let mut trace = FilterTrace::with_capacity(observations.len());
        let mut predicted_state = 0.0;
        let mut predicted_variance = 0.0;

        for (i, &y) in observations.iter().enumerate() {
            let out = self.step(i + 1, predicted_state, predicted_variance, y)?;
            predicted_state = out.predicted_state;
            predicted_variance = out.predicted_variance;
            trace.push(out);
        }

        debug!(
            steps = trace.steps(),
            final_state = trace.final_state(),
            final_residual = trace.final_residual(),
            "Kalman filter applied"
        );

        Ok(trace)
    }
}
