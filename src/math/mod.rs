//! Mathematical utilities for signal generation.
//!
//! This module provides the scalar state-space filter used to estimate the
//! next closing price from a price history.

pub mod kalman;

pub use kalman::{FilterError, FilterTrace, KalmanFilter, StepOutput};
