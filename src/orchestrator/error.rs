//! Error type surfaced by the prediction trigger.

use crate::market_data::ProviderError;
use crate::math::FilterError;
use crate::state::StateError;
use thiserror::Error;

/// Every way a prediction run can fail. A failed run returns no result and
/// leaves the persisted state untouched unless the failure is in the save
/// itself.
#[derive(Debug, Error)]
pub enum PredictionError {
    /// Price data could not be obtained
    #[error("Price provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Empty series, non-finite observation or degenerate recursion
    #[error("Filter error: {0}")]
    Filter(#[from] FilterError),

    /// Durable state could not be read or written
    #[error("State storage error: {0}")]
    Storage(#[from] StateError),
}
