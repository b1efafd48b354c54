//! In-memory price provider for tests and dry runs.

use super::{HistoryRequest, PriceBar, PriceHistory, PriceProvider, ProviderError};
use async_trait::async_trait;
use chrono::{Days, NaiveDate};

/// Serves a fixed set of bars regardless of symbol.
#[derive(Debug, Clone, Default)]
pub struct StaticPriceProvider {
    bars: Vec<PriceBar>,
}

impl StaticPriceProvider {
    pub fn new(bars: Vec<PriceBar>) -> Self {
        Self { bars }
    }

    /// Daily bars starting at `start`, one per close, with high/low equal to
    /// the close.
    pub fn from_closes(start: NaiveDate, closes: &[f64]) -> Self {
        let bars = closes
            .iter()
            .zip(0u64..)
            .filter_map(|(&close, offset)| {
                let date = start.checked_add_days(Days::new(offset))?;
                Some(PriceBar::new(date, close, close, close))
            })
            .collect();
        Self { bars }
    }
}

#[async_trait]
impl PriceProvider for StaticPriceProvider {
    async fn fetch_history(&self, request: &HistoryRequest) -> Result<PriceHistory, ProviderError> {
        let bars: Vec<PriceBar> = self
            .bars
            .iter()
            .copied()
            .filter(|b| request.contains(b.date))
            .collect();

        if bars.is_empty() {
            return Err(ProviderError::NoData {
                symbol: request.symbol.clone(),
                start: request.start,
                end: request.end,
            });
        }
        PriceHistory::new(request.symbol.clone(), bars)
    }
}
