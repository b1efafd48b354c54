//! Historical price data.
//!
//! Defines the `PriceProvider` seam the predictor pulls its observation
//! series from, plus the concrete providers:
//! - `CsvPriceProvider` - daily bars from `<dir>/<SYMBOL>.csv` (polars)
//! - `StaticPriceProvider` - in-memory bars for tests and dry runs

pub mod csv_provider;
pub mod derived;
pub mod static_provider;

pub use csv_provider::CsvPriceProvider;
pub use derived::{derive, export_derived, DerivedBar};
pub use static_provider::StaticPriceProvider;

use async_trait::async_trait;
use chrono::NaiveDate;
use thiserror::Error;

/// Errors from price providers.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Polars error: {0}")]
    Polars(#[from] polars::prelude::PolarsError),

    #[error("Missing column '{0}' in price data")]
    MissingColumn(String),

    #[error("Invalid price row {row}: {reason}")]
    InvalidRow { row: usize, reason: String },

    #[error("No price data for {symbol} from {start} up to {end}")]
    NoData {
        symbol: String,
        start: NaiveDate,
        end: NaiveDate,
    },

    #[error("Price provider timed out after {0:?}")]
    Timeout(std::time::Duration),
}

/// One daily bar. Only `close` feeds the filter.
///
/// Missing values in the source are carried as `NaN`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceBar {
    pub date: NaiveDate,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

impl PriceBar {
    pub fn new(date: NaiveDate, high: f64, low: f64, close: f64) -> Self {
        Self {
            date,
            high,
            low,
            close,
        }
    }
}

/// Chronologically ascending bars for one symbol.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceHistory {
    symbol: String,
    bars: Vec<PriceBar>,
}

impl PriceHistory {
    /// Build a history, sorting bars by date.
    ///
    /// # Errors
    /// Returns `InvalidRow` if two bars share a date.
    pub fn new(symbol: impl Into<String>, mut bars: Vec<PriceBar>) -> Result<Self, ProviderError> {
        bars.sort_by_key(|b| b.date);
        if let Some(i) = bars.windows(2).position(|w| w[0].date == w[1].date) {
            return Err(ProviderError::InvalidRow {
                row: i + 1,
                reason: format!("duplicate date {}", bars[i].date),
            });
        }
        Ok(Self {
            symbol: symbol.into(),
            bars,
        })
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn bars(&self) -> &[PriceBar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// Closing prices, oldest first. This is the filter's observation series.
    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    pub fn latest_close(&self) -> Option<f64> {
        self.bars.last().map(|b| b.close)
    }
}

/// Symbol and date range to fetch: `start` inclusive, `end` exclusive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryRequest {
    pub symbol: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl HistoryRequest {
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date < self.end
    }
}

/// Source of historical daily bars. Enables swapping between file, remote,
/// and synthetic sources without changing the predictor.
#[async_trait]
pub trait PriceProvider: Send + Sync {
    /// Fetch bars for `request.symbol` within the requested range.
    async fn fetch_history(&self, request: &HistoryRequest) -> Result<PriceHistory, ProviderError>;
}
