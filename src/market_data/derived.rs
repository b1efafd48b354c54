//! Derived dataset: typical price and percentage log returns per bar.
//!
//! The first bar has no log return and is dropped from the output, as is any
//! bar whose log return is not finite (a missing close drops its own row and
//! the following one). The closes of the surviving rows are the observation
//! series the predictor filters.

use super::{PriceHistory, ProviderError};
use polars::prelude::*;
use std::fs::File;
use std::path::Path;
use tracing::info;

/// One row of the derived dataset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DerivedBar {
    pub date: chrono::NaiveDate,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    /// Mean of high, low and close
    pub typical_price: f64,
    /// `(ln close[t] - ln close[t-1]) * 100`
    pub log_return: f64,
}

/// Compute the derived rows that carry a finite log return.
pub fn derive(history: &PriceHistory) -> Vec<DerivedBar> {
    history
        .bars()
        .windows(2)
        .map(|w| {
            let (prev, bar) = (w[0], w[1]);
            DerivedBar {
                date: bar.date,
                high: bar.high,
                low: bar.low,
                close: bar.close,
                typical_price: (bar.high + bar.low + bar.close) / 3.0,
                log_return: (bar.close.ln() - prev.close.ln()) * 100.0,
            }
        })
        .filter(|row| row.log_return.is_finite())
        .collect()
}

/// Write the derived dataset to `path` as CSV. Returns the row count.
pub fn export_derived(history: &PriceHistory, path: &Path) -> Result<usize, ProviderError> {
    let rows = derive(history);

    let dates: Vec<String> = rows.iter().map(|r| r.date.to_string()).collect();
    let highs: Vec<f64> = rows.iter().map(|r| r.high).collect();
    let lows: Vec<f64> = rows.iter().map(|r| r.low).collect();
    let closes: Vec<f64> = rows.iter().map(|r| r.close).collect();
    let typical: Vec<f64> = rows.iter().map(|r| r.typical_price).collect();
    let lrets: Vec<f64> = rows.iter().map(|r| r.log_return).collect();

    let mut df = df! {
        "Date" => dates,
        "High" => highs,
        "Low" => lows,
        "Close" => closes,
        "Typical_Price" => typical,
        "lrets" => lrets
    }?;

    let mut file = File::create(path)?;
    CsvWriter::new(&mut file).finish(&mut df)?;

    info!(symbol = %history.symbol(), rows = rows.len(), path = %path.display(), "Derived dataset written.");
    Ok(rows.len())
}
