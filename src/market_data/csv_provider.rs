//! CSV price provider.
//!
//! Reads Yahoo-style daily bar exports (`Date,Open,High,Low,Close,...`).

use super::{HistoryRequest, PriceBar, PriceHistory, PriceProvider, ProviderError};
use async_trait::async_trait;
use chrono::NaiveDate;
use polars::prelude::*;
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::info;

const DATE_COLUMN: &str = "Date";
const HIGH_COLUMN: &str = "High";
const LOW_COLUMN: &str = "Low";
const CLOSE_COLUMN: &str = "Close";

/// Loads `<data_dir>/<SYMBOL>.csv` and filters to the requested range.
#[derive(Debug, Clone)]
pub struct CsvPriceProvider {
    data_dir: PathBuf,
}

impl CsvPriceProvider {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn path_for(&self, symbol: &str) -> PathBuf {
        self.data_dir.join(format!("{}.csv", symbol))
    }
}

fn float_column(df: &DataFrame, name: &str) -> Result<Vec<Option<f64>>, ProviderError> {
    let column = df
        .column(name)
        .map_err(|_| ProviderError::MissingColumn(name.to_string()))?;
    let values = column.cast(&DataType::Float64)?;
    Ok(values.f64()?.into_iter().collect())
}

fn date_column(df: &DataFrame) -> Result<Vec<Option<String>>, ProviderError> {
    let column = df
        .column(DATE_COLUMN)
        .map_err(|_| ProviderError::MissingColumn(DATE_COLUMN.to_string()))?;
    let values = column.cast(&DataType::String)?;
    Ok(values
        .str()?
        .into_iter()
        .map(|v| v.map(str::to_string))
        .collect())
}

/// Parse every row of a bar file into `PriceBar`s (unfiltered, file order).
pub fn read_bars(path: &Path) -> Result<Vec<PriceBar>, ProviderError> {
    let file = File::open(path)?;
    let df = CsvReader::new(file).finish()?;

    let dates = date_column(&df)?;
    let highs = float_column(&df, HIGH_COLUMN)?;
    let lows = float_column(&df, LOW_COLUMN)?;
    let closes = float_column(&df, CLOSE_COLUMN)?;

    let mut bars = Vec::with_capacity(df.height());
    for row in 0..df.height() {
        let invalid = |reason: &str| ProviderError::InvalidRow {
            row,
            reason: reason.to_string(),
        };

        let raw_date = dates[row].as_deref().ok_or_else(|| invalid("missing date"))?;
        // Exports sometimes carry a time component; keep the day.
        let day = raw_date.get(..10).unwrap_or(raw_date);
        let date = NaiveDate::parse_from_str(day, "%Y-%m-%d")
            .map_err(|e| invalid(&format!("bad date '{}': {}", raw_date, e)))?;

        // Blank cells stay in the history as NaN; rows without a log
        // return are dropped when the series is derived.
        bars.push(PriceBar::new(
            date,
            highs[row].unwrap_or(f64::NAN),
            lows[row].unwrap_or(f64::NAN),
            closes[row].unwrap_or(f64::NAN),
        ));
    }

    Ok(bars)
}

#[async_trait]
impl PriceProvider for CsvPriceProvider {
    async fn fetch_history(&self, request: &HistoryRequest) -> Result<PriceHistory, ProviderError> {
        let path = self.path_for(&request.symbol);

        let bars = tokio::task::spawn_blocking(move || read_bars(&path))
            .await
            .map_err(|e| ProviderError::Io(std::io::Error::other(e)))??;

        let bars: Vec<PriceBar> = bars.into_iter().filter(|b| request.contains(b.date)).collect();
        if bars.is_empty() {
            return Err(ProviderError::NoData {
                symbol: request.symbol.clone(),
                start: request.start,
                end: request.end,
            });
        }

        info!(symbol = %request.symbol, bars = bars.len(), "Price data loaded from CSV.");
        PriceHistory::new(request.symbol.clone(), bars)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const SAMPLE: &str = "Date,Open,High,Low,Close,Adj Close,Volume
2024-01-02,100,101,99,100,100,1000
2024-01-03,100,103,99,102,102,1000
2024-01-04,102,102,100,101,101,1000
2024-01-05,101,106,101,105,105,1000
";

    fn request(start: &str, end: &str) -> HistoryRequest {
        HistoryRequest {
            symbol: "META".to_string(),
            start: NaiveDate::parse_from_str(start, "%Y-%m-%d").unwrap(),
            end: NaiveDate::parse_from_str(end, "%Y-%m-%d").unwrap(),
        }
    }

    #[tokio::test]
    async fn test_reads_closes_in_range() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("META.csv"), SAMPLE).unwrap();
        let provider = CsvPriceProvider::new(dir.path());

        let history = provider
            .fetch_history(&request("2024-01-03", "2024-01-31"))
            .await
            .unwrap();

        assert_eq!(history.closes(), vec![102.0, 101.0, 105.0]);
        assert_eq!(history.bars()[0].high, 103.0);
    }

    #[tokio::test]
    async fn test_end_date_is_exclusive() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("META.csv"), SAMPLE).unwrap();
        let provider = CsvPriceProvider::new(dir.path());

        let history = provider
            .fetch_history(&request("2024-01-02", "2024-01-05"))
            .await
            .unwrap();

        assert_eq!(history.closes(), vec![100.0, 102.0, 101.0]);
    }

    #[test]
    fn test_blank_close_reads_as_nan() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("GAP.csv");
        std::fs::write(
            &path,
            "Date,High,Low,Close\n2024-01-02,101,99,100\n2024-01-03,103,99,\n",
        )
        .unwrap();

        let bars = read_bars(&path).unwrap();
        assert_eq!(bars.len(), 2);
        assert_eq!(bars[0].close, 100.0);
        assert!(bars[1].close.is_nan());
    }

    #[tokio::test]
    async fn test_empty_range_is_no_data() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("META.csv"), SAMPLE).unwrap();
        let provider = CsvPriceProvider::new(dir.path());

        let result = provider
            .fetch_history(&request("2023-01-01", "2023-12-31"))
            .await;
        assert!(matches!(result, Err(ProviderError::NoData { .. })));
    }

    #[tokio::test]
    async fn test_missing_file_is_io_error() {
        let dir = tempdir().unwrap();
        let provider = CsvPriceProvider::new(dir.path());

        let result = provider
            .fetch_history(&request("2024-01-01", "2024-12-31"))
            .await;
        assert!(matches!(result, Err(ProviderError::Io(_))));
    }

    #[test]
    fn test_missing_close_column() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("BAD.csv");
        std::fs::write(&path, "Date,High,Low\n2024-01-02,1,1\n").unwrap();

        assert!(matches!(
            read_bars(&path),
            Err(ProviderError::MissingColumn(c)) if c == "Close"
        ));
    }
}
