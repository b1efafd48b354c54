use async_trait::async_trait;
use chrono::NaiveDate;
use kalmansignal::market_data::{
    CsvPriceProvider, HistoryRequest, PriceBar, PriceHistory, PriceProvider, ProviderError,
};
use kalmansignal::math::FilterError;
use kalmansignal::orchestrator::{Orchestrator, PredictionError, PredictorConfig};
use kalmansignal::state::{StateStore, DEFAULT_PARAMS};
use kalmansignal::strategy::{decide, Decision};
use mockall::mock;
use std::sync::Arc;
use std::time::Duration;
use tempfile::tempdir;

// --- Mocks ---

mock! {
    pub Provider {}

    #[async_trait]
    impl PriceProvider for Provider {
        async fn fetch_history(&self, request: &HistoryRequest) -> Result<PriceHistory, ProviderError>;
    }
}

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
}

fn bars(closes: &[f64]) -> Vec<PriceBar> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &c)| PriceBar::new(day(2 + i as u32), c + 1.0, c - 1.0, c))
        .collect()
}

fn config(state_path: std::path::PathBuf) -> PredictorConfig {
    PredictorConfig {
        state_path,
        start_date: day(1),
        end_date: Some(day(31)),
        provider_timeout: Duration::from_secs(5),
        ..PredictorConfig::default()
    }
}

fn provider_serving(closes: &'static [f64], times: usize) -> MockProvider {
    let mut provider = MockProvider::new();
    provider
        .expect_fetch_history()
        .times(times)
        .returning(move |req| PriceHistory::new(req.symbol.clone(), bars(closes)));
    provider
}

// --- Tests ---

#[tokio::test]
async fn test_two_runs_continue_from_checkpoint() {
    let dir = tempdir().unwrap();
    let state_path = dir.path().join("kalman_params.json");
    let provider = provider_serving(&[100.0, 102.0, 101.0, 105.0], 2);
    let orchestrator = Orchestrator::new(config(state_path.clone()), Arc::new(provider));

    // First run: no checkpoint, defaults apply
    let first = orchestrator.run_detailed().await.unwrap();
    assert!(first.state_defaulted);
    assert_eq!(first.previous_residual, 0.0);
    assert_eq!(first.params, DEFAULT_PARAMS);
    assert_eq!(first.outcome.latest_observed_value, 105.0);
    assert!(first.outcome.predicted_value.is_finite());
    assert_eq!(
        first.outcome.decision,
        decide(first.outcome.predicted_value, 105.0)
    );
    assert_ne!(first.residual, 0.0);

    // Second run: picks up the persisted residual, params unchanged
    let second = orchestrator.run_detailed().await.unwrap();
    assert!(!second.state_defaulted);
    assert_eq!(second.params, DEFAULT_PARAMS);
    assert_eq!(second.previous_residual, first.residual);
    assert_ne!(second.previous_residual, 0.0);

    let saved = StateStore::new(&state_path).load().unwrap().state();
    assert_eq!(saved.params, DEFAULT_PARAMS);
    assert_eq!(saved.last_residual, second.residual);
}

#[tokio::test]
async fn test_corrupt_checkpoint_defaults_and_is_repaired() {
    let dir = tempdir().unwrap();
    let state_path = dir.path().join("kalman_params.json");
    std::fs::write(&state_path, "{\"params\": \"oops\"}").unwrap();

    let provider = provider_serving(&[100.0, 102.0, 101.0, 105.0], 1);
    let orchestrator = Orchestrator::new(config(state_path.clone()), Arc::new(provider));

    let report = orchestrator.run_detailed().await.unwrap();
    assert!(report.state_defaulted);

    let reloaded = StateStore::new(&state_path).load().unwrap();
    assert!(!reloaded.is_defaulted());
    assert_eq!(reloaded.state().last_residual, report.residual);
}

#[tokio::test]
async fn test_provider_failure_leaves_state_untouched() {
    let dir = tempdir().unwrap();
    let state_path = dir.path().join("kalman_params.json");
    StateStore::new(&state_path).save(DEFAULT_PARAMS, 4.5).unwrap();

    let mut provider = MockProvider::new();
    provider.expect_fetch_history().times(1).returning(|req| {
        Err(ProviderError::NoData {
            symbol: req.symbol.clone(),
            start: req.start,
            end: req.end,
        })
    });
    let orchestrator = Orchestrator::new(config(state_path.clone()), Arc::new(provider));

    let err = orchestrator.run().await.unwrap_err();
    assert!(matches!(err, PredictionError::Provider(ProviderError::NoData { .. })));
    assert_eq!(
        StateStore::new(&state_path).load().unwrap().state().last_residual,
        4.5
    );
}

#[tokio::test]
async fn test_csv_prediction_is_pinned() {
    // First bar carries no log return, so the filter sees [102, 101, 105].
    let dir = tempdir().unwrap();
    std::fs::write(
        dir.path().join("META.csv"),
        "Date,Open,High,Low,Close,Adj Close,Volume\n\
         2024-01-02,100,101,99,100,100,1000\n\
         2024-01-03,100,103,99,102,102,1000\n\
         2024-01-04,102,102,100,101,101,1000\n\
         2024-01-05,101,106,100,105,105,1000\n\
         2024-01-08,105,107,104,106,106,1000\n",
    )
    .unwrap();
    let state_path = dir.path().join("kalman_params.json");
    let cfg = PredictorConfig {
        end_date: Some(day(8)),
        ..config(state_path.clone())
    };
    let orchestrator = Orchestrator::new(cfg, Arc::new(CsvPriceProvider::new(dir.path())));

    let report = orchestrator.run_detailed().await.unwrap();
    assert_eq!(report.observations, 3);
    assert_eq!(report.outcome.latest_observed_value, 105.0);
    assert!((report.outcome.predicted_value - 88.95613358353786).abs() < 1e-9);
    assert!((report.residual - 94.98987764182425).abs() < 1e-9);
    assert_eq!(report.outcome.decision, Decision::Sell);

    let saved = StateStore::new(&state_path).load().unwrap().state();
    assert_eq!(saved.last_residual, report.residual);
}

#[tokio::test]
async fn test_missing_close_drops_surrounding_rows() {
    let dir = tempdir().unwrap();
    let state_path = dir.path().join("kalman_params.json");
    let provider = provider_serving(&[100.0, 102.0, f64::NAN, 104.0, 105.0, 103.0], 1);
    let orchestrator = Orchestrator::new(config(state_path), Arc::new(provider));

    let report = orchestrator.run_detailed().await.unwrap();
    // Kept series: [102, 105, 103]
    assert_eq!(report.observations, 3);
    assert_eq!(report.outcome.latest_observed_value, 103.0);
    assert!((report.outcome.predicted_value - 88.87518011630613).abs() < 1e-9);
    assert!((report.residual - 92.59343715239154).abs() < 1e-9);
}

#[tokio::test]
async fn test_no_usable_rows_aborts_before_save() {
    let dir = tempdir().unwrap();
    let state_path = dir.path().join("kalman_params.json");
    let provider = provider_serving(&[100.0, f64::NAN, 105.0], 1);
    let orchestrator = Orchestrator::new(config(state_path.clone()), Arc::new(provider));

    let err = orchestrator.run().await.unwrap_err();
    assert!(matches!(err, PredictionError::Filter(FilterError::EmptySeries)));
    assert!(!state_path.exists());
}

#[tokio::test]
async fn test_save_into_missing_directory_is_storage_failure() {
    let dir = tempdir().unwrap();
    let state_path = dir.path().join("missing_dir").join("kalman_params.json");
    let provider = provider_serving(&[100.0, 102.0, 101.0, 105.0], 1);
    let orchestrator = Orchestrator::new(config(state_path.clone()), Arc::new(provider));

    let err = orchestrator.run().await.unwrap_err();
    assert!(matches!(err, PredictionError::Storage(_)));
    assert!(!state_path.exists());
}

#[tokio::test]
async fn test_unreadable_state_is_storage_failure() {
    // A directory at the state path is neither missing nor corrupt.
    let dir = tempdir().unwrap();
    let provider = provider_serving(&[100.0, 101.0, 103.0], 1);
    let orchestrator = Orchestrator::new(config(dir.path().to_path_buf()), Arc::new(provider));

    let err = orchestrator.run().await.unwrap_err();
    assert!(matches!(err, PredictionError::Storage(_)));
}

struct StalledProvider;

#[async_trait]
impl PriceProvider for StalledProvider {
    async fn fetch_history(&self, request: &HistoryRequest) -> Result<PriceHistory, ProviderError> {
        tokio::time::sleep(Duration::from_secs(10)).await;
        PriceHistory::new(request.symbol.clone(), bars(&[1.0, 2.0]))
    }
}

#[tokio::test]
async fn test_provider_timeout() {
    let dir = tempdir().unwrap();
    let state_path = dir.path().join("kalman_params.json");
    let cfg = PredictorConfig {
        provider_timeout: Duration::from_millis(50),
        ..config(state_path.clone())
    };
    let orchestrator = Orchestrator::new(cfg, Arc::new(StalledProvider));

    let err = orchestrator.run().await.unwrap_err();
    assert!(matches!(err, PredictionError::Provider(ProviderError::Timeout(_))));
    assert!(!state_path.exists());
}
