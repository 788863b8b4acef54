//! Behavior-driven tests for the end-to-end forecast pipeline.
//!
//! These tests verify HOW the service composes fetch, windowing,
//! normalization, inference, recursion, and report assembly — with both
//! model doubles and a real artifact-backed network.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use candle_core::{Device, Result as CandleResult, Tensor};
use time::macros::date;

use tickcast_core::{
    DailyBar, HistoryProvider, HistoryRequest, MarketDate, PriceHistory, ProviderError,
    TickerSymbol, YahooHistoryProvider,
};
use tickcast_forecast::{ForecastError, ForecastService, PeriodKind, ReportKind};
use tickcast_model::{LoadedModel, LstmSpec, ModelDescriptor, SequenceModel};

/// Provider double returning a canned history regardless of the request.
struct StaticProvider {
    history: PriceHistory,
}

impl HistoryProvider for StaticProvider {
    fn fetch_daily<'a>(
        &'a self,
        _req: HistoryRequest,
    ) -> Pin<Box<dyn Future<Output = Result<PriceHistory, ProviderError>> + Send + 'a>> {
        let history = self.history.clone();
        Box::pin(async move { Ok(history) })
    }
}

/// Model double that always predicts the same normalized value.
struct ConstantModel(f32);

impl SequenceModel for ConstantModel {
    fn forward(&self, inputs: &Tensor) -> CandleResult<Tensor> {
        let batch = inputs.dim(0)?;
        Tensor::full(self.0, (batch, 1), inputs.device())
    }
}

/// Model double whose forward pass always fails.
struct FailingModel;

impl SequenceModel for FailingModel {
    fn forward(&self, _inputs: &Tensor) -> CandleResult<Tensor> {
        Err(candle_core::Error::Msg(String::from(
            "weight shape mismatch",
        )))
    }
}

fn ticker() -> TickerSymbol {
    TickerSymbol::parse("ITUB4.SA").expect("valid ticker")
}

fn business_day_history(count: usize, base: f64) -> PriceHistory {
    let mut day = MarketDate::from_date(date!(2025 - 06 - 02));
    let mut bars = Vec::with_capacity(count);

    for i in 0..count {
        bars.push(DailyBar::close_only(day, base + i as f64).expect("valid bar"));
        day = day.next_business_day().expect("in range");
    }

    PriceHistory::new(ticker(), bars).expect("valid history")
}

fn service_over(history: PriceHistory, model: Arc<dyn SequenceModel>) -> ForecastService {
    let provider = Arc::new(StaticProvider { history });
    ForecastService::new(provider, model, "lstm-test").with_seq_length(5)
}

// =============================================================================
// Range forecasts
// =============================================================================

#[tokio::test]
async fn range_forecast_compares_predictions_to_observed_closes() {
    // Given: 20 trading days of history and a constant model
    let history = business_day_history(20, 100.0);
    let dates = history.dates();
    let service = service_over(history, Arc::new(ConstantModel(0.0)));

    // When: forecasting a fully-observed span
    let report = service
        .forecast_range(ticker(), dates[8], dates[19])
        .await
        .expect("range forecast succeeds");

    // Then: one record per trading day, each with an actual and a diff
    assert_eq!(report.metadata.period, PeriodKind::BetweenDates);
    assert_eq!(report.metadata.kind, ReportKind::Backtest);
    assert_eq!(report.metadata.count, 12);
    assert_eq!(report.data.len(), 12);

    for record in &report.data {
        let actual = record.actual.expect("observed day carries an actual");
        let diff = record.diff.expect("diff accompanies the actual");
        assert!((diff - (record.prediction - actual)).abs() < 0.011);
    }

    // A normalized 0.0 sits mid-range of the shared fit: (103 + 118) / 2.
    assert!((report.data[0].prediction - 110.5).abs() < 0.011);
    assert_eq!(report.data[0].actual, Some(108.0));
}

#[tokio::test]
async fn range_forecast_extends_recursively_past_observed_history() {
    // Given: history ending on Fri 2025-06-27 and a range end the next
    // Wednesday
    let history = business_day_history(20, 100.0);
    let dates = history.dates();
    let last_observed = dates[19];
    assert_eq!(last_observed.format_calendar(), "2025-06-27");
    let target_end = MarketDate::from_date(date!(2025 - 07 - 02));

    let service = service_over(history, Arc::new(ConstantModel(0.0)));

    // When
    let report = service
        .forecast_range(ticker(), dates[8], target_end)
        .await
        .expect("range forecast succeeds");

    // Then: 12 backtested records plus Mon/Tue/Wed forecast-only records
    assert_eq!(report.data.len(), 15);
    assert_eq!(report.metadata.kind, ReportKind::Backtest);

    let tail = &report.data[12..];
    let tail_dates: Vec<String> = tail.iter().map(|r| r.date.format_calendar()).collect();
    assert_eq!(tail_dates, vec!["2025-06-30", "2025-07-01", "2025-07-02"]);
    for record in tail {
        assert_eq!(record.actual, None);
        assert_eq!(record.diff, None);
    }
}

#[tokio::test]
async fn range_forecast_entirely_in_the_future_fails_alignment() {
    // Given: a requested span that starts after all fetched rows
    let history = business_day_history(20, 100.0);
    let last = history.last_date().expect("non-empty");
    let service = service_over(history, Arc::new(ConstantModel(0.0)));

    let start = last.offset_days(10).expect("in range");
    let end = start.offset_days(5).expect("in range");

    let err = service
        .forecast_range(ticker(), start, end)
        .await
        .expect_err("must fail");
    assert!(matches!(err, ForecastError::DataAlignment { .. }));
}

#[tokio::test]
async fn inference_failure_aborts_the_range_forecast() {
    let history = business_day_history(20, 100.0);
    let dates = history.dates();
    let service = service_over(history, Arc::new(FailingModel));

    let err = service
        .forecast_range(ticker(), dates[8], dates[19])
        .await
        .expect_err("must fail");

    let ForecastError::Inference(failure) = err else {
        panic!("expected a structured inference failure");
    };
    assert!(failure.details.contains("shape mismatch"));
    assert!(!failure.trace.is_empty());
}

// =============================================================================
// Single-day forecasts
// =============================================================================

#[tokio::test]
async fn single_day_backtest_reports_actual_and_diff() {
    // Given: a target inside observed history (Case A)
    let history = business_day_history(10, 100.0);
    let dates = history.dates();
    let service = service_over(history, Arc::new(ConstantModel(0.0)));

    let report = service
        .forecast_day(ticker(), dates[7])
        .await
        .expect("single-day forecast succeeds");

    assert_eq!(report.metadata.period, PeriodKind::SingleDay);
    assert_eq!(report.metadata.kind, ReportKind::Backtest);
    assert_eq!(report.data.len(), 1);

    let record = &report.data[0];
    assert_eq!(record.date, dates[7]);
    assert_eq!(record.actual, Some(107.0));
    // Normalized 0.0 mid-range of the window fit over closes 102..=106.
    assert!((record.prediction - 104.0).abs() < 0.011);
    assert_eq!(record.diff, Some(-3.0));
}

#[tokio::test]
async fn single_day_forecast_for_a_future_date_has_no_actual() {
    // Given: a target past all observed history (Case B)
    let history = business_day_history(10, 100.0);
    let last = history.last_date().expect("non-empty");
    let service = service_over(history, Arc::new(ConstantModel(0.0)));

    let target = last.offset_days(9).expect("in range");
    let report = service
        .forecast_day(ticker(), target)
        .await
        .expect("single-day forecast succeeds");

    assert_eq!(report.metadata.kind, ReportKind::Forecast);
    let record = &report.data[0];
    assert_eq!(record.date, target);
    assert_eq!(record.actual, None);
    assert_eq!(record.diff, None);
}

// =============================================================================
// End-to-end with a real artifact-backed network
// =============================================================================

#[tokio::test]
async fn artifact_backed_network_serves_full_length_windows() {
    // Given: a freshly initialized artifact and fixture market data
    let dir = tempfile::tempdir().expect("tempdir");
    let device = Device::Cpu;
    let descriptor = ModelDescriptor::new(
        "lstm-e2e",
        LstmSpec {
            input_size: 1,
            hidden_size: 8,
            num_layers: 2,
            output_size: 1,
            dropout: 0.2,
        },
    );
    LoadedModel::create(dir.path(), descriptor, &device).expect("artifact created");
    let model = LoadedModel::load(dir.path(), &device).expect("artifact loads");

    let provider = Arc::new(YahooHistoryProvider::default());
    let version = model.version().to_owned();
    let service = ForecastService::new(provider, Arc::new(model), version);

    // When: forecasting a week at the default window length
    let report = service
        .forecast_range(
            ticker(),
            MarketDate::from_date(date!(2025 - 06 - 02)),
            MarketDate::from_date(date!(2025 - 06 - 06)),
        )
        .await
        .expect("end-to-end forecast succeeds");

    // Then: five trading days, all with finite predictions and actuals
    assert_eq!(report.metadata.count, 5);
    assert_eq!(report.metadata.model_version, "lstm-e2e");
    for record in &report.data {
        assert!(record.prediction.is_finite());
        assert!(record.actual.is_some());
    }
}
