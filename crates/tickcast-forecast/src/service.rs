//! Request-level orchestration.
//!
//! One service instance owns the provider and the loaded model for the
//! process lifetime; everything else (windows, scalers, tensors, reports)
//! is request-local and dropped with the call stack.

use std::sync::Arc;

use candle_core::Device;
use tracing::{debug, info};

use tickcast_core::{HistoryProvider, MarketDate, TickerSymbol};
use tickcast_model::{run_inference, SequenceModel};

use crate::error::ForecastError;
use crate::recursive::recursive_forecast;
use crate::report::{ForecastReport, PeriodKind, ReportBuilder};
use crate::window::{WindowBuilder, SEQ_LENGTH};

/// Forecast entry points consumed by the HTTP layer.
pub struct ForecastService {
    provider: Arc<dyn HistoryProvider>,
    model: Arc<dyn SequenceModel>,
    model_version: String,
    device: Device,
    seq_length: usize,
}

impl ForecastService {
    pub fn new(
        provider: Arc<dyn HistoryProvider>,
        model: Arc<dyn SequenceModel>,
        model_version: impl Into<String>,
    ) -> Self {
        Self {
            provider,
            model,
            model_version: model_version.into(),
            device: Device::Cpu,
            seq_length: SEQ_LENGTH,
        }
    }

    pub fn with_device(mut self, device: Device) -> Self {
        self.device = device;
        self
    }

    /// Override the window length. Intended for tests.
    pub fn with_seq_length(mut self, seq_length: usize) -> Self {
        self.seq_length = seq_length;
        self
    }

    pub fn model_version(&self) -> &str {
        &self.model_version
    }

    /// Predict one value per trading day in `[start, end]`, with actuals
    /// and diffs wherever the day was observed. An `end` past the last
    /// observed trading day extends the report with recursive forecasts
    /// that carry no actuals.
    pub async fn forecast_range(
        &self,
        symbol: TickerSymbol,
        start: MarketDate,
        end: MarketDate,
    ) -> Result<ForecastReport, ForecastError> {
        info!(ticker = %symbol, %start, %end, "running range forecast");

        let builder = WindowBuilder::new(self.provider.as_ref(), self.seq_length);
        let batch = builder.build_range(&symbol, start, end).await?;

        let inputs = batch.to_tensor(&self.device)?;
        let outputs = run_inference(self.model.as_ref(), &inputs)?;

        let predictions: Vec<f64> = outputs
            .iter()
            .map(|raw| batch.scaler.inverse_transform(*raw))
            .collect();
        let actuals: Vec<Option<f64>> = batch
            .targets
            .iter()
            .map(|normalized| Some(batch.scaler.inverse_transform(*normalized)))
            .collect();

        let mut report =
            ReportBuilder::new(symbol.clone(), &self.model_version, PeriodKind::BetweenDates);
        report.push_batch(&batch.target_dates, &predictions, &actuals);

        let last_observed = batch.last_date();
        if end > last_observed {
            debug!(
                ticker = %symbol,
                %last_observed,
                target_end = %end,
                "extending report past observed history"
            );
            let (dates, values) = recursive_forecast(
                self.model.as_ref(),
                &batch.scaler,
                &batch.last_window(),
                batch.last_target(),
                last_observed,
                end,
                &self.device,
            )?;
            for (date, value) in dates.into_iter().zip(values) {
                report.push(date, value, None);
            }
        }

        Ok(report.build())
    }

    /// Predict the close for one date, with the observed actual when the
    /// date traded inside fetched history (Case A) and without one for
    /// future dates and holidays (Case B).
    pub async fn forecast_day(
        &self,
        symbol: TickerSymbol,
        target: MarketDate,
    ) -> Result<ForecastReport, ForecastError> {
        info!(ticker = %symbol, %target, "running single-day forecast");

        let builder = WindowBuilder::new(self.provider.as_ref(), self.seq_length);
        let day = builder.build_single_day(&symbol, target).await?;

        let inputs = day.to_tensor(&self.device)?;
        let outputs = run_inference(self.model.as_ref(), &inputs)?;
        let raw = outputs.first().copied().ok_or_else(|| {
            ForecastError::Tensor(candle_core::Error::Msg(String::from(
                "inference returned no outputs",
            )))
        })?;
        let prediction = day.scaler.inverse_transform(raw);

        let mut report =
            ReportBuilder::new(symbol, &self.model_version, PeriodKind::SingleDay);
        report.push(target, prediction, day.actual);

        Ok(report.build())
    }
}
