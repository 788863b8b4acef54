//! Window construction for both forecast modes.
//!
//! One builder, two modes. Range mode produces a batch of windows with one
//! target per trading day in the requested span and a single batch-shared
//! scaler fit. Single-day mode produces exactly one window ending at (Case
//! A) or before (Case B) the requested date, with a per-window scaler fit.
//! The two fits are existing behavior and are not interchangeable.

use candle_core::{Device, Tensor};
use ndarray::{Array1, Array3, Axis};

use tickcast_core::{HistoryProvider, HistoryRequest, MarketDate, PriceHistory, TickerSymbol};

use crate::error::ForecastError;
use crate::features::{close_matrix, sliding_windows};
use crate::scaler::MinMaxScaler;

/// Number of past observations the model sees per prediction.
pub const SEQ_LENGTH: usize = 30;

/// Builds normalized model inputs from fetched daily history.
pub struct WindowBuilder<'a> {
    provider: &'a dyn HistoryProvider,
    seq_length: usize,
}

impl<'a> WindowBuilder<'a> {
    /// `seq_length` must be non-zero; serving uses [`SEQ_LENGTH`].
    pub fn new(provider: &'a dyn HistoryProvider, seq_length: usize) -> Self {
        debug_assert!(seq_length > 0, "window length must be non-zero");
        Self {
            provider,
            seq_length,
        }
    }

    /// Range mode: one window and one target per trading day in
    /// `[start, end]`.
    ///
    /// History is fetched with a `2 * seq_length` calendar-day buffer before
    /// `start` to absorb non-trading days. The first fetched row at or after
    /// `start` anchors the slice; missing anchor rows are a
    /// [`ForecastError::DataAlignment`]. A slice that cannot reach the full
    /// lookback is degraded but non-fatal.
    pub async fn build_range(
        &self,
        symbol: &TickerSymbol,
        start: MarketDate,
        end: MarketDate,
    ) -> Result<RangeWindows, ForecastError> {
        let fetch_start = start.offset_days(-(self.seq_length as i64 * 2))?;
        tracing::debug!(
            ticker = %symbol,
            %fetch_start,
            fetch_end = %end,
            "fetching history with lookback buffer"
        );
        let history = self
            .provider
            .fetch_daily(HistoryRequest::new(symbol.clone(), fetch_start, end)?)
            .await?;

        let anchor = history
            .first_position_on_or_after(start)
            .ok_or(ForecastError::DataAlignment { start })?;

        if anchor < self.seq_length {
            tracing::warn!(
                ticker = %history.symbol(),
                available = anchor,
                requested = self.seq_length,
                "history before start date is shorter than the full lookback"
            );
        }
        let slice_start = anchor.saturating_sub(self.seq_length);
        let bars = &history.bars()[slice_start..];

        let data = close_matrix(bars);
        if data.nrows() <= self.seq_length {
            return Err(ForecastError::InsufficientHistory {
                have: data.nrows(),
                need: self.seq_length + 1,
            });
        }

        let (raw_windows, raw_targets) = sliding_windows(&data, self.seq_length);
        let target_dates: Vec<MarketDate> = bars
            .iter()
            .skip(self.seq_length)
            .map(|bar| bar.date)
            .collect();

        // One fit over every window value, shared by windows and targets.
        let scaler = MinMaxScaler::fit(raw_windows.iter().copied())?;
        let windows = raw_windows.mapv(|v| scaler.transform(v));
        let targets = raw_targets.mapv(|v| scaler.transform(v));

        Ok(RangeWindows {
            windows,
            targets,
            target_dates,
            scaler,
        })
    }

    /// Single-day mode: one window ending at or before `target`.
    ///
    /// Case A — `target` is a trading day in the fetched history: the
    /// window covers the `seq_length` rows before it and the observed close
    /// is returned as the actual. Case B — `target` is absent (future date
    /// or market holiday): the window is the most recent `seq_length` rows
    /// and there is no actual. Both modes answer through this one entry
    /// point; the branch is on data availability, never a caller flag.
    pub async fn build_single_day(
        &self,
        symbol: &TickerSymbol,
        target: MarketDate,
    ) -> Result<DayWindow, ForecastError> {
        let fetch_start = target.offset_days(-(self.seq_length as i64 * 2 + 10))?;
        let fetch_end = target.offset_days(5)?;
        let history = self
            .provider
            .fetch_daily(HistoryRequest::new(symbol.clone(), fetch_start, fetch_end)?)
            .await?;

        let (window_rows, actual, last_date) = self.select_day_window(&history, target)?;

        let scaler = MinMaxScaler::fit(window_rows.iter().copied())?;
        let window: Vec<f64> = window_rows.iter().map(|v| scaler.transform(*v)).collect();
        let last_value_norm = window[window.len() - 1];

        Ok(DayWindow {
            window,
            actual,
            scaler,
            last_date,
            last_value_norm,
        })
    }

    fn select_day_window(
        &self,
        history: &PriceHistory,
        target: MarketDate,
    ) -> Result<(Vec<f64>, Option<f64>, MarketDate), ForecastError> {
        let bars = history.bars();

        match history.position_of(target) {
            Some(position) => {
                if position < self.seq_length {
                    return Err(ForecastError::InsufficientHistory {
                        have: position,
                        need: self.seq_length,
                    });
                }
                let window = bars[position - self.seq_length..position]
                    .iter()
                    .map(|bar| bar.close)
                    .collect();
                let actual = Some(bars[position].close);
                let last_date = bars[position - 1].date;
                Ok((window, actual, last_date))
            }
            None => {
                if bars.len() < self.seq_length {
                    return Err(ForecastError::InsufficientHistory {
                        have: bars.len(),
                        need: self.seq_length,
                    });
                }
                let tail = &bars[bars.len() - self.seq_length..];
                let window = tail.iter().map(|bar| bar.close).collect();
                let last_date = tail[tail.len() - 1].date;
                Ok((window, None, last_date))
            }
        }
    }
}

/// Normalized window batch for range mode. Non-empty by construction.
#[derive(Debug, Clone)]
pub struct RangeWindows {
    pub windows: Array3<f64>,
    pub targets: Array1<f64>,
    pub target_dates: Vec<MarketDate>,
    pub scaler: MinMaxScaler,
}

impl RangeWindows {
    pub fn len(&self) -> usize {
        self.target_dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.target_dates.is_empty()
    }

    /// Model input tensor, shape `(batch, seq_length, features, 1)`.
    pub fn to_tensor(&self, device: &Device) -> candle_core::Result<Tensor> {
        let (batch, seq_length, features) = self.windows.dim();
        let data: Vec<f32> = self.windows.iter().map(|v| *v as f32).collect();
        Tensor::from_vec(data, (batch, seq_length, features, 1), device)
    }

    /// Close-feature column of the newest window, still normalized.
    pub fn last_window(&self) -> Vec<f64> {
        let batch = self.windows.shape()[0];
        self.windows
            .index_axis(Axis(0), batch - 1)
            .column(0)
            .iter()
            .copied()
            .collect()
    }

    /// Newest observed target, still normalized.
    pub fn last_target(&self) -> f64 {
        self.targets[self.targets.len() - 1]
    }

    /// Date of the newest observed target.
    pub fn last_date(&self) -> MarketDate {
        self.target_dates[self.target_dates.len() - 1]
    }
}

/// Normalized single window for single-day mode.
#[derive(Debug, Clone)]
pub struct DayWindow {
    /// Normalized closes, exactly `seq_length` long.
    pub window: Vec<f64>,
    /// Observed close at the target date, present only in Case A.
    pub actual: Option<f64>,
    pub scaler: MinMaxScaler,
    /// Date of the newest observation inside the window.
    pub last_date: MarketDate,
    /// Normalized value of the newest observation inside the window.
    pub last_value_norm: f64,
}

impl DayWindow {
    /// Model input tensor, shape `(1, seq_length, 1, 1)`.
    pub fn to_tensor(&self, device: &Device) -> candle_core::Result<Tensor> {
        let data: Vec<f32> = self.window.iter().map(|v| *v as f32).collect();
        Tensor::from_vec(data, (1, self.window.len(), 1, 1), device)
    }
}
