//! # tickcast-forecast
//!
//! The forecast pipeline: align fetched daily history to a requested date
//! window, build fixed-length normalized input sequences, run the sequence
//! model, and — for targets beyond observed history — advance the model
//! recursively one business day at a time.
//!
//! ## Components
//!
//! | Module | Responsibility |
//! |--------|----------------|
//! | [`features`] | Close-price extraction and sliding windows |
//! | [`scaler`] | Per-request min-max normalization |
//! | [`window`] | Range and single-day window construction |
//! | [`recursive`] | Multi-step forecasting by feedback |
//! | [`report`] | Response assembly with backtest/forecast classification |
//! | [`service`] | Request orchestration over provider + model |
//!
//! Everything here is request-local; the only process-wide state is the
//! loaded model handle injected into [`ForecastService`].

pub mod error;
pub mod features;
pub mod recursive;
pub mod report;
pub mod scaler;
pub mod service;
pub mod window;

pub use error::ForecastError;
pub use recursive::recursive_forecast;
pub use report::{ForecastReport, PeriodKind, PredictionRecord, ReportBuilder, ReportKind, ReportMetadata};
pub use scaler::MinMaxScaler;
pub use service::ForecastService;
pub use window::{DayWindow, RangeWindows, WindowBuilder, SEQ_LENGTH};
