//! # tickcast-core
//!
//! Domain contracts and market-data access for the tickcast forecast
//! service.
//!
//! ## Overview
//!
//! - **Domain models** for tickers, calendar dates, daily bars, and price
//!   history, with validation at construction
//! - **Provider contract** ([`HistoryProvider`]) the forecast core fetches
//!   daily history through
//! - **HTTP transport abstraction** with a reqwest-backed production client
//!   and a no-op client for deterministic offline runs
//! - **Yahoo chart adapter** implementing the provider contract
//!
//! Retry policy lives inside adapters; the forecast core never retries.
//! API access needs no key for the chart endpoint; nothing secret is read
//! or logged here.

pub mod adapters;
pub mod domain;
pub mod error;
pub mod http_client;
pub mod provider;

pub use adapters::YahooHistoryProvider;
pub use domain::{DailyBar, MarketDate, PriceHistory, TickerSymbol};
pub use error::ValidationError;
pub use http_client::{
    HttpClient, HttpError, HttpRequest, HttpResponse, NoopHttpClient, ReqwestHttpClient,
};
pub use provider::{HistoryProvider, HistoryRequest, ProviderError, ProviderErrorKind};
