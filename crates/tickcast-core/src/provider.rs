//! Historical-data provider contract.
//!
//! The forecast core consumes daily price history through this trait and
//! never talks to an upstream directly. Adapters own transport concerns,
//! including any retry policy; the core retries nothing.

use std::fmt::{Display, Formatter};
use std::future::Future;
use std::pin::Pin;

use crate::{MarketDate, PriceHistory, TickerSymbol, ValidationError};

/// Adapter-level error classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderErrorKind {
    InvalidRequest,
    Unavailable,
    RateLimited,
    Internal,
}

/// Structured provider error surfaced to the forecast core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderError {
    kind: ProviderErrorKind,
    message: String,
    retryable: bool,
}

impl ProviderError {
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self {
            kind: ProviderErrorKind::InvalidRequest,
            message: message.into(),
            retryable: false,
        }
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self {
            kind: ProviderErrorKind::Unavailable,
            message: message.into(),
            retryable: true,
        }
    }

    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self {
            kind: ProviderErrorKind::RateLimited,
            message: message.into(),
            retryable: true,
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            kind: ProviderErrorKind::Internal,
            message: message.into(),
            retryable: false,
        }
    }

    pub const fn kind(&self) -> ProviderErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn retryable(&self) -> bool {
        self.retryable
    }

    pub const fn code(&self) -> &'static str {
        match self.kind {
            ProviderErrorKind::InvalidRequest => "provider.invalid_request",
            ProviderErrorKind::Unavailable => "provider.unavailable",
            ProviderErrorKind::RateLimited => "provider.rate_limited",
            ProviderErrorKind::Internal => "provider.internal",
        }
    }
}

impl Display for ProviderError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.code())
    }
}

impl std::error::Error for ProviderError {}

impl From<ValidationError> for ProviderError {
    fn from(error: ValidationError) -> Self {
        Self::internal(error.to_string())
    }
}

/// Inclusive daily-history request: rows observed on `start` and `end`
/// belong to the response when those dates traded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryRequest {
    pub symbol: TickerSymbol,
    pub start: MarketDate,
    pub end: MarketDate,
}

impl HistoryRequest {
    pub fn new(
        symbol: TickerSymbol,
        start: MarketDate,
        end: MarketDate,
    ) -> Result<Self, ProviderError> {
        if start > end {
            return Err(ProviderError::invalid_request(
                ValidationError::InvertedDateRange {
                    start: start.format_calendar(),
                    end: end.format_calendar(),
                }
                .to_string(),
            ));
        }
        Ok(Self { symbol, start, end })
    }
}

/// Daily market-data source contract.
///
/// Implementations must be `Send + Sync`; the service shares one instance
/// across concurrent requests. An empty [`PriceHistory`] is a valid result —
/// callers decide whether that is fatal for their operation.
pub trait HistoryProvider: Send + Sync {
    /// Fetch daily bars for `[req.start, req.end]`.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError`] when the upstream is unreachable, rate
    /// limits the call, rejects the request, or returns an unparseable
    /// payload.
    fn fetch_daily<'a>(
        &'a self,
        req: HistoryRequest,
    ) -> Pin<Box<dyn Future<Output = Result<PriceHistory, ProviderError>> + Send + 'a>>;
}
