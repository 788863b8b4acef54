use serde::{Deserialize, Serialize};

use crate::{MarketDate, TickerSymbol, ValidationError};

/// One daily observation. Close is the feature the forecast pipeline
/// consumes; the remaining OHLCV fields are carried when the source
/// provides them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyBar {
    pub date: MarketDate,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub close: f64,
    pub volume: Option<u64>,
}

impl DailyBar {
    pub fn new(
        date: MarketDate,
        open: Option<f64>,
        high: Option<f64>,
        low: Option<f64>,
        close: f64,
        volume: Option<u64>,
    ) -> Result<Self, ValidationError> {
        validate_non_negative("close", close)?;
        validate_optional_non_negative("open", open)?;
        validate_optional_non_negative("high", high)?;
        validate_optional_non_negative("low", low)?;

        if let (Some(high), Some(low)) = (high, low) {
            if high < low {
                return Err(ValidationError::InvalidBarRange);
            }
        }

        Ok(Self {
            date,
            open,
            high,
            low,
            close,
            volume,
        })
    }

    /// Close-only bar, the shape the forecast pipeline and fixtures use.
    pub fn close_only(date: MarketDate, close: f64) -> Result<Self, ValidationError> {
        Self::new(date, None, None, None, close, None)
    }
}

/// Ordered daily history for one ticker. Dates are strictly increasing with
/// no duplicates; the series may be empty (non-trading ranges, unknown
/// listing windows).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceHistory {
    symbol: TickerSymbol,
    bars: Vec<DailyBar>,
}

impl PriceHistory {
    pub fn new(symbol: TickerSymbol, bars: Vec<DailyBar>) -> Result<Self, ValidationError> {
        for (position, pair) in bars.windows(2).enumerate() {
            if pair[1].date <= pair[0].date {
                return Err(ValidationError::OutOfOrderBar {
                    position: position + 1,
                });
            }
        }

        Ok(Self { symbol, bars })
    }

    pub fn empty(symbol: TickerSymbol) -> Self {
        Self {
            symbol,
            bars: Vec::new(),
        }
    }

    pub fn symbol(&self) -> &TickerSymbol {
        &self.symbol
    }

    pub fn bars(&self) -> &[DailyBar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|bar| bar.close).collect()
    }

    pub fn dates(&self) -> Vec<MarketDate> {
        self.bars.iter().map(|bar| bar.date).collect()
    }

    pub fn last_date(&self) -> Option<MarketDate> {
        self.bars.last().map(|bar| bar.date)
    }

    /// Index of the first row whose date is `>= date`, if any.
    pub fn first_position_on_or_after(&self, date: MarketDate) -> Option<usize> {
        self.bars.iter().position(|bar| bar.date >= date)
    }

    /// Index of the row observed exactly on `date`, if it was a trading day.
    pub fn position_of(&self, date: MarketDate) -> Option<usize> {
        self.bars.iter().position(|bar| bar.date == date)
    }
}

fn validate_non_negative(field: &'static str, value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::NonFiniteValue { field });
    }
    if value < 0.0 {
        return Err(ValidationError::NegativeValue { field });
    }
    Ok(())
}

fn validate_optional_non_negative(
    field: &'static str,
    value: Option<f64>,
) -> Result<(), ValidationError> {
    if let Some(value) = value {
        validate_non_negative(field, value)?;
    }
    Ok(())
}
