use thiserror::Error;

use tickcast_core::{MarketDate, ProviderError, ValidationError};
use tickcast_model::InferenceFailure;

/// Failures surfaced by the forecast pipeline.
///
/// Alignment and insufficiency are raised immediately and must reach the
/// response layer; inference failures are plain data at the single-step
/// boundary but fatal inside a multi-step forecast. Degraded-but-valid
/// outcomes (reduced lookback, missing actuals, empty forecast ranges) are
/// never errors.
#[derive(Debug, Error)]
pub enum ForecastError {
    #[error("requested start date {start} not found in fetched history")]
    DataAlignment { start: MarketDate },

    #[error("insufficient history: {have} rows for a window of {need}")]
    InsufficientHistory { have: usize, need: usize },

    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error(transparent)]
    Inference(#[from] InferenceFailure),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("tensor layout error: {0}")]
    Tensor(#[from] candle_core::Error),

    #[error("scaler requires at least one value to fit")]
    EmptyScalerFit,

    #[error("scaler input contains a non-finite value")]
    NonFiniteSample,
}
