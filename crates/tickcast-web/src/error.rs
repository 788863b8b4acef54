use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

use tickcast_core::{ProviderErrorKind, ValidationError};
use tickcast_forecast::ForecastError;

/// HTTP-facing error wrapper around the core taxonomies.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Forecast(#[from] ForecastError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            Self::Validation(error) => (
                StatusCode::BAD_REQUEST,
                json!({ "error": error.to_string(), "code": "request.invalid" }),
            ),
            Self::Forecast(error) => forecast_response(error),
        };

        (status, Json(body)).into_response()
    }
}

fn forecast_response(error: &ForecastError) -> (StatusCode, serde_json::Value) {
    match error {
        ForecastError::DataAlignment { .. } | ForecastError::InsufficientHistory { .. } => (
            StatusCode::UNPROCESSABLE_ENTITY,
            json!({ "error": error.to_string(), "code": "forecast.data" }),
        ),
        ForecastError::Provider(provider) => {
            let status = match provider.kind() {
                ProviderErrorKind::InvalidRequest => StatusCode::BAD_REQUEST,
                ProviderErrorKind::Unavailable | ProviderErrorKind::RateLimited => {
                    StatusCode::BAD_GATEWAY
                }
                ProviderErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
            };
            (
                status,
                json!({
                    "error": provider.message(),
                    "code": provider.code(),
                    "retryable": provider.retryable(),
                }),
            )
        }
        ForecastError::Inference(failure) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            json!({
                "error": failure.message,
                "details": failure.details,
                "trace": failure.trace,
                "code": "forecast.inference",
            }),
        ),
        _ => (
            StatusCode::INTERNAL_SERVER_ERROR,
            json!({ "error": error.to_string(), "code": "forecast.internal" }),
        ),
    }
}
