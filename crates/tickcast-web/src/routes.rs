use axum::extract::State;
use axum::http::HeaderValue;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use tickcast_core::{MarketDate, TickerSymbol};

use crate::error::ApiError;
use crate::state::AppState;

/// Single-date forecast request.
#[derive(Debug, Deserialize)]
pub struct DayForecastRequest {
    pub ticker: String,
    pub target_date: String,
}

/// Inclusive date-range forecast request.
#[derive(Debug, Deserialize)]
pub struct RangeForecastRequest {
    pub ticker: String,
    pub init_date: String,
    pub end_date: String,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/v1/predictions/day", post(forecast_day))
        .route("/api/v1/predictions/range", post(forecast_range))
        .route("/api/healthz", get(healthz))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn forecast_day(
    State(state): State<AppState>,
    Json(request): Json<DayForecastRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let ticker = TickerSymbol::parse(&request.ticker)?;
    let target = MarketDate::parse(&request.target_date)?;

    let report = state.service.forecast_day(ticker, target).await?;
    Ok(with_request_id(Json(report)))
}

async fn forecast_range(
    State(state): State<AppState>,
    Json(request): Json<RangeForecastRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let ticker = TickerSymbol::parse(&request.ticker)?;
    let start = MarketDate::parse(&request.init_date)?;
    let end = MarketDate::parse(&request.end_date)?;

    let report = state.service.forecast_range(ticker, start, end).await?;
    Ok(with_request_id(Json(report)))
}

async fn healthz(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "model_version": state.service.model_version(),
    }))
}

fn with_request_id(response: impl IntoResponse) -> impl IntoResponse {
    let request_id = Uuid::new_v4().to_string();
    let value = HeaderValue::from_str(&request_id)
        .unwrap_or_else(|_| HeaderValue::from_static("unassigned"));
    ([("x-request-id", value)], response)
}
