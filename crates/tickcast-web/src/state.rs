use std::sync::Arc;

use tickcast_forecast::ForecastService;

/// Shared, read-only application state. The service (and the model handle
/// inside it) is built once at startup and never mutated afterwards, so
/// concurrent requests borrow it freely.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<ForecastService>,
}
