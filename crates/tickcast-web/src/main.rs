mod config;
mod error;
mod routes;
mod state;

use std::process::ExitCode;
use std::sync::Arc;

use candle_core::Device;
use clap::Parser;
use thiserror::Error;
use tracing::info;
use tracing_subscriber::EnvFilter;

use tickcast_core::{ReqwestHttpClient, YahooHistoryProvider};
use tickcast_forecast::ForecastService;
use tickcast_model::{LoadedModel, ModelError};

use crate::config::ServerConfig;
use crate::state::AppState;

#[derive(Debug, Error)]
enum StartupError {
    #[error("failed to load model artifact: {0}")]
    Model(#[from] ModelError),

    #[error("server io error: {0}")]
    Io(#[from] std::io::Error),
}

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("error: {error}");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), StartupError> {
    let config = ServerConfig::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("TICKCAST_LOG")
                .unwrap_or_else(|_| EnvFilter::new("tickcast=info,tower_http=warn")),
        )
        .init();

    // The model is loaded exactly once; the handle is read-only for the
    // life of the process.
    let device = Device::Cpu;
    let model = LoadedModel::load(&config.model_dir, &device)?;
    info!(version = model.version(), dir = %config.model_dir.display(), "model loaded");

    let provider = if config.offline {
        info!("serving fixture market data (offline mode)");
        Arc::new(YahooHistoryProvider::default())
    } else {
        Arc::new(YahooHistoryProvider::with_http_client(Arc::new(
            ReqwestHttpClient::new(),
        )))
    };

    let version = model.version().to_owned();
    let service = ForecastService::new(provider, Arc::new(model), version).with_device(device);

    let app = routes::router(AppState {
        service: Arc::new(service),
    });

    let listener = tokio::net::TcpListener::bind(&config.bind).await?;
    info!(addr = %config.bind, "listening");
    axum::serve(listener, app).await?;

    Ok(())
}
