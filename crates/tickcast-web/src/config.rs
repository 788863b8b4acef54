use std::path::PathBuf;

use clap::Parser;

/// Server configuration. Log filtering is controlled by the `TICKCAST_LOG`
/// environment variable.
#[derive(Debug, Parser)]
#[command(name = "tickcast-web", about = "Serve stock-price forecasts over HTTP")]
pub struct ServerConfig {
    /// Socket address to listen on.
    #[arg(long, default_value = "0.0.0.0:8080")]
    pub bind: String,

    /// Directory holding `model.json` and `model.safetensors`.
    #[arg(long)]
    pub model_dir: PathBuf,

    /// Serve deterministic fixture market data instead of calling the
    /// upstream. Useful for demos and smoke tests.
    #[arg(long)]
    pub offline: bool,
}
