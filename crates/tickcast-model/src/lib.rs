//! # tickcast-model
//!
//! The sequence network and its serving boundary:
//!
//! - [`PriceLstm`] — stacked LSTM + dropout + linear head (candle)
//! - [`SequenceModel`] — the seam the forecast pipeline depends on, so
//!   tests can substitute fakes without touching globals
//! - [`LoadedModel`] — versioned artifact (JSON descriptor + safetensors
//!   weights), loaded once at startup onto an explicit device
//! - [`run_inference`] — single-step predictor with structured failure
//!   capture

pub mod artifact;
pub mod network;
pub mod predictor;

pub use artifact::{LoadedModel, ModelDescriptor, ModelError, ARTIFACT_FORMAT_VERSION};
pub use network::{LstmSpec, PriceLstm, SequenceModel};
pub use predictor::{run_inference, InferenceFailure};
