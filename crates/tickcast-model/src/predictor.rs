//! Single-step prediction boundary.
//!
//! Every failure inside the forward pass is captured into a structured
//! [`InferenceFailure`] value; nothing escapes this boundary as a panic.
//! Callers inspect the `Err` payload instead of handling a fault.

use std::backtrace::Backtrace;
use std::error::Error as StdError;
use std::fmt::{Display, Formatter};

use candle_core::{Tensor, D};
use serde::Serialize;

use crate::network::SequenceModel;

/// Structured inference failure: short message, root-cause details, and the
/// captured trace at the failure point.
#[derive(Debug, Clone, Serialize)]
pub struct InferenceFailure {
    pub message: String,
    pub details: String,
    pub trace: String,
}

impl InferenceFailure {
    fn capture(error: candle_core::Error) -> Self {
        let mut details = error.to_string();
        let mut source = error.source();
        while let Some(cause) = source {
            details.push_str("; caused by: ");
            details.push_str(&cause.to_string());
            source = cause.source();
        }

        Self {
            message: String::from("model inference failed"),
            details,
            trace: Backtrace::force_capture().to_string(),
        }
    }
}

impl Display for InferenceFailure {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.message, self.details)
    }
}

impl StdError for InferenceFailure {}

/// Run one forward pass over a normalized window batch.
///
/// `window` carries the pipeline's native shape `(batch, seq_len,
/// features, 1)`; the trailing singleton dimension is stripped before the
/// network sees it. Returns the flattened raw outputs, one value per batch
/// row. The pass is inference-only: no gradients are tracked.
pub fn run_inference(
    model: &dyn SequenceModel,
    window: &Tensor,
) -> Result<Vec<f64>, InferenceFailure> {
    infer(model, window).map_err(InferenceFailure::capture)
}

fn infer(model: &dyn SequenceModel, window: &Tensor) -> candle_core::Result<Vec<f64>> {
    let inputs = window.squeeze(D::Minus1)?;
    let outputs = model.forward(&inputs)?;
    let flat = outputs.flatten_all()?.to_vec1::<f32>()?;
    Ok(flat.into_iter().map(f64::from).collect())
}
