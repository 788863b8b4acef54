//! Sequence network: stacked LSTM layers, dropout on the final hidden
//! state, and a linear head producing one value per batch row.

use candle_core::{Result, Tensor};
use candle_nn::{linear, lstm, Dropout, LSTMConfig, Linear, Module, VarBuilder, LSTM, RNN};
use serde::{Deserialize, Serialize};

/// Seam between the forecast pipeline and the loaded network. Tests
/// substitute constant fakes; production passes the artifact-backed
/// [`PriceLstm`].
pub trait SequenceModel: Send + Sync {
    /// Forward pass. Input shape `(batch, seq_len, input_size)`, output
    /// shape `(batch, output_size)`.
    fn forward(&self, inputs: &Tensor) -> Result<Tensor>;
}

/// Network hyperparameters, persisted verbatim in the artifact descriptor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LstmSpec {
    pub input_size: usize,
    pub hidden_size: usize,
    pub num_layers: usize,
    pub output_size: usize,
    pub dropout: f32,
}

impl Default for LstmSpec {
    fn default() -> Self {
        // Close-only feature in, one predicted price out.
        Self {
            input_size: 1,
            hidden_size: 64,
            num_layers: 2,
            output_size: 1,
            dropout: 0.2,
        }
    }
}

/// Inference-only LSTM price model. Dropout is carried so artifacts keep
/// their training-time hyperparameters, but it stays inactive here.
#[derive(Debug)]
pub struct PriceLstm {
    layers: Vec<LSTM>,
    dropout: Dropout,
    head: Linear,
}

impl PriceLstm {
    pub fn new(spec: &LstmSpec, vb: VarBuilder) -> Result<Self> {
        let mut layers = Vec::with_capacity(spec.num_layers);
        for layer_idx in 0..spec.num_layers {
            let in_dim = if layer_idx == 0 {
                spec.input_size
            } else {
                spec.hidden_size
            };
            let config = LSTMConfig {
                layer_idx,
                ..Default::default()
            };
            layers.push(lstm(in_dim, spec.hidden_size, config, vb.pp("lstm"))?);
        }

        Ok(Self {
            layers,
            dropout: Dropout::new(spec.dropout),
            head: linear(spec.hidden_size, spec.output_size, vb.pp("fc"))?,
        })
    }
}

impl SequenceModel for PriceLstm {
    fn forward(&self, inputs: &Tensor) -> Result<Tensor> {
        let mut xs = inputs.clone();
        for layer in &self.layers {
            let states = layer.seq(&xs)?;
            xs = layer.states_to_tensor(&states)?;
        }

        let (_batch, seq_len, _hidden) = xs.dims3()?;
        let last = xs.narrow(1, seq_len - 1, 1)?.squeeze(1)?;
        let last = self.dropout.forward(&last, false)?;
        self.head.forward(&last)
    }
}
