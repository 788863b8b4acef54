//! Versioned on-disk model artifact: a JSON descriptor next to a
//! safetensors weight file. Device placement is an explicit load
//! parameter, never a property of the serialized bytes.

use std::fs::File;
use std::path::Path;

use candle_core::{DType, Device, Tensor};
use candle_nn::{VarBuilder, VarMap};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::network::{LstmSpec, PriceLstm, SequenceModel};

pub const ARTIFACT_FORMAT_VERSION: u32 = 1;
pub const DESCRIPTOR_FILE: &str = "model.json";
pub const WEIGHTS_FILE: &str = "model.safetensors";

/// Errors raised while reading or writing a model artifact.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("artifact io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("artifact descriptor error: {0}")]
    Descriptor(#[from] serde_json::Error),

    #[error("unsupported artifact format version {found}, expected {expected}")]
    UnsupportedFormatVersion { found: u32, expected: u32 },

    #[error("weights error: {0}")]
    Weights(#[from] candle_core::Error),
}

/// Architecture descriptor stored as `model.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelDescriptor {
    pub format_version: u32,
    pub model_version: String,
    pub network: LstmSpec,
}

impl ModelDescriptor {
    pub fn new(model_version: impl Into<String>, network: LstmSpec) -> Self {
        Self {
            format_version: ARTIFACT_FORMAT_VERSION,
            model_version: model_version.into(),
            network,
        }
    }
}

/// A ready-to-serve network plus the descriptor it was built from.
///
/// Loading is the readiness call: the returned handle is immutable and
/// shareable across requests. Loading the same artifact again yields a
/// network with identical behavior.
#[derive(Debug)]
pub struct LoadedModel {
    network: PriceLstm,
    descriptor: ModelDescriptor,
}

impl LoadedModel {
    /// Load an artifact directory onto `device`.
    pub fn load(dir: &Path, device: &Device) -> Result<Self, ModelError> {
        let descriptor: ModelDescriptor =
            serde_json::from_reader(File::open(dir.join(DESCRIPTOR_FILE))?)?;

        if descriptor.format_version != ARTIFACT_FORMAT_VERSION {
            return Err(ModelError::UnsupportedFormatVersion {
                found: descriptor.format_version,
                expected: ARTIFACT_FORMAT_VERSION,
            });
        }

        let weights = dir.join(WEIGHTS_FILE);
        // SAFETY: the weight file is memory-mapped read-only and must not be
        // mutated while the model is alive.
        let vb =
            unsafe { VarBuilder::from_mmaped_safetensors(&[weights], DType::F32, device)? };
        let network = PriceLstm::new(&descriptor.network, vb)?;

        Ok(Self {
            network,
            descriptor,
        })
    }

    /// Initialize a fresh artifact with randomly-initialized weights and
    /// write it to `dir`. Used by offline tooling and tests; serving always
    /// goes through [`LoadedModel::load`].
    pub fn create(
        dir: &Path,
        descriptor: ModelDescriptor,
        device: &Device,
    ) -> Result<Self, ModelError> {
        let varmap = VarMap::new();
        let vb = VarBuilder::from_varmap(&varmap, DType::F32, device);
        let network = PriceLstm::new(&descriptor.network, vb)?;

        std::fs::create_dir_all(dir)?;
        serde_json::to_writer_pretty(File::create(dir.join(DESCRIPTOR_FILE))?, &descriptor)?;
        varmap.save(dir.join(WEIGHTS_FILE))?;

        Ok(Self {
            network,
            descriptor,
        })
    }

    pub fn version(&self) -> &str {
        &self.descriptor.model_version
    }

    pub fn descriptor(&self) -> &ModelDescriptor {
        &self.descriptor
    }
}

impl SequenceModel for LoadedModel {
    fn forward(&self, inputs: &Tensor) -> candle_core::Result<Tensor> {
        self.network.forward(inputs)
    }
}
