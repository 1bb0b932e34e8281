use std::sync::Arc;

use tracing::info;
use vb_core::{EmbeddingModel, Error, Result};

use crate::{InferenceConfig, ModelConfig};

pub mod dummy;
pub mod ollama;

pub use dummy::DummyModel;
pub use ollama::{OllamaModel, OllamaModelConfig};

pub const AVAILABLE_MODELS: [&str; 2] = ["dummy", "ollama"];

/// Build the embedding model named in `config`.
pub fn create_model(config: &InferenceConfig) -> Result<Arc<dyn EmbeddingModel>> {
    let model: Arc<dyn EmbeddingModel> = match config.model.to_lowercase().as_str() {
        "dummy" => Arc::new(DummyModel::new(config.dimension)),
        "ollama" => Arc::new(OllamaModel::new(OllamaModelConfig::from_inference_config(config))?),
        other => {
            return Err(Error::Inference(format!(
                "Unknown model: {}. Available models: {}",
                other,
                AVAILABLE_MODELS.join(", ")
            )))
        }
    };

    info!("🧠 Embedding model ready: {} ({} dimensions)", model.name(), model.dimension());
    Ok(model)
}
