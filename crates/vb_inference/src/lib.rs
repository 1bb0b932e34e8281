use std::env;

pub mod embeddings;
pub mod models;

pub const DEFAULT_MODEL: &str = "dummy";

/// Where embeddings come from.
///
/// Built from the environment, then overridden by whatever the caller passes
/// on the command line.
#[derive(Debug, Clone, PartialEq)]
pub struct InferenceConfig {
    /// Backend name, `dummy` or `ollama`.
    pub model: String,
    /// Base URL of the embedding server. A path component names the model,
    /// e.g. `http://localhost:11434/nomic-embed-text`.
    pub model_url: Option<String>,
    /// Model name on the server; wins over one given in `model_url`.
    pub model_name: Option<String>,
    /// Vector length for backends that do not report their own.
    pub dimension: Option<usize>,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            model_url: None,
            model_name: None,
            dimension: None,
        }
    }
}

impl InferenceConfig {
    /// Read `VECBENCH_MODEL`, `OLLAMA_URL`, `VECBENCH_EMBED_MODEL` and
    /// `VECBENCH_DIMENSION`.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            model: env::var("VECBENCH_MODEL").unwrap_or(defaults.model),
            model_url: env::var("OLLAMA_URL").ok(),
            model_name: env::var("VECBENCH_EMBED_MODEL").ok(),
            dimension: env::var("VECBENCH_DIMENSION")
                .ok()
                .and_then(|d| d.parse().ok()),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_model_url(mut self, url: impl Into<String>) -> Self {
        self.model_url = Some(url.into());
        self
    }

    pub fn with_model_name(mut self, name: impl Into<String>) -> Self {
        self.model_name = Some(name.into());
        self
    }

    pub fn with_dimension(mut self, dimension: usize) -> Self {
        self.dimension = Some(dimension);
        self
    }
}

/// Per-backend settings derived from an [`InferenceConfig`].
pub trait ModelConfig {
    fn from_inference_config(config: &InferenceConfig) -> Self;
}

pub mod prelude {
    pub use super::embeddings::EmbeddingGenerator;
    pub use super::models::create_model;
    pub use super::{InferenceConfig, ModelConfig};
    pub use vb_core::{Article, EmbeddingModel, Error, Result};
}

pub use embeddings::EmbeddingGenerator;
pub use models::create_model;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_overrides() {
        let config = InferenceConfig::default()
            .with_model("ollama")
            .with_model_url("http://localhost:11434")
            .with_model_name("nomic-embed-text")
            .with_dimension(768);

        assert_eq!(config.model, "ollama");
        assert_eq!(config.model_url.as_deref(), Some("http://localhost:11434"));
        assert_eq!(config.model_name.as_deref(), Some("nomic-embed-text"));
        assert_eq!(config.dimension, Some(768));
    }

    #[test]
    fn test_inference_pipeline() {
        let model = create_model(&InferenceConfig::default()).unwrap();
        let generator = EmbeddingGenerator::new(model);
        assert_eq!(generator.embed("pipeline").unwrap().len(), generator.dimension());
    }
}
