use std::fmt;

use anyhow::anyhow;
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use tracing::info;
use url::Url;

use vb_core::{Embedding, EmbeddingModel, Error, Result};

use crate::{InferenceConfig, ModelConfig};

const DEFAULT_URL: &str = "http://localhost:11434";
const DEFAULT_MODEL_NAME: &str = "nomic-embed-text";

#[derive(Debug, Clone, PartialEq)]
pub struct OllamaModelConfig {
    base_url: String,
    model_name: String,
}

impl Default for OllamaModelConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_URL.to_string(),
            model_name: DEFAULT_MODEL_NAME.to_string(),
        }
    }
}

impl ModelConfig for OllamaModelConfig {
    fn from_inference_config(config: &InferenceConfig) -> Self {
        let defaults = Self::default();
        let parsed = config
            .model_url
            .as_deref()
            .and_then(|url| Url::parse(url).ok());

        let Some(parsed) = parsed else {
            return Self {
                model_name: config.model_name.clone().unwrap_or(defaults.model_name),
                ..defaults
            };
        };

        let path_model = parsed.path().trim_matches('/').to_string();
        let base_url = match parsed.port() {
            Some(port) => format!(
                "{}://{}:{}",
                parsed.scheme(),
                parsed.host_str().unwrap_or("localhost"),
                port
            ),
            None => format!("{}://{}", parsed.scheme(), parsed.host_str().unwrap_or("localhost")),
        };

        let model_name = config
            .model_name
            .clone()
            .or_else(|| (!path_model.is_empty()).then_some(path_model))
            .unwrap_or(defaults.model_name);

        Self { base_url, model_name }
    }
}

impl OllamaModelConfig {
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn model_name(&self) -> &str {
        &self.model_name
    }
}

#[derive(Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    input: &'a [&'a str],
}

#[derive(Deserialize)]
struct EmbedResponse {
    embeddings: Vec<Embedding>,
}

/// Embeddings from an Ollama server's `/api/embed` endpoint.
pub struct OllamaModel {
    client: Client,
    config: OllamaModelConfig,
    dimension: usize,
}

impl fmt::Debug for OllamaModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OllamaModel")
            .field("client", &"<reqwest::blocking::Client>")
            .field("base_url", &self.config.base_url)
            .field("model_name", &self.config.model_name)
            .field("dimension", &self.dimension)
            .finish()
    }
}

impl OllamaModel {
    /// Connect and probe the vector length with a short request.
    pub fn new(config: OllamaModelConfig) -> Result<Self> {
        let mut model = Self {
            client: Client::new(),
            config,
            dimension: 0,
        };

        let probe = model.request(&["test"]).map_err(|e| {
            Error::External(anyhow!(
                "Ollama is not available at {}: {}. Please ensure Ollama is running and the model '{}' is installed.",
                model.config.base_url,
                e,
                model.config.model_name
            ))
        })?;
        model.dimension = probe.first().map(Vec::len).unwrap_or_default();
        if model.dimension == 0 {
            return Err(Error::Inference(format!(
                "model '{}' returned an empty embedding",
                model.config.model_name
            )));
        }

        info!(
            "🧠 Connected to Ollama at {} (model {}, {} dimensions)",
            model.config.base_url, model.config.model_name, model.dimension
        );
        Ok(model)
    }

    fn request(&self, texts: &[&str]) -> Result<Vec<Embedding>> {
        let request = EmbedRequest {
            model: &self.config.model_name,
            input: texts,
        };

        let response = self
            .client
            .post(format!("{}/api/embed", self.config.base_url))
            .json(&request)
            .send()?
            .error_for_status()?
            .json::<EmbedResponse>()?;

        if response.embeddings.len() != texts.len() {
            return Err(Error::Inference(format!(
                "expected {} embeddings, got {}",
                texts.len(),
                response.embeddings.len()
            )));
        }
        Ok(response.embeddings)
    }
}

impl EmbeddingModel for OllamaModel {
    fn name(&self) -> &str {
        &self.config.model_name
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn embed(&self, text: &str) -> Result<Embedding> {
        self.request(&[text])?
            .pop()
            .ok_or_else(|| Error::Inference("empty embedding response".to_string()))
    }

    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Embedding>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        self.request(texts)
    }
}
