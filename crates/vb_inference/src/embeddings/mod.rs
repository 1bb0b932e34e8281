use std::sync::Arc;

use tracing::{debug, info};
use vb_core::{Article, Embedding, EmbeddingModel, Error, Result};

/// Body text beyond this many characters is left out of article embeddings.
pub const MAX_BODY_CHARS: usize = 2000;
pub const DEFAULT_BATCH_SIZE: usize = 32;

/// The text an article is embedded as: labeled title, subtitle and
/// (truncated) body, one per line. Empty fields are skipped.
pub fn article_text(article: &Article) -> String {
    let mut parts = Vec::with_capacity(3);

    if !article.title.is_empty() {
        parts.push(format!("Title: {}", article.title));
    }
    if !article.subtitle.is_empty() {
        parts.push(format!("Subtitle: {}", article.subtitle));
    }
    if let Some(body) = article.body_content.as_deref().filter(|b| !b.is_empty()) {
        let body: String = body.chars().take(MAX_BODY_CHARS).collect();
        parts.push(format!("Content: {}", body));
    }

    parts.join("\n")
}

/// Front end to an embedding model that checks vector lengths and knows how
/// to turn articles into text.
#[derive(Debug, Clone)]
pub struct EmbeddingGenerator {
    model: Arc<dyn EmbeddingModel>,
    batch_size: usize,
}

impl EmbeddingGenerator {
    pub fn new(model: Arc<dyn EmbeddingModel>) -> Self {
        Self {
            model,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    pub fn dimension(&self) -> usize {
        self.model.dimension()
    }

    pub fn model_name(&self) -> &str {
        self.model.name()
    }

    pub fn embed(&self, text: &str) -> Result<Embedding> {
        let embedding = self.model.embed(text)?;
        self.check(&embedding)?;
        Ok(embedding)
    }

    /// Embed texts in batches, preserving input order.
    pub fn embed_batch(&self, texts: &[&str], show_progress: bool) -> Result<Vec<Embedding>> {
        let batches: Vec<&[&str]> = texts.chunks(self.batch_size).collect();
        let mut embeddings = Vec::with_capacity(texts.len());

        for (index, batch) in batches.iter().enumerate() {
            if show_progress {
                info!("Generating embeddings for batch {} of {}", index + 1, batches.len());
            }
            let generated = self.model.embed_batch(batch)?;
            if generated.len() != batch.len() {
                return Err(Error::Inference(format!(
                    "model returned {} embeddings for a batch of {}",
                    generated.len(),
                    batch.len()
                )));
            }
            for embedding in &generated {
                self.check(embedding)?;
            }
            embeddings.extend(generated);
        }

        Ok(embeddings)
    }

    pub fn embed_article(&self, article: &Article) -> Result<Embedding> {
        let text = article_text(article);
        debug!("Embedding article {} ({} chars)", article.id, text.chars().count());
        self.embed(&text)
    }

    fn check(&self, embedding: &[f32]) -> Result<()> {
        if embedding.len() != self.dimension() {
            return Err(Error::Inference(format!(
                "{} produced a vector of length {}, expected {}",
                self.model_name(),
                embedding.len(),
                self.dimension()
            )));
        }
        Ok(())
    }
}
