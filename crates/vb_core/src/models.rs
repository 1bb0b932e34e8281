use std::fmt;

use crate::Result;

pub type Embedding = Vec<f32>;

/// A text embedding backend.
///
/// Implementations are constructed once and shared behind an `Arc`; calls are
/// made sequentially from a single thread.
pub trait EmbeddingModel: Send + Sync + fmt::Debug {
    fn name(&self) -> &str;

    /// Length of every vector this model produces.
    fn dimension(&self) -> usize;

    /// Generate embeddings for a piece of text
    fn embed(&self, text: &str) -> Result<Embedding>;

    /// Embeddings for several texts, in input order.
    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Embedding>> {
        texts.iter().map(|text| self.embed(text)).collect()
    }
}

/// Cosine similarity of two equal-length vectors; zero when either is all zeros.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    debug_assert_eq!(a.len(), b.len());
    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;
    for (x, y) in a.iter().zip(b) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    let denom = norm_a.sqrt() * norm_b.sqrt();
    if denom == 0.0 {
        0.0
    } else {
        dot / denom
    }
}
