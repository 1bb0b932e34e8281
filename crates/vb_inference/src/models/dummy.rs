use std::fmt;

use vb_core::{Embedding, EmbeddingModel, Result};

pub const DEFAULT_DIMENSION: usize = 384;

/// Offline model: a signed, hashed bag of words, unit-normalized.
///
/// Texts sharing words land close together, which is enough for ranking tests
/// and for benchmarking without a model server.
pub struct DummyModel {
    dimension: usize,
}

impl fmt::Debug for DummyModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DummyModel")
            .field("dimension", &self.dimension)
            .finish()
    }
}

impl DummyModel {
    pub fn new(dimension: Option<usize>) -> Self {
        Self {
            dimension: dimension.filter(|d| *d > 0).unwrap_or(DEFAULT_DIMENSION),
        }
    }
}

impl Default for DummyModel {
    fn default() -> Self {
        Self::new(None)
    }
}

// FNV-1a; stable across runs and platforms.
fn fnv1a(bytes: &[u8]) -> u64 {
    let mut hash: u64 = 0xcbf29ce484222325;
    for byte in bytes {
        hash ^= u64::from(*byte);
        hash = hash.wrapping_mul(0x100000001b3);
    }
    hash
}

impl EmbeddingModel for DummyModel {
    fn name(&self) -> &str {
        "dummy"
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn embed(&self, text: &str) -> Result<Embedding> {
        let mut embedding = vec![0.0f32; self.dimension];

        for word in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
        {
            let hash = fnv1a(word.to_lowercase().as_bytes());
            let index = (hash % self.dimension as u64) as usize;
            let sign = if hash >> 63 == 0 { 1.0 } else { -1.0 };
            embedding[index] += sign;
        }

        let norm = embedding.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > 0.0 {
            embedding.iter_mut().for_each(|v| *v /= norm);
        }
        Ok(embedding)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vb_core::cosine_similarity;

    #[test]
    fn test_dummy_model() {
        let model = DummyModel::default();
        let embedding = model.embed("Test text").unwrap();

        assert_eq!(embedding.len(), DEFAULT_DIMENSION);
        let norm = embedding.iter().map(|v| v * v).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_deterministic_and_case_insensitive() {
        let model = DummyModel::new(Some(64));
        assert_eq!(model.embed("Hiking trails").unwrap(), model.embed("hiking TRAILS").unwrap());
    }

    #[test]
    fn test_similar_texts_score_higher() {
        let model = DummyModel::default();
        let hiking = model.embed("hiking and outdoor adventures").unwrap();
        let outdoor = model.embed("outdoor hiking activities").unwrap();
        let cycling = model.embed("cycling race performance").unwrap();

        assert!(cosine_similarity(&hiking, &outdoor) > cosine_similarity(&hiking, &cycling));
    }

    #[test]
    fn test_empty_text_is_zero_vector() {
        let model = DummyModel::new(Some(8));
        assert_eq!(model.embed("").unwrap(), vec![0.0; 8]);
        assert_eq!(DummyModel::new(Some(0)).dimension(), DEFAULT_DIMENSION);
    }

    #[test]
    fn test_batch_preserves_order() {
        let model = DummyModel::new(Some(32));
        let batch = model.embed_batch(&["one", "two", "three"]).unwrap();
        assert_eq!(batch.len(), 3);
        assert_eq!(batch[1], model.embed("two").unwrap());
    }
}
