use tracing::debug;
use vb_core::{cosine_similarity, Error, Result};

use crate::metadata::ArticleMetadata;

#[derive(Debug, Clone)]
struct StoredPoint {
    id: String,
    embedding: Vec<f32>,
    metadata: ArticleMetadata,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
    pub id: String,
    pub score: f32,
    pub metadata: ArticleMetadata,
}

/// Brute-force vector store kept in process memory.
#[derive(Debug)]
pub struct MemoryStore {
    collection: String,
    dimension: usize,
    points: Vec<StoredPoint>,
}

impl MemoryStore {
    pub fn new(collection: impl Into<String>, dimension: usize) -> Self {
        Self {
            collection: collection.into(),
            dimension,
            points: Vec::new(),
        }
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Insert a point, replacing any point with the same id.
    pub fn upsert(&mut self, id: impl Into<String>, embedding: &[f32], metadata: ArticleMetadata) -> Result<()> {
        self.check_dimension(embedding)?;
        let id = id.into();

        if let Some(existing) = self.points.iter_mut().find(|p| p.id == id) {
            existing.embedding = embedding.to_vec();
            existing.metadata = metadata;
        } else {
            debug!("Inserting point {} into {}", id, self.collection);
            self.points.push(StoredPoint {
                id,
                embedding: embedding.to_vec(),
                metadata,
            });
        }
        Ok(())
    }

    /// The `limit` points most similar to `embedding`, best first.
    pub fn query(&self, embedding: &[f32], limit: usize) -> Result<Vec<SearchHit>> {
        self.check_dimension(embedding)?;

        let mut scored: Vec<(f32, &StoredPoint)> = self
            .points
            .iter()
            .map(|point| (cosine_similarity(embedding, &point.embedding), point))
            .collect();
        scored.sort_by(|a, b| b.0.total_cmp(&a.0));

        Ok(scored
            .into_iter()
            .take(limit)
            .map(|(score, point)| SearchHit {
                id: point.id.clone(),
                score,
                metadata: point.metadata.clone(),
            })
            .collect())
    }

    fn check_dimension(&self, embedding: &[f32]) -> Result<()> {
        if embedding.len() != self.dimension {
            return Err(Error::Storage(format!(
                "vector of length {} does not fit collection '{}' of dimension {}",
                embedding.len(),
                self.collection,
                self.dimension
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::get_article_metadata;
    use crate::TargetFormat;
    use serde_json::json;
    use vb_core::Article;

    fn metadata(id: i64, title: &str) -> ArticleMetadata {
        let article: Article = serde_json::from_value(json!({
            "id": id,
            "item_title": title,
            "item_created_at": "2025-10-16"
        }))
        .unwrap();
        get_article_metadata(&article, &TargetFormat::Chroma).unwrap()
    }

    #[test]
    fn test_memory_store_ranks_by_similarity() {
        let mut store = MemoryStore::new("articles", 2);
        store.upsert("1", &[1.0, 0.0], metadata(1, "east")).unwrap();
        store.upsert("2", &[0.0, 1.0], metadata(2, "north")).unwrap();
        store.upsert("3", &[0.7, 0.7], metadata(3, "north-east")).unwrap();

        let hits = store.query(&[0.1, 1.0], 2).unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].id, "2");
        assert_eq!(hits[1].id, "3");
        assert!(hits[0].score >= hits[1].score);
        assert_eq!(hits[0].metadata.title, "north");
    }

    #[test]
    fn test_upsert_replaces_existing_id() {
        let mut store = MemoryStore::new("articles", 2);
        store.upsert("1", &[1.0, 0.0], metadata(1, "old")).unwrap();
        store.upsert("1", &[0.0, 1.0], metadata(1, "new")).unwrap();

        assert_eq!(store.len(), 1);
        let hits = store.query(&[0.0, 1.0], 5).unwrap();
        assert_eq!(hits[0].metadata.title, "new");
    }

    #[test]
    fn test_dimension_mismatch() {
        let mut store = MemoryStore::new("articles", 3);
        assert!(matches!(
            store.upsert("1", &[1.0], metadata(1, "short")),
            Err(Error::Storage(_))
        ));
        assert!(matches!(store.query(&[1.0, 2.0], 1), Err(Error::Storage(_))));
        assert!(store.is_empty());
    }
}
