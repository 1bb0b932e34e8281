use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use tracing::info;

use crate::types::Article;
use crate::{Error, Result};

pub const DEFAULT_ARTICLES_PATH: &str = "sample_articles.json";

/// Load a JSON array of articles from disk.
pub fn load_articles(path: impl AsRef<Path>) -> Result<Vec<Article>> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(Error::ArticlesNotFound(path.to_path_buf()));
    }

    let reader = BufReader::new(File::open(path)?);
    let articles: Vec<Article> = serde_json::from_reader(reader)?;

    info!("📚 Loaded {} articles from {}", articles.len(), path.display());
    Ok(articles)
}
