pub mod dates;
pub mod error;
pub mod loader;
pub mod models;
pub mod types;

pub use error::{Error, Result};
pub use loader::load_articles;
pub use models::{cosine_similarity, Embedding, EmbeddingModel};
pub use types::{Article, DateInput};
