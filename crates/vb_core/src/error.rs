use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Could not parse date string: {0}")]
    DateParse(String),

    #[error("Invalid date format pattern: {0}")]
    InvalidDateFormat(String),

    #[error("Articles file not found: {}", .0.display())]
    ArticlesNotFound(PathBuf),

    #[error("Cannot coerce field '{field}' from {value}")]
    TypeCoercion { field: &'static str, value: String },

    #[error("Inference error: {0}")]
    Inference(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("External error: {0}")]
    External(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
