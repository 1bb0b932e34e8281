use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use tracing::warn;

pub mod backends;
pub mod metadata;

pub use backends::*;
pub use metadata::{get_article_metadata, prepare_date_for_db, truthy, ArticleMetadata, DbDate, Tags};

/// How a target stores dates in metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateRepr {
    /// Integer seconds since the epoch; the target only filters on numbers.
    UnixTimestamp,
    /// The target has a native datetime type.
    Native,
    /// Rendered string.
    Text,
}

/// How strictly metadata values are coerced before they reach the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Coercion {
    /// Only strings, integers and booleans; lists are joined.
    Primitive,
    /// Values are handed over as loaded.
    Passthrough,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetadataSchema {
    pub date: DateRepr,
    pub coercion: Coercion,
}

/// The vector database whose metadata rules apply.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum TargetFormat {
    #[default]
    Generic,
    Chroma,
    Pinecone,
    Milvus,
    Qdrant,
    Weaviate,
    /// A name we have no rules for. Dates fall back to strings.
    Unknown(String),
}

impl TargetFormat {
    pub const KNOWN: [TargetFormat; 6] = [
        TargetFormat::Generic,
        TargetFormat::Chroma,
        TargetFormat::Pinecone,
        TargetFormat::Milvus,
        TargetFormat::Qdrant,
        TargetFormat::Weaviate,
    ];

    /// Resolve a database name. Unrecognized names are accepted and logged.
    pub fn from_name(name: &str) -> Self {
        let normalized = name.trim().to_ascii_lowercase();
        let target = match normalized.as_str() {
            "generic" => TargetFormat::Generic,
            "chroma" => TargetFormat::Chroma,
            "pinecone" => TargetFormat::Pinecone,
            "milvus" => TargetFormat::Milvus,
            "qdrant" => TargetFormat::Qdrant,
            "weaviate" => TargetFormat::Weaviate,
            _ => TargetFormat::Unknown(normalized),
        };
        if !target.is_known() {
            warn!("Unknown database type '{}', dates will be stored as strings", name);
        }
        target
    }

    pub fn name(&self) -> &str {
        match self {
            TargetFormat::Generic => "generic",
            TargetFormat::Chroma => "chroma",
            TargetFormat::Pinecone => "pinecone",
            TargetFormat::Milvus => "milvus",
            TargetFormat::Qdrant => "qdrant",
            TargetFormat::Weaviate => "weaviate",
            TargetFormat::Unknown(name) => name,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, TargetFormat::Unknown(_))
    }

    pub fn schema(&self) -> MetadataSchema {
        match self {
            TargetFormat::Chroma | TargetFormat::Pinecone | TargetFormat::Milvus => MetadataSchema {
                date: DateRepr::UnixTimestamp,
                coercion: Coercion::Primitive,
            },
            TargetFormat::Qdrant | TargetFormat::Weaviate | TargetFormat::Generic => MetadataSchema {
                date: DateRepr::Native,
                coercion: Coercion::Passthrough,
            },
            TargetFormat::Unknown(_) => MetadataSchema {
                date: DateRepr::Text,
                coercion: Coercion::Passthrough,
            },
        }
    }
}

impl FromStr for TargetFormat {
    type Err = Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self::from_name(s))
    }
}

impl fmt::Display for TargetFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

pub mod prelude {
    pub use super::backends::*;
    pub use super::metadata::*;
    pub use super::{Coercion, DateRepr, MetadataSchema, TargetFormat};
}
