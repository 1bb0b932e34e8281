use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// An article as exported by the content pipeline.
///
/// `id` and `evergreen` are kept as raw JSON because exports are not
/// consistent about their types; the metadata adapter decides how strictly
/// to coerce them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    #[serde(default)]
    pub id: Value,
    #[serde(rename = "item_source", alias = "source", default, deserialize_with = "nullable")]
    pub source: String,
    #[serde(rename = "item_title", alias = "title", default, deserialize_with = "nullable")]
    pub title: String,
    #[serde(rename = "item_subtitle", alias = "subtitle", default, deserialize_with = "nullable")]
    pub subtitle: String,
    #[serde(rename = "category_name", alias = "category", default, deserialize_with = "nullable")]
    pub category: String,
    #[serde(rename = "item_url", alias = "url", default, deserialize_with = "nullable")]
    pub url: String,
    #[serde(rename = "denormalized_tags", alias = "tags", default, deserialize_with = "nullable")]
    pub tags: Vec<String>,
    #[serde(default = "default_evergreen")]
    pub evergreen: Value,
    #[serde(rename = "item_created_at", alias = "created_at", default, deserialize_with = "nullable")]
    pub created_at: DateInput,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body_content: Option<String>,
}

impl Default for Article {
    fn default() -> Self {
        Self {
            id: Value::Null,
            source: String::new(),
            title: String::new(),
            subtitle: String::new(),
            category: String::new(),
            url: String::new(),
            tags: Vec::new(),
            evergreen: default_evergreen(),
            created_at: DateInput::default(),
            body_content: None,
        }
    }
}

/// A date as it may arrive from a record or a caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DateInput {
    Text(String),
    Timestamp(i64),
    DateTime(DateTime<FixedOffset>),
}

impl Default for DateInput {
    fn default() -> Self {
        DateInput::Text(String::new())
    }
}

impl From<&str> for DateInput {
    fn from(value: &str) -> Self {
        DateInput::Text(value.to_string())
    }
}

impl From<String> for DateInput {
    fn from(value: String) -> Self {
        DateInput::Text(value)
    }
}

impl From<i64> for DateInput {
    fn from(value: i64) -> Self {
        DateInput::Timestamp(value)
    }
}

impl From<DateTime<FixedOffset>> for DateInput {
    fn from(value: DateTime<FixedOffset>) -> Self {
        DateInput::DateTime(value)
    }
}

fn default_evergreen() -> Value {
    Value::Bool(false)
}

// Exports write `null` for absent strings, lists and dates.
fn nullable<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
