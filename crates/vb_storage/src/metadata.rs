//! Shaping article records into the metadata payload a vector database accepts.

use chrono::{DateTime, FixedOffset};
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::debug;

use vb_core::dates::{
    date_string_to_timestamp, datetime_to_timestamp, to_datetime, DEFAULT_TIMESTAMP_FORMAT,
};
use vb_core::{Article, DateInput, Error, Result};

use crate::{Coercion, DateRepr, TargetFormat};

/// A date in the representation a target stores.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum DbDate {
    Timestamp(i64),
    DateTime(DateTime<FixedOffset>),
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Tags {
    List(Vec<String>),
    /// Comma-separated, for targets without array-valued metadata.
    Joined(String),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArticleMetadata {
    pub id: Value,
    pub source: String,
    pub title: String,
    pub subtitle: String,
    pub category: String,
    pub tags: Tags,
    pub evergreen: Value,
    pub url: String,
    pub created_at: DbDate,
}

impl ArticleMetadata {
    /// The payload as a JSON object, keyed like the stored metadata.
    pub fn to_json(&self) -> Result<Map<String, Value>> {
        match serde_json::to_value(self)? {
            Value::Object(map) => Ok(map),
            other => Err(Error::Storage(format!("metadata serialized to {}", other))),
        }
    }

    /// True when no value is a list or an object.
    pub fn is_flat(&self) -> bool {
        let scalar = |value: &Value| !matches!(value, Value::Array(_) | Value::Object(_));
        matches!(self.tags, Tags::Joined(_)) && scalar(&self.id) && scalar(&self.evergreen)
    }
}

pub fn prepare_date_for_db(value: &DateInput, target: &TargetFormat) -> Result<DbDate> {
    match target.schema().date {
        DateRepr::UnixTimestamp => {
            let timestamp = match value {
                DateInput::Timestamp(ts) => *ts,
                DateInput::Text(s) => date_string_to_timestamp(s)?,
                DateInput::DateTime(dt) => datetime_to_timestamp(dt),
            };
            Ok(DbDate::Timestamp(timestamp))
        }
        DateRepr::Native => to_datetime(value).map(DbDate::DateTime),
        DateRepr::Text => Ok(DbDate::Text(match value {
            DateInput::DateTime(dt) => dt.format(DEFAULT_TIMESTAMP_FORMAT).to_string(),
            DateInput::Text(s) => s.clone(),
            DateInput::Timestamp(ts) => ts.to_string(),
        })),
    }
}

/// Build the metadata stored next to an article's embedding.
pub fn get_article_metadata(article: &Article, target: &TargetFormat) -> Result<ArticleMetadata> {
    let created_at = prepare_date_for_db(&article.created_at, target)?;

    let metadata = match target.schema().coercion {
        Coercion::Primitive => ArticleMetadata {
            id: Value::from(coerce_int("id", &article.id)?),
            source: article.source.clone(),
            title: article.title.clone(),
            subtitle: article.subtitle.clone(),
            category: article.category.clone(),
            tags: Tags::Joined(article.tags.join(", ")),
            evergreen: Value::Bool(truthy(&article.evergreen)),
            url: article.url.clone(),
            created_at,
        },
        Coercion::Passthrough => ArticleMetadata {
            id: article.id.clone(),
            source: article.source.clone(),
            title: article.title.clone(),
            subtitle: article.subtitle.clone(),
            category: article.category.clone(),
            tags: Tags::List(article.tags.clone()),
            evergreen: article.evergreen.clone(),
            url: article.url.clone(),
            created_at,
        },
    };

    debug!("Prepared {} metadata for article {}", target, metadata.id);
    Ok(metadata)
}

// Integers, numeric strings, whole-or-fractional numbers (truncated) and
// booleans convert; anything else is rejected.
fn coerce_int(field: &'static str, value: &Value) -> Result<i64> {
    let converted = match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_u64().and_then(|u| i64::try_from(u).ok()))
            .or_else(|| {
                n.as_f64()
                    .filter(|f| f.is_finite() && f.abs() < i64::MAX as f64)
                    .map(|f| f.trunc() as i64)
            }),
        Value::String(s) => s.trim().replace('_', "").parse::<i64>().ok(),
        Value::Bool(b) => Some(i64::from(*b)),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    };
    converted.ok_or_else(|| Error::TypeCoercion {
        field,
        value: value.to_string(),
    })
}

/// Truthiness of a loosely typed JSON flag: `null`, `false`, zero and empty
/// values are false.
pub fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(false, |f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    fn sample_article() -> Article {
        serde_json::from_value(json!({
            "id": "5",
            "item_source": "blog",
            "item_title": "Ridge walk",
            "item_subtitle": "A short one",
            "category_name": "outdoors",
            "item_url": "https://example.com/5",
            "denormalized_tags": ["a", "b"],
            "evergreen": 1,
            "item_created_at": "2025-10-16T14:09:00Z"
        }))
        .unwrap()
    }

    #[test]
    fn test_numeric_targets_get_timestamps() {
        for target in [TargetFormat::Chroma, TargetFormat::Pinecone, TargetFormat::Milvus] {
            let date = prepare_date_for_db(&"2025-10-16T14:09:00Z".into(), &target).unwrap();
            assert_eq!(date, DbDate::Timestamp(1760630940));

            let date = prepare_date_for_db(&DateInput::Timestamp(42), &target).unwrap();
            assert_eq!(date, DbDate::Timestamp(42));

            let dt = Utc.with_ymd_and_hms(2025, 10, 16, 14, 9, 0).unwrap().fixed_offset();
            let date = prepare_date_for_db(&dt.into(), &target).unwrap();
            assert_eq!(date, DbDate::Timestamp(1760630940));
        }
    }

    #[test]
    fn test_native_targets_get_datetimes() {
        let midnight = Utc.with_ymd_and_hms(2025, 10, 16, 0, 0, 0).unwrap().fixed_offset();
        for target in [TargetFormat::Qdrant, TargetFormat::Weaviate, TargetFormat::Generic] {
            let date = prepare_date_for_db(&"2025-10-16".into(), &target).unwrap();
            assert_eq!(date, DbDate::DateTime(midnight));

            let date = prepare_date_for_db(&DateInput::Timestamp(1760580000), &target).unwrap();
            assert_eq!(date, DbDate::DateTime(midnight));
        }
    }

    #[test]
    fn test_unknown_target_renders_strings() {
        let target = TargetFormat::Unknown("lancedb".into());
        let dt = Utc.with_ymd_and_hms(2025, 10, 16, 14, 9, 0).unwrap().fixed_offset();

        assert_eq!(
            prepare_date_for_db(&dt.into(), &target).unwrap(),
            DbDate::Text("2025-10-16 14:09:00".into())
        );
        assert_eq!(
            prepare_date_for_db(&"whenever".into(), &target).unwrap(),
            DbDate::Text("whenever".into())
        );
        assert_eq!(
            prepare_date_for_db(&DateInput::Timestamp(7), &target).unwrap(),
            DbDate::Text("7".into())
        );
    }

    #[test]
    fn test_malformed_dates_are_errors() {
        for target in TargetFormat::KNOWN {
            match prepare_date_for_db(&"not-a-date".into(), &target) {
                Err(Error::DateParse(s)) => assert_eq!(s, "not-a-date"),
                other => panic!("{}: expected DateParse, got {:?}", target, other),
            }
        }
    }

    #[test]
    fn test_primitive_metadata() {
        let metadata = get_article_metadata(&sample_article(), &TargetFormat::Pinecone).unwrap();

        assert_eq!(metadata.id, json!(5));
        assert_eq!(metadata.tags, Tags::Joined("a, b".into()));
        assert_eq!(metadata.evergreen, json!(true));
        assert_eq!(metadata.created_at, DbDate::Timestamp(1760630940));
        assert!(metadata.is_flat());

        let json = metadata.to_json().unwrap();
        assert!(json.values().all(|v| !v.is_array() && !v.is_object()));
        assert_eq!(json["tags"], json!("a, b"));
        assert_eq!(json["created_at"], json!(1760630940));
    }

    #[test]
    fn test_passthrough_metadata_keeps_tags() {
        let article = sample_article();
        let metadata = get_article_metadata(&article, &TargetFormat::Qdrant).unwrap();

        assert_eq!(metadata.tags, Tags::List(article.tags.clone()));
        assert_eq!(metadata.id, json!("5"));
        assert_eq!(metadata.evergreen, json!(1));
        assert!(!metadata.is_flat());

        let json = metadata.to_json().unwrap();
        assert_eq!(json["tags"], json!(["a", "b"]));
        let created_at = json["created_at"].as_str().unwrap();
        assert!(created_at.starts_with("2025-10-16T14:09:00"), "{}", created_at);
    }

    #[test]
    fn test_metadata_is_idempotent() {
        let article = sample_article();
        for target in TargetFormat::KNOWN {
            let first = get_article_metadata(&article, &target).unwrap();
            let second = get_article_metadata(&article, &target).unwrap();
            assert_eq!(first, second);
        }
    }

    #[test]
    fn test_id_coercion_failures() {
        for bad in [json!("five"), json!(null), json!([1]), json!("5.0")] {
            let article = Article { id: bad.clone(), ..sample_article() };
            match get_article_metadata(&article, &TargetFormat::Chroma) {
                Err(Error::TypeCoercion { field, .. }) => assert_eq!(field, "id"),
                other => panic!("expected TypeCoercion for {}, got {:?}", bad, other),
            }
            // Passthrough targets hand the raw value over untouched.
            assert!(get_article_metadata(&article, &TargetFormat::Weaviate).is_ok());
        }
    }

    #[test]
    fn test_id_coercion_accepts_numbers() {
        assert_eq!(coerce_int("id", &json!(7)).unwrap(), 7);
        assert_eq!(coerce_int("id", &json!(7.9)).unwrap(), 7);
        assert_eq!(coerce_int("id", &json!(" 12 ")).unwrap(), 12);
        assert_eq!(coerce_int("id", &json!(true)).unwrap(), 1);
    }

    #[test]
    fn test_evergreen_truthiness() {
        assert!(!truthy(&json!(0)));
        assert!(!truthy(&json!("")));
        assert!(!truthy(&json!(null)));
        assert!(truthy(&json!("no")));
        assert!(truthy(&json!(2.5)));
    }

    #[test]
    fn test_missing_fields_default() {
        let article: Article = serde_json::from_value(json!({
            "id": 9,
            "item_created_at": 1760630940
        }))
        .unwrap();
        let metadata = get_article_metadata(&article, &TargetFormat::Milvus).unwrap();

        assert_eq!(metadata.title, "");
        assert_eq!(metadata.tags, Tags::Joined(String::new()));
        assert_eq!(metadata.evergreen, json!(false));
    }

    #[test]
    fn test_missing_created_at_fails_for_date_aware_targets() {
        let article = Article { id: json!(1), ..Article::default() };
        assert!(matches!(
            get_article_metadata(&article, &TargetFormat::Chroma),
            Err(Error::DateParse(_))
        ));
        assert!(get_article_metadata(&article, &TargetFormat::Unknown("x".into())).is_ok());
    }

    #[test]
    fn test_null_created_at_fails_only_that_article() {
        let articles: Vec<Article> = serde_json::from_value(json!([
            {"id": 1, "item_created_at": "2025-10-16"},
            {"id": 2, "item_created_at": null}
        ]))
        .unwrap();

        assert!(get_article_metadata(&articles[0], &TargetFormat::Chroma).is_ok());
        assert!(matches!(
            get_article_metadata(&articles[1], &TargetFormat::Chroma),
            Err(Error::DateParse(_))
        ));
    }
}
