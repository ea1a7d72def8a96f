//! Book entity and its document schema.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::error::StoreError;

/// Store-assigned identifier of a book.
///
/// UUID v7, so ordering by id follows creation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BookId(Uuid);

impl BookId {
    pub(crate) fn generate() -> Self {
        Self(Uuid::now_v7())
    }
}

impl fmt::Display for BookId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for BookId {
    type Err = StoreError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        Uuid::try_parse(raw)
            .map(Self)
            .map_err(|_| StoreError::MalformedId(raw.to_string()))
    }
}

/// A persisted book record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    pub id: BookId,
    pub title: String,
    pub author: String,
    pub publish_year: i64,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// The mutable part of a book, replaced wholesale on update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookFields {
    pub title: String,
    pub author: String,
    pub publish_year: i64,
}

impl BookFields {
    /// Cast a loosely-typed JSON document into typed fields.
    ///
    /// Text fields accept strings, numbers and booleans. `publishYear` accepts
    /// integers, integral floats, numeric strings and booleans. Keys outside
    /// the schema are ignored.
    pub fn from_document(document: &Value) -> Result<Self, StoreError> {
        let field = |name: &'static str| document.get(name).unwrap_or(&Value::Null);

        Ok(Self {
            title: cast_text("title", field("title"))?,
            author: cast_text("author", field("author"))?,
            publish_year: cast_year("publishYear", field("publishYear"))?,
        })
    }
}

fn cast_text(name: &'static str, value: &Value) -> Result<String, StoreError> {
    match value {
        Value::Null => Err(StoreError::Required(name)),
        Value::String(text) if text.is_empty() => Err(StoreError::Required(name)),
        Value::String(text) => Ok(text.clone()),
        Value::Number(number) => Ok(number.to_string()),
        Value::Bool(flag) => Ok(flag.to_string()),
        Value::Array(_) | Value::Object(_) => Err(StoreError::cast(name, "string", value)),
    }
}

fn cast_year(name: &'static str, value: &Value) -> Result<i64, StoreError> {
    let integral = |float: f64| {
        (float.fract() == 0.0 && float >= i64::MIN as f64 && float <= i64::MAX as f64)
            .then_some(float as i64)
    };

    let year = match value {
        Value::Null => return Err(StoreError::Required(name)),
        Value::Number(number) => number
            .as_i64()
            .or_else(|| number.as_f64().and_then(integral)),
        Value::String(text) => {
            let text = text.trim();
            text.parse::<i64>()
                .ok()
                .or_else(|| text.parse::<f64>().ok().and_then(integral))
        }
        Value::Bool(flag) => Some(i64::from(*flag)),
        Value::Array(_) | Value::Object(_) => None,
    };

    year.ok_or_else(|| StoreError::cast(name, "Number", value))
}
