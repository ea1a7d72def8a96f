use serde::Serialize;
use serde_json::Value;
use shelf_db::Book;

pub const REQUIRED_FIELDS: [&str; 3] = ["title", "author", "publishYear"];

pub const REQUIRED_FIELDS_MESSAGE: &str = "Send all required fields: title, author, publishYear";
pub const BOOK_NOT_FOUND: &str = "Book not found";
pub const BOOK_UPDATED: &str = "Book updated successfully";
pub const BOOK_DELETED: &str = "Book deleted successfully";

/// Response for the collection endpoint.
#[derive(Debug, Serialize)]
pub struct BookList {
    pub count: usize,
    pub data: Vec<Book>,
}

impl From<Vec<Book>> for BookList {
    fn from(data: Vec<Book>) -> Self {
        Self {
            count: data.len(),
            data,
        }
    }
}

/// Response for the single-book endpoint; `book` is `null` when no record matches.
#[derive(Debug, Serialize)]
pub struct BookEnvelope {
    pub book: Option<Book>,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

/// Required fields that are absent or falsy in `document`.
///
/// `null`, `false`, `0` and `""` all count as missing, so `publishYear: 0`
/// is rejected along with an absent year.
pub fn missing_fields(document: &Value) -> Vec<&'static str> {
    REQUIRED_FIELDS
        .into_iter()
        .filter(|field| !document.get(*field).is_some_and(is_truthy))
        .collect()
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0),
        Value::String(text) => !text.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
