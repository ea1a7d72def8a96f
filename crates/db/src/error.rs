//! Record store failures

use thiserror::Error;

/// Every failure the record store can surface.
///
/// "No such record" is not an error: lookups return `Option` instead.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("malformed book id \"{0}\"")]
    MalformedId(String),

    #[error("Book validation failed: {0}: Path `{0}` is required.")]
    Required(&'static str),

    #[error("Book validation failed: {field}: Cast to {expected} failed for value {value}")]
    Cast {
        field: &'static str,
        expected: &'static str,
        value: String,
    },

    #[error("store I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("store document could not be encoded: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("unsupported connection string '{0}'; expected memory:// or file://<path>")]
    Unsupported(String),
}

impl StoreError {
    pub(crate) fn cast(field: &'static str, expected: &'static str, value: &serde_json::Value) -> Self {
        Self::Cast {
            field,
            expected,
            value: value.to_string(),
        }
    }
}
