//! Record store for books: the entity model, the [`BookStore`] seam, the
//! document-collection backend, and driver selection from a connection string.

use std::sync::Arc;

pub mod document;
pub mod error;
pub mod model;
pub mod module;
pub mod store;

pub use document::DocumentStore;
pub use error::StoreError;
pub use model::{Book, BookFields, BookId};
pub use module::StoreModule;
pub use store::BookStore;

const MEMORY_SCHEME: &str = "memory://";
const FILE_SCHEME: &str = "file://";

/// Backend named by a connection string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Backend {
    Memory,
    File(std::path::PathBuf),
}

impl std::str::FromStr for Backend {
    type Err = StoreError;

    fn from_str(url: &str) -> Result<Self, Self::Err> {
        let url = url.trim();
        if url == MEMORY_SCHEME {
            return Ok(Backend::Memory);
        }
        match url.strip_prefix(FILE_SCHEME) {
            Some(path) if !path.is_empty() => Ok(Backend::File(path.into())),
            _ => Err(StoreError::Unsupported(url.to_string())),
        }
    }
}

/// Open the store named by `url`. Called once at startup; the returned handle
/// is shared by every request.
pub async fn connect(url: &str) -> Result<Arc<dyn BookStore>, StoreError> {
    let store = match url.parse::<Backend>()? {
        Backend::Memory => DocumentStore::in_memory(),
        Backend::File(path) => DocumentStore::open(path).await?,
    };

    tracing::info!(target: "shelf-db", backend = %store.describe(), "record store connected");
    Ok(Arc::new(store))
}
