use async_trait::async_trait;

use crate::error::StoreError;
use crate::model::{Book, BookFields, BookId};

/// Durable storage of [`Book`] records with store-assigned identifiers.
#[async_trait]
pub trait BookStore: Send + Sync {
    /// Persist a new book, assigning its id and timestamps.
    async fn create(&self, fields: BookFields) -> Result<Book, StoreError>;

    /// Every stored book, in store-native order.
    async fn find_all(&self) -> Result<Vec<Book>, StoreError>;

    async fn find_by_id(&self, id: &BookId) -> Result<Option<Book>, StoreError>;

    /// Replace the mutable fields of an existing book and refresh `updated_at`.
    /// Returns `None` without creating anything when no record matches.
    async fn update_by_id(&self, id: &BookId, fields: BookFields)
        -> Result<Option<Book>, StoreError>;

    /// Remove a book permanently, returning the removed record.
    async fn delete_by_id(&self, id: &BookId) -> Result<Option<Book>, StoreError>;

    /// Check the store is reachable.
    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }

    /// Short human-readable backend description for logs.
    fn describe(&self) -> String;
}
