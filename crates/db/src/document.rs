//! Document collection of books, optionally journaled to a JSON file.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::io::AsyncWriteExt;
use tokio::sync::RwLock;

use crate::error::StoreError;
use crate::model::{Book, BookFields, BookId};
use crate::store::BookStore;

type Collection = BTreeMap<BookId, Book>;

/// Book collection guarded by a single lock.
///
/// Each mutation holds the write lock until the journal (if any) has been
/// rewritten, so a failed write rolls the collection back and readers never
/// observe a half-applied change.
pub struct DocumentStore {
    documents: RwLock<Collection>,
    journal: Option<Journal>,
}

impl DocumentStore {
    /// Process-local store; contents vanish with the process.
    pub fn in_memory() -> Self {
        Self {
            documents: RwLock::new(Collection::new()),
            journal: None,
        }
    }

    /// Store journaled to `path`, loading any records already written there.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let journal = Journal { path: path.into() };
        let documents = journal.load().await?;

        tracing::info!(
            target: "shelf-db",
            path = %journal.path.display(),
            records = documents.len(),
            "opened journaled book store"
        );

        Ok(Self {
            documents: RwLock::new(documents),
            journal: Some(journal),
        })
    }

    async fn persist(&self, documents: &Collection) -> Result<(), StoreError> {
        match &self.journal {
            Some(journal) => journal.write(documents).await,
            None => Ok(()),
        }
    }
}

#[async_trait]
impl BookStore for DocumentStore {
    async fn create(&self, fields: BookFields) -> Result<Book, StoreError> {
        let now = OffsetDateTime::now_utc();
        let book = Book {
            id: BookId::generate(),
            title: fields.title,
            author: fields.author,
            publish_year: fields.publish_year,
            created_at: now,
            updated_at: now,
        };

        let mut documents = self.documents.write().await;
        documents.insert(book.id, book.clone());
        if let Err(err) = self.persist(&documents).await {
            documents.remove(&book.id);
            return Err(err);
        }

        tracing::debug!(target: "shelf-db", id = %book.id, "book created");
        Ok(book)
    }

    async fn find_all(&self) -> Result<Vec<Book>, StoreError> {
        Ok(self.documents.read().await.values().cloned().collect())
    }

    async fn find_by_id(&self, id: &BookId) -> Result<Option<Book>, StoreError> {
        Ok(self.documents.read().await.get(id).cloned())
    }

    async fn update_by_id(
        &self,
        id: &BookId,
        fields: BookFields,
    ) -> Result<Option<Book>, StoreError> {
        let mut documents = self.documents.write().await;
        let Some(previous) = documents.get(id).cloned() else {
            return Ok(None);
        };

        let updated = Book {
            title: fields.title,
            author: fields.author,
            publish_year: fields.publish_year,
            updated_at: OffsetDateTime::now_utc(),
            ..previous.clone()
        };
        documents.insert(*id, updated.clone());
        if let Err(err) = self.persist(&documents).await {
            documents.insert(*id, previous);
            return Err(err);
        }

        tracing::debug!(target: "shelf-db", %id, "book updated");
        Ok(Some(updated))
    }

    async fn delete_by_id(&self, id: &BookId) -> Result<Option<Book>, StoreError> {
        let mut documents = self.documents.write().await;
        let Some(removed) = documents.remove(id) else {
            return Ok(None);
        };
        if let Err(err) = self.persist(&documents).await {
            documents.insert(*id, removed);
            return Err(err);
        }

        tracing::debug!(target: "shelf-db", %id, "book deleted");
        Ok(Some(removed))
    }

    async fn ping(&self) -> Result<(), StoreError> {
        if let Some(journal) = &self.journal {
            journal.ensure_parent().await?;
        }
        Ok(())
    }

    fn describe(&self) -> String {
        match &self.journal {
            Some(journal) => format!("file:{}", journal.path.display()),
            None => "memory".to_string(),
        }
    }
}

/// JSON array of every book, rewritten whole on each mutation.
struct Journal {
    path: PathBuf,
}

impl Journal {
    async fn load(&self) -> Result<Collection, StoreError> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Collection::new()),
            Err(err) => return Err(err.into()),
        };

        let books: Vec<Book> = serde_json::from_slice(&bytes)?;
        Ok(books.into_iter().map(|book| (book.id, book)).collect())
    }

    /// Write to a sibling temp file, fsync, then rename over the journal.
    async fn write(&self, documents: &Collection) -> Result<(), StoreError> {
        let content = serde_json::to_vec_pretty(&documents.values().collect::<Vec<_>>())?;
        self.ensure_parent().await?;

        let temp_path = self.temp_path();
        let mut file = tokio::fs::File::create(&temp_path).await?;
        file.write_all(&content).await?;
        file.sync_all().await?;
        drop(file);

        tokio::fs::rename(&temp_path, &self.path).await?;
        Ok(())
    }

    async fn ensure_parent(&self) -> Result<(), StoreError> {
        match self.path.parent() {
            Some(parent) if parent != Path::new("") => {
                tokio::fs::create_dir_all(parent).await?;
                Ok(())
            }
            _ => Ok(()),
        }
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.clone().into_os_string();
        name.push(".tmp");
        PathBuf::from(name)
    }
}
