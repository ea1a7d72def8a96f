//! Request handlers for `/books`.
//!
//! Every handler is independent: it checks the request, makes at most one
//! store call, and maps the outcome onto a status code. Store failures are
//! reported as 500 with the store's own message.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use serde_json::Value;
use shelf_db::{Book, BookFields, BookId, BookStore};
use shelf_http::error::AppError;

use super::models::{
    self, BookEnvelope, BookList, MessageResponse, BOOK_DELETED, BOOK_NOT_FOUND, BOOK_UPDATED,
    REQUIRED_FIELDS_MESSAGE,
};

/// Handler state: the record store injected at module construction.
#[derive(Clone)]
pub struct BooksState {
    store: Arc<dyn BookStore>,
}

impl BooksState {
    pub fn new(store: Arc<dyn BookStore>) -> Self {
        Self { store }
    }
}

/// `POST /books`
pub async fn create_book(
    State(state): State<BooksState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<Book>), AppError> {
    let document = required_document(payload)?;

    let fields = BookFields::from_document(&document).map_err(AppError::internal)?;
    let book = state.store.create(fields).await.map_err(AppError::internal)?;

    tracing::info!(id = %book.id, "book created");
    Ok((StatusCode::CREATED, Json(book)))
}

/// `GET /books`
pub async fn list_books(State(state): State<BooksState>) -> Result<Json<BookList>, AppError> {
    let books = state.store.find_all().await.map_err(AppError::internal)?;
    Ok(Json(BookList::from(books)))
}

/// `GET /books/{id}`; a well-formed id with no record yields `{"book": null}`
pub async fn get_book(
    State(state): State<BooksState>,
    Path(id): Path<String>,
) -> Result<Json<BookEnvelope>, AppError> {
    let id = parse_id(&id)?;
    let book = state.store.find_by_id(&id).await.map_err(AppError::internal)?;
    Ok(Json(BookEnvelope { book }))
}

/// `PUT /books/{id}`
pub async fn update_book(
    State(state): State<BooksState>,
    Path(id): Path<String>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<MessageResponse>, AppError> {
    let document = required_document(payload)?;
    let id = parse_id(&id)?;

    let fields = BookFields::from_document(&document).map_err(AppError::internal)?;
    state
        .store
        .update_by_id(&id, fields)
        .await
        .map_err(AppError::internal)?
        .ok_or_else(|| AppError::not_found(BOOK_NOT_FOUND))?;

    tracing::info!(%id, "book updated");
    Ok(Json(MessageResponse {
        message: BOOK_UPDATED,
    }))
}

/// `DELETE /books/{id}`
pub async fn delete_book(
    State(state): State<BooksState>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    let id = parse_id(&id)?;

    state
        .store
        .delete_by_id(&id)
        .await
        .map_err(AppError::internal)?
        .ok_or_else(|| AppError::not_found(BOOK_NOT_FOUND))?;

    tracing::info!(%id, "book deleted");
    Ok(Json(MessageResponse {
        message: BOOK_DELETED,
    }))
}

/// Unwrap the JSON body and run the required-field check.
///
/// An unreadable body (bad JSON, wrong content type) is treated as an empty
/// document and so fails the check.
fn required_document(payload: Result<Json<Value>, JsonRejection>) -> Result<Value, AppError> {
    let document = match payload {
        Ok(Json(document)) => document,
        Err(rejection) => {
            tracing::debug!(%rejection, "unreadable request body treated as empty");
            Value::Null
        }
    };

    let missing = models::missing_fields(&document);
    if !missing.is_empty() {
        tracing::debug!(?missing, "required book fields missing");
        return Err(AppError::validation(REQUIRED_FIELDS_MESSAGE));
    }

    Ok(document)
}

/// Malformed ids can never match a record, so they answer 404 before the
/// store is consulted.
fn parse_id(raw: &str) -> Result<BookId, AppError> {
    raw.parse().map_err(|err| {
        tracing::debug!(error = %err, "rejecting malformed book id");
        AppError::not_found(BOOK_NOT_FOUND)
    })
}
