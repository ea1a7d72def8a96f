use std::sync::Arc;

use axum::{routing::get, Router};
use shelf_db::BookStore;

use super::handlers::{self, BooksState};

/// Every `/books` endpoint, defined once. Paths are relative to the module
/// mount point.
pub fn router(store: Arc<dyn BookStore>) -> Router {
    Router::new()
        .route("/", get(handlers::list_books).post(handlers::create_book))
        .route(
            "/{id}",
            get(handlers::get_book)
                .put(handlers::update_book)
                .delete(handlers::delete_book),
        )
        .with_state(BooksState::new(store))
}
