pub mod handlers;
pub mod models;
pub mod routes;

use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use serde_json::{json, Value};
use shelf_db::BookStore;
use shelf_kernel::{InitCtx, Module};

/// Book records module: CRUD over the injected record store
pub struct BooksModule {
    store: Arc<dyn BookStore>,
}

impl BooksModule {
    pub fn new(store: Arc<dyn BookStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Module for BooksModule {
    fn name(&self) -> &'static str {
        "books"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            store = %self.store.describe(),
            "books module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Option<Router> {
        Some(routes::router(self.store.clone()))
    }

    fn openapi(&self) -> Option<Value> {
        Some(openapi_fragment())
    }

    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "books module started");
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "books module stopped");
        Ok(())
    }
}

/// Create a new instance of the books module over `store`
pub fn create_module(store: Arc<dyn BookStore>) -> Arc<dyn Module> {
    Arc::new(BooksModule::new(store))
}

fn json_response(description: &str, schema: &str) -> Value {
    json!({
        "description": description,
        "content": {
            "application/json": {
                "schema": { "$ref": format!("#/components/schemas/{}", schema) }
            }
        }
    })
}

fn openapi_fragment() -> Value {
    let id_param = json!([{
        "name": "id",
        "in": "path",
        "required": true,
        "schema": { "type": "string", "format": "uuid" }
    }]);
    let book_body = json!({
        "required": true,
        "content": {
            "application/json": {
                "schema": { "$ref": "#/components/schemas/BookInput" }
            }
        }
    });
    let missing_fields = json_response("A required field is missing or falsy", "ErrorResponse");
    let not_found = json_response("No book matches the id", "ErrorResponse");
    let store_failure = json_response("Record store failure", "ErrorResponse");

    json!({
        "paths": {
            "/": {
                "get": {
                    "summary": "List books",
                    "tags": ["Books"],
                    "responses": {
                        "200": json_response("Every stored book", "BookList"),
                        "500": store_failure
                    }
                },
                "post": {
                    "summary": "Create a book",
                    "tags": ["Books"],
                    "requestBody": book_body,
                    "responses": {
                        "201": json_response("The created book", "Book"),
                        "400": missing_fields,
                        "500": store_failure
                    }
                }
            },
            "/{id}": {
                "get": {
                    "summary": "Get one book",
                    "tags": ["Books"],
                    "parameters": id_param,
                    "responses": {
                        "200": json_response("The book, or null when absent", "BookEnvelope"),
                        "404": not_found,
                        "500": store_failure
                    }
                },
                "put": {
                    "summary": "Replace a book's fields",
                    "tags": ["Books"],
                    "parameters": id_param,
                    "requestBody": book_body,
                    "responses": {
                        "200": json_response("Book updated", "Message"),
                        "400": missing_fields,
                        "404": not_found,
                        "500": store_failure
                    }
                },
                "delete": {
                    "summary": "Delete a book",
                    "tags": ["Books"],
                    "parameters": id_param,
                    "responses": {
                        "200": json_response("Book deleted", "Message"),
                        "404": not_found,
                        "500": store_failure
                    }
                }
            }
        },
        "components": {
            "schemas": {
                "Book": {
                    "type": "object",
                    "properties": {
                        "id": { "type": "string", "format": "uuid" },
                        "title": { "type": "string" },
                        "author": { "type": "string" },
                        "publishYear": { "type": "integer", "format": "int64" },
                        "createdAt": { "type": "string", "format": "date-time" },
                        "updatedAt": { "type": "string", "format": "date-time" }
                    },
                    "required": ["id", "title", "author", "publishYear", "createdAt", "updatedAt"]
                },
                "BookInput": {
                    "type": "object",
                    "properties": {
                        "title": { "type": "string" },
                        "author": { "type": "string" },
                        "publishYear": { "type": "integer", "format": "int64" }
                    },
                    "required": ["title", "author", "publishYear"]
                },
                "BookList": {
                    "type": "object",
                    "properties": {
                        "count": { "type": "integer" },
                        "data": {
                            "type": "array",
                            "items": { "$ref": "#/components/schemas/Book" }
                        }
                    },
                    "required": ["count", "data"]
                },
                "BookEnvelope": {
                    "type": "object",
                    "properties": {
                        "book": {
                            "oneOf": [
                                { "$ref": "#/components/schemas/Book" },
                                { "type": "null" }
                            ]
                        }
                    },
                    "required": ["book"]
                },
                "Message": {
                    "type": "object",
                    "properties": {
                        "message": { "type": "string" }
                    },
                    "required": ["message"]
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use shelf_db::DocumentStore;

    #[test]
    fn fragment_documents_every_endpoint() {
        let fragment = openapi_fragment();

        for method in ["get", "post"] {
            assert!(fragment["paths"]["/"].get(method).is_some(), "{method} /");
        }
        for method in ["get", "put", "delete"] {
            assert!(fragment["paths"]["/{id}"].get(method).is_some(), "{method} /{{id}}");
        }
        assert!(fragment["components"]["schemas"]["Book"]["properties"]
            .get("publishYear")
            .is_some());
    }

    #[test]
    fn module_is_named_after_its_mount_point() {
        let module = create_module(Arc::new(DocumentStore::in_memory()));
        assert_eq!(module.name(), "books");
        assert!(module.openapi().is_some());
    }
}
