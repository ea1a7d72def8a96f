//! Router builder for the shelf HTTP server

use axum::{http::StatusCode, routing::get, Router};
use serde_json::{json, Value};
use std::time::Duration;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};

use shelf_kernel::ModuleRegistry;

use crate::MakeRequestUuid;

const OPENAPI_PATH: &str = "/docs/openapi.json";

/// Builder for constructing the main HTTP router
pub struct RouterBuilder {
    router: Router,
}

impl RouterBuilder {
    /// Create a new router builder
    pub fn new() -> Self {
        Self {
            router: Router::new(),
        }
    }

    /// Add a route to the router
    pub fn route(mut self, path: &str, route: axum::routing::MethodRouter) -> Self {
        self.router = self.router.route(path, route);
        self
    }

    /// Mount a module's router under `/{module_name}`
    pub fn mount_module(mut self, module_name: &str, module_router: Router) -> Self {
        self.router = self.router.nest(&module_path(module_name), module_router);
        self
    }

    /// Add tracing middleware
    pub fn with_tracing(mut self) -> Self {
        self.router = self.router.layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().include_headers(true))
                .on_request(DefaultOnRequest::new().level(tracing::Level::INFO))
                .on_response(DefaultOnResponse::new().level(tracing::Level::INFO)),
        );
        self
    }

    /// Add a permissive CORS policy to every route
    pub fn with_cors(mut self) -> Self {
        self.router = self.router.layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        );
        self
    }

    /// Add request ID middleware; the id is echoed back on the response
    pub fn with_request_id(mut self) -> Self {
        self.router = self
            .router
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid));
        self
    }

    /// Add timeout middleware; slow requests are answered with 408
    pub fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.router = self.router.layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_millis(timeout_ms),
        ));
        self
    }

    /// Serve one OpenAPI document merged from every module's fragment
    pub fn with_openapi(mut self, registry: &ModuleRegistry) -> Self {
        let mut openapi_spec = json!({
            "openapi": "3.1.0",
            "info": {
                "title": "Shelf API",
                "version": env!("CARGO_PKG_VERSION"),
                "description": "Book record service"
            },
            "paths": {},
            "components": {
                "schemas": {}
            }
        });

        openapi_spec["components"]["schemas"]["ErrorResponse"] = json!({
            "type": "object",
            "properties": {
                "message": { "type": "string" }
            },
            "required": ["message"]
        });

        openapi_spec["paths"]["/healthz"] = json!({
            "get": {
                "summary": "Health check",
                "responses": {
                    "200": {
                        "description": "OK",
                        "content": { "text/plain": { "schema": { "type": "string" } } }
                    }
                }
            }
        });

        for module in registry.modules() {
            if let Some(module_spec) = module.openapi() {
                merge_fragment(&mut openapi_spec, &module_path(module.name()), &module_spec);
            }
        }

        // Check the merged document against utoipa's model so a malformed
        // fragment is reported at startup.
        if let Err(err) = serde_json::from_value::<utoipa::openapi::OpenApi>(openapi_spec.clone()) {
            tracing::warn!(error = %err, "merged OpenAPI document does not match the OpenAPI model");
        }

        self.router = self.router.route(
            OPENAPI_PATH,
            get(move || {
                let document = openapi_spec.clone();
                async move { axum::Json(document) }
            }),
        );

        self
    }

    /// Build the final router
    pub fn build(self) -> Router {
        self.router
    }
}

impl Default for RouterBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn module_path(module_name: &str) -> String {
    format!("/{}", module_name)
}

/// Copy a module's paths (prefixed with its mount point) and schemas into `spec`.
fn merge_fragment(spec: &mut Value, prefix: &str, fragment: &Value) {
    if let Some(paths) = fragment.get("paths").and_then(Value::as_object) {
        for (path, path_item) in paths {
            let full_path = match path.as_str() {
                "/" => prefix.to_string(),
                other => format!("{}{}", prefix, other),
            };
            spec["paths"][full_path] = path_item.clone();
        }
    }

    if let Some(schemas) = fragment
        .pointer("/components/schemas")
        .and_then(Value::as_object)
    {
        for (schema_name, schema_def) in schemas {
            spec["components"]["schemas"][schema_name] = schema_def.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{to_bytes, Body},
        http::Request,
    };
    use tower::ServiceExt;

    async fn get_status(router: Router, uri: &str) -> StatusCode {
        router
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
            .status()
    }

    #[tokio::test]
    async fn test_module_mounting() {
        let module_router = Router::new()
            .route("/", get(|| async { "list" }))
            .route("/{id}", get(|| async { "one" }));

        let router = RouterBuilder::new()
            .mount_module("books", module_router)
            .build();

        assert_eq!(get_status(router.clone(), "/books").await, StatusCode::OK);
        assert_eq!(get_status(router.clone(), "/books/42").await, StatusCode::OK);
        assert_eq!(get_status(router, "/api/books").await, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_middleware_chain_sets_request_id() {
        let router = RouterBuilder::new()
            .route("/health", get(|| async { "ok" }))
            .with_tracing()
            .with_cors()
            .with_request_id()
            .with_timeout(5000)
            .build();

        let response = router
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("x-request-id"));
    }

    #[tokio::test]
    async fn test_slow_request_times_out() {
        let router = RouterBuilder::new()
            .route(
                "/slow",
                get(|| async {
                    tokio::time::sleep(Duration::from_secs(5)).await;
                    "late"
                }),
            )
            .with_timeout(20)
            .build();

        assert_eq!(get_status(router, "/slow").await, StatusCode::REQUEST_TIMEOUT);
    }

    #[tokio::test]
    async fn test_openapi_document_is_served() {
        let router = RouterBuilder::new()
            .with_openapi(&ModuleRegistry::new())
            .build();

        let response = router
            .oneshot(Request::builder().uri(OPENAPI_PATH).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let document: Value = serde_json::from_slice(&bytes).unwrap();
        assert!(document["paths"].get("/healthz").is_some());
        assert!(document["components"]["schemas"]
            .get("ErrorResponse")
            .is_some());
    }

    #[test]
    fn test_fragment_paths_are_prefixed() {
        let mut spec = json!({ "paths": {}, "components": { "schemas": {} } });
        let fragment = json!({
            "paths": { "/": { "get": {} }, "/{id}": { "get": {} } },
            "components": { "schemas": { "Book": { "type": "object" } } }
        });

        merge_fragment(&mut spec, "/books", &fragment);

        assert!(spec["paths"].get("/books").is_some());
        assert!(spec["paths"].get("/books/{id}").is_some());
        assert!(spec["components"]["schemas"].get("Book").is_some());
    }
}
