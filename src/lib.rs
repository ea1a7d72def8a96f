//! Shelf application library
//!
//! Wires the record store, the project modules, and the HTTP server together.

use std::sync::Arc;

use anyhow::Context;
use shelf_db::{BookStore, StoreModule};
use shelf_kernel::{settings::Settings, InitCtx, ModuleRegistry};

pub mod modules;

/// Registry holding the store module (core) and every project module,
/// all sharing the one `store` handle.
pub fn build_registry(store: Arc<dyn BookStore>) -> ModuleRegistry {
    let mut registry = ModuleRegistry::new();
    registry.register_core(Arc::new(StoreModule::new(store.clone())));
    modules::register_all(&mut registry, store);
    registry
}

/// Connect the store, run the module lifecycle, and serve until shutdown.
pub async fn run(settings: Settings) -> anyhow::Result<()> {
    let store = shelf_db::connect(&settings.database.url)
        .await
        .with_context(|| format!("failed to connect record store '{}'", settings.database.url))?;

    let registry = build_registry(store);
    let ctx = InitCtx {
        settings: &settings,
    };

    registry.init_all(&ctx).await?;
    registry.start_all(&ctx).await?;

    let served = shelf_http::start_server(&registry, &settings).await;

    registry.stop_all().await?;
    served
}
