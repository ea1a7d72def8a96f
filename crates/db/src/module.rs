use std::sync::Arc;

use anyhow::Context;
use async_trait::async_trait;
use shelf_kernel::{InitCtx, Module};

use crate::store::BookStore;

/// Core module owning the record store handle for the service lifetime.
pub struct StoreModule {
    store: Arc<dyn BookStore>,
}

impl StoreModule {
    pub fn new(store: Arc<dyn BookStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Module for StoreModule {
    fn name(&self) -> &'static str {
        "db"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            backend = %self.store.describe(),
            environment = ?ctx.settings.environment,
            "record store attached"
        );
        Ok(())
    }

    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        self.store
            .ping()
            .await
            .with_context(|| format!("record store {} is unreachable", self.store.describe()))?;
        tracing::info!(module = self.name(), "record store reachable");
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "record store released");
        Ok(())
    }
}
