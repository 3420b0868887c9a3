pub mod models;
pub mod routes;
pub mod service;
pub mod store;

use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use livraria_kernel::{InitCtx, Migration, Module};
use utoipa::OpenApi;

use service::CatalogService;
use store::LivroStore;

/// Schema for [`store::SqliteLivroStore`]. `AUTOINCREMENT` keeps deleted ids
/// from being handed out again.
pub const MIGRATIONS: &[Migration] = &[Migration {
    id: "001_init",
    up: r#"
        CREATE TABLE livros (
            id              INTEGER PRIMARY KEY AUTOINCREMENT,
            titulo          TEXT NOT NULL CHECK (titulo <> ''),
            autor           TEXT NOT NULL CHECK (autor <> ''),
            preco           REAL NOT NULL CHECK (preco > 0),
            data_publicacao TEXT NOT NULL,
            editora         TEXT
        );
        "#,
}];

/// The book catalog: `/livros` routes over an owned store
pub struct LivrosModule {
    service: CatalogService,
}

impl LivrosModule {
    pub fn new(store: Arc<dyn LivroStore>) -> Self {
        Self {
            service: CatalogService::new(store),
        }
    }
}

#[async_trait]
impl Module for LivrosModule {
    fn name(&self) -> &'static str {
        "livros"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            backend = ?ctx.settings.database.backend,
            "livros module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        routes::router(self.service.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        serde_json::to_value(routes::LivrosApi::openapi()).ok()
    }

    fn migrations(&self) -> Vec<Migration> {
        MIGRATIONS.to_vec()
    }

    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        let total = self.service.list().await?.len();
        tracing::info!(module = self.name(), total, "livros module started");
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "livros module stopped");
        Ok(())
    }
}

/// Create a new instance of the livros module
pub fn create_module(store: Arc<dyn LivroStore>) -> Arc<dyn Module> {
    Arc::new(LivrosModule::new(store))
}
