//! Wiring: open the configured store, register modules, migrate, and serve.

use std::sync::Arc;

use anyhow::Context;
use axum::Router;
use livraria_db::Database;
use livraria_kernel::{
    settings::{DatabaseSettings, Settings, StorageBackend},
    InitCtx, ModuleRegistry,
};

use crate::modules::{
    self,
    livros::store::{LivroStore, MemoryLivroStore, SqliteLivroStore},
};

/// The configured persistence provider, plus its database handle when it
/// needs migrations.
pub struct OpenedStore {
    pub store: Arc<dyn LivroStore>,
    pub database: Option<Database>,
}

pub fn open_store(settings: &DatabaseSettings) -> anyhow::Result<OpenedStore> {
    match settings.backend {
        StorageBackend::Memory => {
            tracing::warn!("using in-memory storage; the catalog is lost on exit");
            Ok(OpenedStore {
                store: Arc::new(MemoryLivroStore::new()),
                database: None,
            })
        }
        StorageBackend::Sqlite => {
            let database = Database::open(&settings.path)?;
            Ok(OpenedStore {
                store: Arc::new(SqliteLivroStore::new(database.clone())),
                database: Some(database),
            })
        }
    }
}

pub fn build_registry(store: Arc<dyn LivroStore>) -> ModuleRegistry {
    let mut registry = ModuleRegistry::new();
    modules::register_all(&mut registry, store);
    registry
}

fn apply_migrations(database: Option<&Database>, registry: &ModuleRegistry) -> anyhow::Result<usize> {
    let Some(database) = database else {
        return Ok(0);
    };
    let applied = database
        .apply_migrations(&registry.collect_migrations())
        .context("failed to apply migrations")?;
    tracing::info!(applied, "migrations up to date");
    Ok(applied)
}

/// Apply pending migrations for the configured store and exit.
pub fn migrate(settings: &Settings) -> anyhow::Result<usize> {
    let opened = open_store(&settings.database)?;
    let registry = build_registry(opened.store);
    apply_migrations(opened.database.as_ref(), &registry)
}

/// Full HTTP router over `store`, without running module lifecycle hooks.
pub fn app_router(store: Arc<dyn LivroStore>, settings: &Settings) -> anyhow::Result<Router> {
    let registry = build_registry(store);
    livraria_http::build_router(&registry, settings)
}

/// Run the server until Ctrl-C.
pub async fn run(settings: Settings) -> anyhow::Result<()> {
    let opened = open_store(&settings.database)?;
    let registry = build_registry(opened.store);
    apply_migrations(opened.database.as_ref(), &registry)?;

    let ctx = InitCtx {
        settings: &settings,
    };
    registry.init_modules(&ctx).await?;
    registry.start_modules(&ctx).await?;

    tracing::info!(modules = registry.module_count(), "livraria-app bootstrap complete");

    let served = livraria_http::start_server(&registry, &settings).await;
    registry.stop_modules().await?;
    served
}
