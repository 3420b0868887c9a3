//! SQLite connection factory and migration runner.
//!
//! One connection is shared behind a mutex; async callers go through
//! [`Database::call`], which runs the closure on tokio's blocking pool.

use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use anyhow::{anyhow, Context};
use livraria_kernel::Migration;
use rusqlite::{params, Connection};

const MIGRATIONS_TABLE: &str = "
    CREATE TABLE IF NOT EXISTS schema_migrations (
        module     TEXT NOT NULL,
        id         TEXT NOT NULL,
        applied_at TEXT NOT NULL DEFAULT (datetime('now')),
        PRIMARY KEY (module, id)
    );
";

/// Handle to the SQLite database. Cheap to clone.
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    /// Open (or create) the database file at `path`.
    pub fn open(path: &Path) -> anyhow::Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("failed to open database at {}", path.display()))?;
        conn.busy_timeout(Duration::from_secs(5))
            .context("failed to set busy timeout")?;

        tracing::info!(target: "livraria-db", path = %path.display(), "database opened");
        Self::from_connection(conn)
    }

    /// Private in-memory database, gone when the last handle drops.
    pub fn in_memory() -> anyhow::Result<Self> {
        let conn = Connection::open_in_memory().context("failed to open in-memory database")?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> anyhow::Result<Self> {
        conn.execute_batch(MIGRATIONS_TABLE)
            .context("failed to create schema_migrations table")?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn lock(&self) -> anyhow::Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| anyhow!("database connection mutex poisoned"))
    }

    /// Apply every migration not yet recorded in `schema_migrations`.
    ///
    /// Each migration runs in its own transaction together with its
    /// bookkeeping row. Returns how many were applied.
    pub fn apply_migrations(&self, migrations: &[(String, Migration)]) -> anyhow::Result<usize> {
        let mut conn = self.lock()?;
        let mut applied = 0;

        for (module, migration) in migrations {
            let already: bool = conn
                .query_row(
                    "SELECT EXISTS(SELECT 1 FROM schema_migrations WHERE module = ?1 AND id = ?2)",
                    params![module, migration.id],
                    |row| row.get(0),
                )
                .context("failed to read schema_migrations")?;
            if already {
                tracing::debug!(target: "livraria-db", %module, id = migration.id, "migration already applied");
                continue;
            }

            let tx = conn.transaction()?;
            tx.execute_batch(migration.up)
                .with_context(|| format!("migration {}/{} failed", module, migration.id))?;
            tx.execute(
                "INSERT INTO schema_migrations (module, id) VALUES (?1, ?2)",
                params![module, migration.id],
            )?;
            tx.commit()?;

            tracing::info!(target: "livraria-db", %module, id = migration.id, "migration applied");
            applied += 1;
        }

        Ok(applied)
    }

    /// Run `f` against the connection on the blocking pool.
    pub async fn call<F, T>(&self, f: F) -> anyhow::Result<T>
    where
        F: FnOnce(&Connection) -> rusqlite::Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let db = self.clone();
        tokio::task::spawn_blocking(move || {
            let conn = db.lock()?;
            f(&conn).map_err(anyhow::Error::from)
        })
        .await
        .context("database task panicked")?
    }
}
