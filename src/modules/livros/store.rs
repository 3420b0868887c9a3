//! Persistence providers for the catalog.
//!
//! Both stores hand out ids from a counter that only grows, so an id is
//! never handed out twice even after its record is deleted.

use std::collections::BTreeMap;

use anyhow::Context;
use async_trait::async_trait;
use chrono::NaiveDate;
use livraria_db::Database;
use rusqlite::{params, OptionalExtension, Row};
use tokio::sync::RwLock;

use super::models::{Livro, NovoLivro};

/// Storage backend for books.
#[async_trait]
pub trait LivroStore: Send + Sync {
    /// Every record, in insertion order
    async fn list(&self) -> anyhow::Result<Vec<Livro>>;

    async fn get(&self, id: i64) -> anyhow::Result<Option<Livro>>;

    /// Store a new record and return the id assigned to it
    async fn insert(&self, livro: NovoLivro) -> anyhow::Result<i64>;

    /// Overwrite every field of an existing record. Missing ids are ignored.
    async fn replace(&self, id: i64, livro: NovoLivro) -> anyhow::Result<()>;

    /// Delete a record. Missing ids are ignored.
    async fn remove(&self, id: i64) -> anyhow::Result<()>;
}

#[derive(Default)]
struct MemoryState {
    last_id: i64,
    livros: BTreeMap<i64, Livro>,
}

/// Process-local store, lost on exit.
#[derive(Default)]
pub struct MemoryLivroStore {
    state: RwLock<MemoryState>,
}

impl MemoryLivroStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LivroStore for MemoryLivroStore {
    async fn list(&self) -> anyhow::Result<Vec<Livro>> {
        let state = self.state.read().await;
        Ok(state.livros.values().cloned().collect())
    }

    async fn get(&self, id: i64) -> anyhow::Result<Option<Livro>> {
        let state = self.state.read().await;
        Ok(state.livros.get(&id).cloned())
    }

    async fn insert(&self, livro: NovoLivro) -> anyhow::Result<i64> {
        let mut state = self.state.write().await;
        state.last_id += 1;
        let id = state.last_id;
        state.livros.insert(id, Livro::from_novo(id, livro));
        Ok(id)
    }

    async fn replace(&self, id: i64, livro: NovoLivro) -> anyhow::Result<()> {
        let mut state = self.state.write().await;
        if let Some(slot) = state.livros.get_mut(&id) {
            *slot = Livro::from_novo(id, livro);
        }
        Ok(())
    }

    async fn remove(&self, id: i64) -> anyhow::Result<()> {
        let mut state = self.state.write().await;
        state.livros.remove(&id);
        Ok(())
    }
}

/// SQLite-backed store. Expects the `livros` migrations to have run.
#[derive(Clone)]
pub struct SqliteLivroStore {
    db: Database,
}

impl SqliteLivroStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

const SELECT_LIVRO: &str =
    "SELECT id, titulo, autor, preco, data_publicacao, editora FROM livros";

fn parse_livro_row(row: &Row<'_>) -> rusqlite::Result<Livro> {
    Ok(Livro {
        id: row.get(0)?,
        titulo: row.get(1)?,
        autor: row.get(2)?,
        preco: row.get(3)?,
        data_publicacao: row.get::<_, NaiveDate>(4)?,
        editora: row.get(5)?,
    })
}

#[async_trait]
impl LivroStore for SqliteLivroStore {
    async fn list(&self) -> anyhow::Result<Vec<Livro>> {
        self.db
            .call(|conn| {
                let mut stmt = conn.prepare_cached(&format!("{SELECT_LIVRO} ORDER BY id"))?;
                let livros = stmt
                    .query_map([], parse_livro_row)?
                    .collect::<rusqlite::Result<Vec<_>>>()?;
                Ok(livros)
            })
            .await
            .context("failed to list livros")
    }

    async fn get(&self, id: i64) -> anyhow::Result<Option<Livro>> {
        self.db
            .call(move |conn| {
                conn.query_row(
                    &format!("{SELECT_LIVRO} WHERE id = ?1"),
                    params![id],
                    parse_livro_row,
                )
                .optional()
            })
            .await
            .with_context(|| format!("failed to load livro {id}"))
    }

    async fn insert(&self, livro: NovoLivro) -> anyhow::Result<i64> {
        self.db
            .call(move |conn| {
                conn.execute(
                    "INSERT INTO livros (titulo, autor, preco, data_publicacao, editora)
                     VALUES (?1, ?2, ?3, ?4, ?5)",
                    params![
                        livro.titulo,
                        livro.autor,
                        livro.preco,
                        livro.data_publicacao,
                        livro.editora
                    ],
                )?;
                Ok(conn.last_insert_rowid())
            })
            .await
            .context("failed to insert livro")
    }

    async fn replace(&self, id: i64, livro: NovoLivro) -> anyhow::Result<()> {
        self.db
            .call(move |conn| {
                conn.execute(
                    "UPDATE livros
                     SET titulo = ?1, autor = ?2, preco = ?3, data_publicacao = ?4, editora = ?5
                     WHERE id = ?6",
                    params![
                        livro.titulo,
                        livro.autor,
                        livro.preco,
                        livro.data_publicacao,
                        livro.editora,
                        id
                    ],
                )?;
                Ok(())
            })
            .await
            .with_context(|| format!("failed to replace livro {id}"))
    }

    async fn remove(&self, id: i64) -> anyhow::Result<()> {
        self.db
            .call(move |conn| {
                conn.execute("DELETE FROM livros WHERE id = ?1", params![id])?;
                Ok(())
            })
            .await
            .with_context(|| format!("failed to remove livro {id}"))
    }
}
