use std::sync::Arc;

use livraria_http::error::AppError;
use thiserror::Error;

use super::models::{DadosIncompletos, Livro, LivroPayload, NovoLivro};
use super::store::LivroStore;

pub const MSG_NAO_ENCONTRADO: &str = "Livro não encontrado";
pub const MSG_CRIADO: &str = "Livro criado";
pub const MSG_ATUALIZADO: &str = "Livro atualizado";
pub const MSG_DELETADO: &str = "Livro deletado";

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Livro não encontrado")]
    NotFound,

    #[error(transparent)]
    Incomplete(#[from] DadosIncompletos),

    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

impl From<CatalogError> for AppError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::NotFound => AppError::not_found(MSG_NAO_ENCONTRADO),
            CatalogError::Incomplete(e) => {
                tracing::debug!(campo = e.campo, "payload rejected");
                AppError::bad_request(e.to_string())
            }
            CatalogError::Store(e) => AppError::Internal(e),
        }
    }
}

/// Catalog operations over an owned store.
#[derive(Clone)]
pub struct CatalogService {
    store: Arc<dyn LivroStore>,
}

impl CatalogService {
    pub fn new(store: Arc<dyn LivroStore>) -> Self {
        Self { store }
    }

    /// Every book exactly as stored
    pub async fn list(&self) -> Result<Vec<Livro>, CatalogError> {
        Ok(self.store.list().await?)
    }

    pub async fn get(&self, id: i64) -> Result<Livro, CatalogError> {
        self.store.get(id).await?.ok_or(CatalogError::NotFound)
    }

    /// Validate and store a new book, returning its id
    pub async fn create(&self, payload: LivroPayload) -> Result<i64, CatalogError> {
        let novo = NovoLivro::try_from(payload)?;
        let id = self.store.insert(novo).await?;
        tracing::info!(id, "livro created");
        Ok(id)
    }

    /// Replace every field of an existing book.
    ///
    /// Existence is checked before the payload is validated, so an unknown id
    /// reports `NotFound` even for an incomplete payload.
    pub async fn update(&self, id: i64, payload: LivroPayload) -> Result<(), CatalogError> {
        self.get(id).await?;
        let novo = NovoLivro::try_from(payload)?;
        self.store.replace(id, novo).await?;
        tracing::info!(id, "livro updated");
        Ok(())
    }

    /// Remove a book; succeeds whether or not it existed
    pub async fn delete(&self, id: i64) -> Result<(), CatalogError> {
        self.store.remove(id).await?;
        tracing::info!(id, "livro deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::livros::store::MemoryLivroStore;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};

    fn service() -> CatalogService {
        CatalogService::new(Arc::new(MemoryLivroStore::new()))
    }

    fn payload(titulo: &str) -> LivroPayload {
        LivroPayload {
            titulo: Some(titulo.to_string()),
            autor: Some("Clarice Lispector".to_string()),
            preco: Some(39.9),
            data_publicacao: Some("1977-10-26".to_string()),
            editora: Some("Rocco".to_string()),
        }
    }

    #[tokio::test]
    async fn created_book_is_retrievable_and_listed() {
        let service = service();
        let id = service.create(payload("A Hora da Estrela")).await.unwrap();

        let livro = service.get(id).await.unwrap();
        assert_eq!(livro.titulo, "A Hora da Estrela");
        assert_eq!(service.list().await.unwrap(), vec![livro]);
    }

    #[tokio::test]
    async fn unknown_id_is_not_found() {
        let service = service();
        assert!(matches!(
            service.get(99).await,
            Err(CatalogError::NotFound)
        ));
    }

    #[tokio::test]
    async fn create_rejects_zero_price() {
        let service = service();
        let mut raw = payload("Grátis");
        raw.preco = Some(0.0);

        assert!(matches!(
            service.create(raw).await,
            Err(CatalogError::Incomplete(_))
        ));
        assert!(service.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn update_checks_existence_before_payload() {
        let service = service();
        assert!(matches!(
            service.update(7, LivroPayload::default()).await,
            Err(CatalogError::NotFound)
        ));
    }

    /// Memory store that counts point reads.
    #[derive(Default)]
    struct CountingStore {
        inner: MemoryLivroStore,
        reads: AtomicUsize,
    }

    #[async_trait]
    impl LivroStore for CountingStore {
        async fn list(&self) -> anyhow::Result<Vec<Livro>> {
            self.inner.list().await
        }

        async fn get(&self, id: i64) -> anyhow::Result<Option<Livro>> {
            self.reads.fetch_add(1, AtomicOrdering::SeqCst);
            self.inner.get(id).await
        }

        async fn insert(&self, livro: NovoLivro) -> anyhow::Result<i64> {
            self.inner.insert(livro).await
        }

        async fn replace(&self, id: i64, livro: NovoLivro) -> anyhow::Result<()> {
            self.inner.replace(id, livro).await
        }

        async fn remove(&self, id: i64) -> anyhow::Result<()> {
            self.inner.remove(id).await
        }
    }

    #[tokio::test]
    async fn update_reads_the_store_once() {
        let store = Arc::new(CountingStore::default());
        let service = CatalogService::new(store.clone());
        let id = service.create(payload("Felicidade Clandestina")).await.unwrap();

        service.update(id, payload("A Maçã no Escuro")).await.unwrap();
        assert_eq!(store.reads.load(AtomicOrdering::SeqCst), 1);

        assert!(matches!(
            service.update(id, LivroPayload::default()).await,
            Err(CatalogError::Incomplete(_))
        ));
        assert_eq!(store.reads.load(AtomicOrdering::SeqCst), 2);
    }

    #[tokio::test]
    async fn update_is_a_full_replace() {
        let service = service();
        let id = service.create(payload("Perto do Coração Selvagem")).await.unwrap();

        let mut replacement = payload("Água Viva");
        replacement.editora = None;
        service.update(id, replacement).await.unwrap();

        let livro = service.get(id).await.unwrap();
        assert_eq!(livro.titulo, "Água Viva");
        assert_eq!(livro.editora, None);
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let service = service();
        let id = service.create(payload("Laços de Família")).await.unwrap();

        service.delete(id).await.unwrap();
        service.delete(id).await.unwrap();
        assert!(matches!(service.get(id).await, Err(CatalogError::NotFound)));
    }

    #[test]
    fn errors_map_to_http_statuses() {
        use axum::http::StatusCode;

        assert_eq!(
            AppError::from(CatalogError::NotFound).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::from(CatalogError::Incomplete(DadosIncompletos { campo: "autor" })).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::from(CatalogError::Store(anyhow::anyhow!("disk full"))).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
