//! Create and edit view state machines.
//!
//! Edit: `Idle -> Loading -> Ready | LoadError`, then
//! `Ready -> Submitting -> Ready`. A load error is terminal.

use super::api::{CatalogClient, ClientResult};
use super::form::{BookForm, Field, FormState};

pub const MSG_ERRO_BUSCAR: &str = "Erro ao buscar livro";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Loading,
    Ready,
    LoadError,
    Submitting,
}

/// Result of a submit that reached a decision without a transport error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Saved on the server; the caller navigates away
    Saved,
    /// Form messages were set and nothing was sent
    Invalid,
    /// The view is not in a state that accepts submissions
    NotReady,
}

#[derive(Debug, Clone)]
pub struct EditView {
    id: i64,
    phase: Phase,
    form: FormState,
}

impl EditView {
    pub fn new(id: i64) -> Self {
        Self {
            id,
            phase: Phase::Idle,
            form: FormState::default(),
        }
    }

    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn form(&self) -> &FormState {
        &self.form
    }

    /// Fetch the record and prefill the form. Only runs from `Idle`.
    pub async fn load(&mut self, client: &CatalogClient) {
        if self.phase != Phase::Idle {
            return;
        }
        self.phase = Phase::Loading;

        match client.get(self.id).await {
            Ok(livro) => {
                self.form = FormState::new(BookForm::from_livro(&livro));
                self.phase = Phase::Ready;
            }
            Err(e) => {
                tracing::warn!(id = self.id, error = %e, "failed to load book");
                self.phase = Phase::LoadError;
            }
        }
    }

    pub fn load_error(&self) -> Option<&'static str> {
        (self.phase == Phase::LoadError).then_some(MSG_ERRO_BUSCAR)
    }

    /// Edits are accepted only once the record is loaded.
    pub fn set_field(&mut self, field: Field, value: impl Into<String>) -> bool {
        if self.phase != Phase::Ready {
            return false;
        }
        self.form.set(field, value);
        true
    }

    /// Validate and send the full replacement.
    ///
    /// The view is back in `Ready` afterwards, whatever the outcome.
    pub async fn submit(&mut self, client: &CatalogClient) -> ClientResult<SubmitOutcome> {
        if self.phase != Phase::Ready {
            return Ok(SubmitOutcome::NotReady);
        }
        let Some(livro) = self.form.validate() else {
            return Ok(SubmitOutcome::Invalid);
        };

        self.phase = Phase::Submitting;
        let result = client.update(self.id, &livro).await;
        self.phase = Phase::Ready;

        result.map(|()| SubmitOutcome::Saved)
    }
}

#[derive(Debug, Clone, Default)]
pub struct CreateView {
    form: FormState,
    created_id: Option<i64>,
}

impl CreateView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn form(&self) -> &FormState {
        &self.form
    }

    /// Id reported for the last successful create, if any.
    pub fn created_id(&self) -> Option<i64> {
        self.created_id
    }

    pub fn set_field(&mut self, field: Field, value: impl Into<String>) {
        self.form.set(field, value);
    }

    /// Validate and create. A successful create clears the form.
    pub async fn submit(&mut self, client: &CatalogClient) -> ClientResult<SubmitOutcome> {
        let Some(livro) = self.form.validate() else {
            return Ok(SubmitOutcome::Invalid);
        };

        let id = client.create(&livro).await?;
        self.created_id = id;
        self.form.reset();
        Ok(SubmitOutcome::Saved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::api::ClientError;
    use crate::client::form::MSG_TITULO;

    fn unreachable() -> CatalogClient {
        CatalogClient::new("http://127.0.0.1:9")
    }

    #[tokio::test]
    async fn failed_load_is_terminal() {
        let mut view = EditView::new(7);
        assert_eq!(view.phase(), Phase::Idle);

        view.load(&unreachable()).await;
        assert_eq!(view.phase(), Phase::LoadError);
        assert_eq!(view.load_error(), Some(MSG_ERRO_BUSCAR));

        // no retry from the error state
        view.load(&unreachable()).await;
        assert_eq!(view.phase(), Phase::LoadError);
        assert!(!view.set_field(Field::Titulo, "x"));
        assert_eq!(
            view.submit(&unreachable()).await.unwrap(),
            SubmitOutcome::NotReady
        );
    }

    #[tokio::test]
    async fn invalid_create_never_touches_the_network() {
        let mut view = CreateView::new();
        view.set_field(Field::Autor, "Clarice Lispector");

        let outcome = view.submit(&unreachable()).await.unwrap();

        assert_eq!(outcome, SubmitOutcome::Invalid);
        assert_eq!(view.form().errors().get(Field::Titulo), Some(MSG_TITULO));
        assert_eq!(view.form().errors().get(Field::Autor), None);
    }

    #[tokio::test]
    async fn failed_create_keeps_the_form() {
        let mut view = CreateView::new();
        view.set_field(Field::Titulo, "A Hora da Estrela");
        view.set_field(Field::Autor, "Clarice Lispector");
        view.set_field(Field::Preco, "29.9");
        view.set_field(Field::DataPublicacao, "1977-01-01");
        view.set_field(Field::Editora, "Rocco");

        let err = view.submit(&unreachable()).await.unwrap_err();

        assert!(matches!(err, ClientError::Conexao(_)));
        assert_eq!(view.form().form().titulo, "A Hora da Estrela");
        assert_eq!(view.created_id(), None);
    }
}
