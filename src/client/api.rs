//! `reqwest` client for the catalog API.

use livraria_http::{error::ErrorBody, MessageBody};
use livraria_kernel::settings::ClientSettings;
use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::modules::livros::models::{Livro, NovoLivro};

#[derive(Debug, Error)]
pub enum ClientError {
    /// The API could not be reached at all
    #[error("Erro de conexão com a API")]
    Conexao(#[source] reqwest::Error),

    #[error("Livro não encontrado")]
    NaoEncontrado,

    /// The API answered with an error status
    #[error("{message}")]
    Api { status: u16, message: String },

    /// The API answered, but not with what we expected
    #[error("Resposta inválida da API")]
    Resposta(#[source] reqwest::Error),
}

pub type ClientResult<T> = Result<T, ClientError>;

/// Catalog API client.
///
/// Deletes go to `delete_base_url`, which defaults to the main base URL.
#[derive(Debug, Clone)]
pub struct CatalogClient {
    http: reqwest::Client,
    base_url: String,
    delete_base_url: String,
}

impl CatalogClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = trim_base(base_url.into());
        Self {
            http: reqwest::Client::new(),
            delete_base_url: base_url.clone(),
            base_url,
        }
    }

    pub fn from_settings(settings: &ClientSettings) -> Self {
        Self::new(settings.api_url.clone()).with_delete_base_url(settings.delete_base_url())
    }

    pub fn with_delete_base_url(mut self, url: impl Into<String>) -> Self {
        self.delete_base_url = trim_base(url.into());
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Greeting from `GET /`
    pub async fn status(&self) -> ClientResult<String> {
        let response = self.send(self.http.get(format!("{}/", self.base_url))).await?;
        let body: MessageBody = decode(response).await?;
        Ok(body.message)
    }

    pub async fn list(&self) -> ClientResult<Vec<Livro>> {
        let response = self
            .send(self.http.get(format!("{}/livros", self.base_url)))
            .await?;
        decode(response).await
    }

    pub async fn get(&self, id: i64) -> ClientResult<Livro> {
        let response = self
            .send(self.http.get(format!("{}/livros/{}", self.base_url, id)))
            .await?;
        decode(response).await
    }

    /// Create a book; returns the id when the server reports one
    pub async fn create(&self, livro: &NovoLivro) -> ClientResult<Option<i64>> {
        let response = self
            .send(
                self.http
                    .post(format!("{}/livros", self.base_url))
                    .json(livro),
            )
            .await?;
        let body: MessageBody = decode(response).await?;
        Ok(body.id)
    }

    pub async fn update(&self, id: i64, livro: &NovoLivro) -> ClientResult<()> {
        self.send(
            self.http
                .put(format!("{}/livros/{}", self.base_url, id))
                .json(livro),
        )
        .await?;
        Ok(())
    }

    pub async fn delete(&self, id: i64) -> ClientResult<()> {
        self.send(
            self.http
                .delete(format!("{}/livros/{}", self.delete_base_url, id)),
        )
        .await?;
        Ok(())
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> ClientResult<Response> {
        let response = request.send().await.map_err(ClientError::Conexao)?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        tracing::debug!(status = status.as_u16(), url = %response.url(), "catalog API error");
        if status == StatusCode::NOT_FOUND {
            return Err(ClientError::NaoEncontrado);
        }

        let message = match response.json::<ErrorBody>().await {
            Ok(body) => body.error,
            Err(_) => status
                .canonical_reason()
                .unwrap_or("erro desconhecido")
                .to_string(),
        };
        Err(ClientError::Api {
            status: status.as_u16(),
            message,
        })
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> ClientResult<T> {
    response.json().await.map_err(ClientError::Resposta)
}

fn trim_base(url: String) -> String {
    url.trim_end_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_urls_drop_trailing_slash() {
        let client = CatalogClient::new("http://localhost:3333/");
        assert_eq!(client.base_url(), "http://localhost:3333");
        assert_eq!(client.delete_base_url, "http://localhost:3333");
    }

    #[test]
    fn delete_url_comes_from_settings() {
        let settings = ClientSettings {
            api_url: "http://web:3000/api".to_string(),
            delete_url: Some("http://api:3333/".to_string()),
        };
        let client = CatalogClient::from_settings(&settings);
        assert_eq!(client.base_url(), "http://web:3000/api");
        assert_eq!(client.delete_base_url, "http://api:3333");
    }

    #[tokio::test]
    async fn unreachable_api_is_a_connection_error() {
        let client = CatalogClient::new("http://127.0.0.1:9");
        let err = client.list().await.unwrap_err();
        assert!(matches!(err, ClientError::Conexao(_)));
        assert_eq!(err.to_string(), "Erro de conexão com a API");
    }
}
