//! HTTP handlers for `/livros`.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use livraria_http::{error::AppError, error::ErrorBody, MessageBody};
use utoipa::OpenApi;

use super::models::{DadosIncompletos, Livro, LivroPayload, NovoLivro};
use super::service::{
    CatalogError, CatalogService, MSG_ATUALIZADO, MSG_CRIADO, MSG_DELETADO,
};
use crate::utils;

#[derive(OpenApi)]
#[openapi(
    paths(list_livros, get_livro, create_livro, update_livro, delete_livro),
    components(schemas(Livro, NovoLivro, MessageBody, ErrorBody)),
    tags((name = "Livros", description = "Book catalog"))
)]
pub struct LivrosApi;

/// Routes for the catalog, bound to `service`
pub fn router(service: CatalogService) -> Router {
    Router::new()
        .route("/livros", get(list_livros).post(create_livro))
        .route(
            "/livros/{id}",
            get(get_livro).put(update_livro).delete(delete_livro),
        )
        .with_state(service)
}

/// A body that is not JSON, or not shaped like a book, is incomplete data
fn body_or_incomplete(
    payload: Result<Json<LivroPayload>, JsonRejection>,
) -> Result<LivroPayload, CatalogError> {
    match payload {
        Ok(Json(payload)) => Ok(payload),
        Err(rejection) => {
            tracing::debug!(error = %rejection, "unreadable livro payload");
            Err(DadosIncompletos { campo: "body" }.into())
        }
    }
}

#[utoipa::path(
    get,
    path = "/livros",
    tag = "Livros",
    responses(
        (status = 200, description = "Every book in storage order", body = [Livro])
    )
)]
async fn list_livros(State(service): State<CatalogService>) -> Result<Json<Vec<Livro>>, AppError> {
    Ok(Json(service.list().await?))
}

#[utoipa::path(
    get,
    path = "/livros/{id}",
    tag = "Livros",
    params(("id" = i64, Path, description = "Book identifier")),
    responses(
        (status = 200, description = "The book", body = Livro),
        (status = 404, description = "No book with this id", body = ErrorBody)
    )
)]
async fn get_livro(
    State(service): State<CatalogService>,
    Path(raw_id): Path<String>,
) -> Result<Json<Livro>, AppError> {
    let id = utils::parse_id(&raw_id).ok_or(CatalogError::NotFound)?;
    Ok(Json(service.get(id).await?))
}

#[utoipa::path(
    post,
    path = "/livros",
    tag = "Livros",
    request_body = NovoLivro,
    responses(
        (status = 201, description = "Book created", body = MessageBody),
        (status = 400, description = "Missing or invalid fields", body = ErrorBody)
    )
)]
async fn create_livro(
    State(service): State<CatalogService>,
    payload: Result<Json<LivroPayload>, JsonRejection>,
) -> Result<(StatusCode, Json<MessageBody>), AppError> {
    let payload = body_or_incomplete(payload)?;
    let id = service.create(payload).await?;
    Ok((
        StatusCode::CREATED,
        Json(MessageBody::new(MSG_CRIADO).with_id(id)),
    ))
}

#[utoipa::path(
    put,
    path = "/livros/{id}",
    tag = "Livros",
    params(("id" = i64, Path, description = "Book identifier")),
    request_body = NovoLivro,
    responses(
        (status = 200, description = "Book replaced", body = MessageBody),
        (status = 400, description = "Missing or invalid fields", body = ErrorBody),
        (status = 404, description = "No book with this id", body = ErrorBody)
    )
)]
async fn update_livro(
    State(service): State<CatalogService>,
    Path(raw_id): Path<String>,
    payload: Result<Json<LivroPayload>, JsonRejection>,
) -> Result<Json<MessageBody>, AppError> {
    let id = utils::parse_id(&raw_id).ok_or(CatalogError::NotFound)?;
    // An unreadable body validates as an empty one, after the existence check
    let payload = body_or_incomplete(payload).unwrap_or_default();
    service.update(id, payload).await?;
    Ok(Json(MessageBody::new(MSG_ATUALIZADO)))
}

#[utoipa::path(
    delete,
    path = "/livros/{id}",
    tag = "Livros",
    params(("id" = i64, Path, description = "Book identifier")),
    responses(
        (status = 200, description = "Book removed, or was already absent", body = MessageBody)
    )
)]
async fn delete_livro(
    State(service): State<CatalogService>,
    Path(raw_id): Path<String>,
) -> Result<Json<MessageBody>, AppError> {
    if let Some(id) = utils::parse_id(&raw_id) {
        service.delete(id).await?;
    }
    Ok(Json(MessageBody::new(MSG_DELETADO)))
}
