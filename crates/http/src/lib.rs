//! HTTP server facade for livraria with Axum, error handling, and OpenAPI support.

use std::future::Future;

use anyhow::Context;
use axum::{http::HeaderValue, routing::get, Json, Router};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use utoipa::ToSchema;

use livraria_kernel::{settings::Settings, ModuleRegistry};

pub mod error;
pub mod router;

use router::RouterBuilder;

/// Greeting returned by `GET /`
pub const ROOT_MESSAGE: &str = "API da livraria está funcionando!";

/// Acknowledgement body for successful requests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct MessageBody {
    pub message: String,
    /// Identifier of the resource the request created, when there is one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
}

impl MessageBody {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            id: None,
        }
    }

    pub fn with_id(mut self, id: i64) -> Self {
        self.id = Some(id);
        self
    }
}

/// Start the HTTP server with the given module registry and serve until Ctrl-C
pub async fn start_server(registry: &ModuleRegistry, settings: &Settings) -> anyhow::Result<()> {
    let address = settings.server.bind_address();
    tracing::info!("starting HTTP server on {}", address);

    let app = build_router(registry, settings).context("failed to build HTTP router")?;

    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("failed to bind to {}", address))?;

    serve(listener, app, shutdown_signal()).await
}

/// Serve `app` on an already bound listener until `shutdown` resolves
pub async fn serve<F>(listener: TcpListener, app: Router, shutdown: F) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let local = listener
        .local_addr()
        .context("failed to read listener address")?;
    tracing::info!("HTTP server listening on http://{}", local);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .context("HTTP server failed")?;

    tracing::info!("HTTP server stopped");
    Ok(())
}

/// Build the main HTTP router with all module routes mounted
pub fn build_router(registry: &ModuleRegistry, settings: &Settings) -> anyhow::Result<Router> {
    let origin = HeaderValue::from_str(&settings.cors.origin)
        .with_context(|| format!("invalid CORS origin '{}'", settings.cors.origin))?;

    let mut router_builder = RouterBuilder::new()
        .with_tracing()
        .with_cors(origin)
        .with_request_id()
        .with_timeout(settings.server.request_timeout_ms)
        .route("/", get(root))
        .route("/healthz", get(health_check));

    for module in registry.modules() {
        tracing::info!(module = module.name(), "mounting module routes");
        router_builder = router_builder.mount_module(module.routes());
    }

    Ok(router_builder.with_openapi(registry).build())
}

async fn root() -> Json<MessageBody> {
    Json(MessageBody::new(ROOT_MESSAGE))
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "ok"
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::Request, http::StatusCode};
    use tower::ServiceExt;

    #[tokio::test]
    async fn root_answers_with_message() {
        let router = build_router(&ModuleRegistry::new(), &Settings::default()).unwrap();

        let response = router
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: MessageBody = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body, MessageBody::new(ROOT_MESSAGE));
    }

    #[test]
    fn invalid_cors_origin_is_reported() {
        let mut settings = Settings::default();
        settings.cors.origin = "http://bad\norigin".to_string();

        let err = build_router(&ModuleRegistry::new(), &settings).unwrap_err();
        assert!(err.to_string().contains("invalid CORS origin"));
    }

    #[test]
    fn message_body_omits_missing_id() {
        let json = serde_json::to_value(MessageBody::new("Livro deletado")).unwrap();
        assert_eq!(json, serde_json::json!({ "message": "Livro deletado" }));

        let json = serde_json::to_value(MessageBody::new("Livro criado").with_id(7)).unwrap();
        assert_eq!(json, serde_json::json!({ "message": "Livro criado", "id": 7 }));
    }
}
