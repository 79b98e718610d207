use axum::{
    extract::{rejection::FormRejection, State},
    http::{header, Method, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Form, Router,
};
use hyper::Server;
use metrics_exporter_prometheus::PrometheusHandle;
use std::net::SocketAddr;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::app::ReplyService;
use crate::config::AppConfig;
use crate::constants::*;
use crate::error::{BotError, Result};
use crate::observability::metrics;
use crate::types::{IncomingMessage, WebhookError, WebhookReply};

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub replies: ReplyService,
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        replies: ReplyService,
        metrics: Option<PrometheusHandle>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            replies,
            metrics,
        }
    }
}

/// Landing endpoint, also used by Railway's default health check
async fn root() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "WhatsApp bot activo",
        "endpoint": WHATSAPP_WEBHOOK_ROUTE,
    }))
}

async fn test_endpoint(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "message": "Bot funcionando",
        "webhook_url": state.config.webhook_url(),
    }))
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "llm_configured": state.replies.model_configured(),
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

async fn metrics_endpoint(State(state): State<AppState>) -> Response {
    match &state.metrics {
        Some(handle) => (
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            handle.render(),
        )
            .into_response(),
        None => (StatusCode::NOT_FOUND, "metrics disabled").into_response(),
    }
}

/// Twilio webhook for inbound WhatsApp messages.
///
/// Unreadable requests are answered with 200 and an error body so Twilio does not retry.
async fn whatsapp_webhook(
    State(state): State<AppState>,
    form: std::result::Result<Form<IncomingMessage>, FormRejection>,
) -> Response {
    let Form(message) = match form {
        Ok(form) => form,
        Err(rejection) => {
            metrics::webhook::request_error();
            error!(error = %rejection, "Could not read webhook form");
            return Json(WebhookError::new(rejection.body_text())).into_response();
        }
    };

    metrics::webhook::message_received();
    let request_id = message
        .message_sid
        .clone()
        .unwrap_or_else(|| Uuid::new_v4().to_string());
    let sender = message.sender();
    let span = info_span!("whatsapp_message", %request_id, channel = ?sender.channel);

    async move {
        info!("Mensaje de {}: {}", message.from, message.body);
        let bot_response = state.replies.reply(&message).await;
        Json(WebhookReply::received(message.from, bot_response)).into_response()
    }
    .instrument(span)
    .await
}

/// Create the router with every route the service exposes
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any);

    Router::new()
        .route(ROOT_ROUTE, get(root))
        .route(TEST_ROUTE, get(test_endpoint))
        .route(HEALTH_ROUTE, get(health))
        .route(METRICS_ROUTE, get(metrics_endpoint))
        .route(WHATSAPP_WEBHOOK_ROUTE, post(whatsapp_webhook))
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
}

/// Resolve `server.host` (IP literal or hostname such as `localhost`) to a bind address
pub async fn socket_addr(config: &AppConfig) -> Result<SocketAddr> {
    let host = config.server.host.as_str();
    let mut addrs = tokio::net::lookup_host((host, config.server.port))
        .await
        .map_err(|e| BotError::Config(format!("Invalid host '{}': {}", host, e)))?;
    addrs
        .next()
        .ok_or_else(|| BotError::Config(format!("Host '{}' resolved to no address", host)))
}

/// Serve until SIGINT/SIGTERM, then drain in-flight requests
pub async fn start_server(state: AppState) -> Result<()> {
    let addr = socket_addr(&state.config).await?;
    let webhook_url = state.config.webhook_url();
    let app = create_router(state);

    info!(%addr, "HTTP server listening");
    info!(%webhook_url, "Configure this URL as the Twilio WhatsApp webhook");

    Server::try_bind(&addr)
        .map_err(|e| BotError::Server(format!("Failed to bind {}: {}", addr, e)))?
        .serve(app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| BotError::Server(e.to_string()))?;

    info!("HTTP server stopped");
    Ok(())
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = sigterm.recv() => info!("Received SIGTERM, shutting down"),
                    _ = tokio::signal::ctrl_c() => info!("Received Ctrl+C, shutting down"),
                }
                return;
            }
            Err(e) => warn!(error = %e, "Failed to register SIGTERM handler"),
        }
    }

    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
    info!("Received Ctrl+C, shutting down");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with_host(host: &str, port: u16) -> AppConfig {
        let mut config = AppConfig::default();
        config.server.host = host.to_string();
        config.server.port = port;
        config
    }

    #[tokio::test]
    async fn ip_literal_binds_as_given() {
        let addr = socket_addr(&config_with_host("0.0.0.0", 8080)).await.unwrap();
        assert_eq!(addr, SocketAddr::from(([0, 0, 0, 0], 8080)));
    }

    #[tokio::test]
    async fn hostname_is_resolved() {
        let addr = socket_addr(&config_with_host("localhost", 3000)).await.unwrap();
        assert!(addr.ip().is_loopback());
        assert_eq!(addr.port(), 3000);
    }
}
