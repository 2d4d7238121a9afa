//! Webhook HTTP server (single port).

use crate::config::GatewayConfig;
use crate::normalize::Normalizer;
use crate::slack::{signature, InboundEvent, WebhookPayload};
use anyhow::{Context, Result};
use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::json;
use std::future::Future;
use std::sync::Arc;

/// Shared state for the webhook handlers.
#[derive(Clone)]
pub struct GatewayState {
    /// Slack signing secret used to verify every POST.
    pub signing_secret: Arc<str>,
    /// Accepted request timestamp skew, in seconds.
    pub replay_window_secs: u64,
    pub normalizer: Normalizer,
}

/// Routes: `GET /` (liveness) and `POST /` (events).
pub fn router(state: GatewayState) -> Router {
    Router::new()
        .route("/", get(health_http).post(events_webhook))
        .with_state(state)
}

/// Run the webhook server on config.bind:config.port until SIGINT/SIGTERM.
pub async fn run_gateway(config: &GatewayConfig, state: GatewayState) -> Result<()> {
    let bind_addr = format!("{}:{}", config.bind.trim(), config.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("binding to {}", bind_addr))?;
    log::info!("webhook endpoint listening on {}", bind_addr);
    serve(listener, state, shutdown_signal()).await?;
    log::info!("webhook endpoint stopped");
    Ok(())
}

/// Serve on an already-bound listener until `shutdown` completes.
pub async fn serve<F>(listener: tokio::net::TcpListener, state: GatewayState, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .await
        .context("webhook server exited")
}

/// Future that completes when the process should shut down (SIGINT or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            log::error!("failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut s) => {
                s.recv().await;
            }
            Err(e) => {
                log::error!("failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    log::info!("shutdown signal received");
}

/// GET / returns 200 with an empty body (for probes).
async fn health_http() -> StatusCode {
    StatusCode::OK
}

/// POST / — verifies the Slack signature, answers the handshake, hands callback events to the normalizer.
async fn events_webhook(
    State(state): State<GatewayState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    if let Err(e) = signature::verify_request(
        &headers,
        &body,
        &state.signing_secret,
        state.replay_window_secs,
    ) {
        log::warn!("webhook: rejecting request: {}", e);
        return StatusCode::UNAUTHORIZED.into_response();
    }

    let payload: WebhookPayload = match serde_json::from_slice(&body) {
        Ok(p) => p,
        Err(e) => {
            log::warn!("webhook: unparseable payload: {}", e);
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    match payload {
        WebhookPayload::UrlVerification { challenge } => {
            log::info!("webhook: answering url_verification");
            (StatusCode::OK, Json(json!({ "challenge": challenge }))).into_response()
        }
        WebhookPayload::EventCallback { event } => match InboundEvent::decode(&event) {
            Ok(inbound) => {
                state.normalizer.dispatch(inbound, event);
                StatusCode::OK.into_response()
            }
            Err(e) => {
                log::warn!("webhook: unparseable callback event: {}", e);
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            }
        },
        WebhookPayload::Unsupported => StatusCode::NOT_ACCEPTABLE.into_response(),
    }
}
