//! Webhook HTTP server.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tracing::{error, info, instrument, warn};

use crate::line::{verify_signature, WebhookPayload};
use crate::pipeline::ReceiptService;

const SIGNATURE_HEADER: &str = "x-line-signature";

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<ReceiptService>,
    pub channel_secret: Arc<str>,
}

pub fn router(state: AppState, webhook_path: &str) -> Router {
    Router::new()
        .route(webhook_path, post(webhook_handler))
        .route("/health", get(|| async { "OK" }))
        .with_state(state)
}

/// Verify, parse, acknowledge. Each event is processed on its own task so
/// the platform gets its 200 without waiting for OCR.
#[instrument(skip_all)]
async fn webhook_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> StatusCode {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    if !verify_signature(&state.channel_secret, &body, signature) {
        warn!("rejected webhook with bad signature");
        return StatusCode::UNAUTHORIZED;
    }

    let payload: WebhookPayload = match serde_json::from_slice(&body) {
        Ok(p) => p,
        Err(e) => {
            warn!(error = %e, "malformed webhook payload");
            return StatusCode::BAD_REQUEST;
        }
    };

    info!(
        events = payload.events.len(),
        destination = payload.destination.as_deref().unwrap_or("-"),
        "webhook received"
    );

    for event in payload.events {
        let service = state.service.clone();
        tokio::spawn(async move {
            if let Err(e) = service.handle_event(&event).await {
                error!(error = %e, event_type = %event.event_type, "event handling failed");
            }
        });
    }

    StatusCode::OK
}

pub async fn serve(addr: SocketAddr, state: AppState, webhook_path: &str) -> Result<()> {
    let app = router(state, webhook_path);

    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("bind {addr}"))?;
    info!(%addr, webhook_path, "kakeibo listening");
    axum::serve(listener, app).await.context("http server")?;

    Ok(())
}
