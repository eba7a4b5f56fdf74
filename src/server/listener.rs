use anyhow::anyhow;
use secrecy::{ExposeSecret, SecretString};
use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::HeaderMap,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use tower_http::trace::TraceLayer;

use crate::constants::{X_GITHUB_EVENT, X_HUB_SIGNATURE_256};
use crate::error::WebhookError;
use crate::event::WebhookEvent;
use crate::pipeline::{Decision, Pipeline};
use crate::signature;

#[derive(Clone)]
struct AppState {
    secret: Option<Arc<SecretString>>,
    pipeline: Arc<Pipeline>,
}

#[derive(Serialize, Debug)]
struct Message {
    message: String,
}

#[derive(Serialize, Debug)]
struct Status {
    status: &'static str,
}

async fn health() -> Json<Status> {
    Json(Status {
        status: "GitHub Issue Webhook is running",
    })
}

fn header<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

async fn handle(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Message>, WebhookError> {
    let secret = state.secret.as_ref().ok_or(WebhookError::SecretNotConfigured)?;
    let signature = headers
        .get(X_HUB_SIGNATURE_256)
        .ok_or(WebhookError::MissingSignature)?;
    let valid = signature
        .to_str()
        .is_ok_and(|sig| signature::verify(secret.expose_secret().as_bytes(), &body, sig));
    if !valid {
        return Err(WebhookError::InvalidSignature);
    }
    let event_type = header(&headers, X_GITHUB_EVENT).ok_or(WebhookError::MissingEventType)?;

    let decision = match WebhookEvent::parse(event_type, body)? {
        None => {
            tracing::info!("Event ignored: {event_type}");
            Decision::Ignored(crate::classify::EVENT_IGNORED.to_owned())
        }
        Some(event) => {
            tracing::info!(
                "Received {}.{} for {}#{} ({} bytes)",
                event.event_type,
                event.action,
                event.repository,
                event.issue_number,
                event.raw_body.len()
            );
            // Run detached so a dropped connection can't cancel a half-done publish.
            let pipeline = Arc::clone(&state.pipeline);
            tokio::spawn(async move { pipeline.dispatch(&event).await })
                .await
                .map_err(|e| WebhookError::Internal(anyhow!("webhook task failed: {e}")))??
        }
    };
    Ok(Json(Message {
        message: decision.message().to_owned(),
    }))
}

pub(crate) fn listen(secret: Option<SecretString>, pipeline: Pipeline) -> axum::Router {
    if secret.is_none() {
        tracing::warn!("No webhook secret configured, all webhooks will be rejected");
    }
    let state = AppState {
        secret: secret.map(Arc::new),
        pipeline: Arc::new(pipeline),
    };
    router(state).layer(TraceLayer::new_for_http())
}

fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(health))
        .route("/webhook", post(handle))
        .with_state(state)
}
