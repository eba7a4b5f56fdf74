use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Everything that ends a webhook request early.
#[derive(thiserror::Error, Debug)]
pub(crate) enum WebhookError {
    #[error("Webhook secret not configured")]
    SecretNotConfigured,
    #[error("Missing signature header")]
    MissingSignature,
    #[error("Invalid signature")]
    InvalidSignature,
    #[error("Missing event header")]
    MissingEventType,
    #[error("Invalid payload: {0}")]
    InvalidPayload(#[from] serde_json::Error),
    #[error("Failed to clone repository")]
    CloneFailed(#[source] anyhow::Error),
    #[error("Failed to fetch issue details")]
    FetchFailed(#[source] anyhow::Error),
    /// Carries what was being posted: a comment or a reply
    #[error("Failed to post {0}")]
    PublishFailed(&'static str),
    #[error("Internal error")]
    Internal(#[source] anyhow::Error),
}

impl WebhookError {
    pub(crate) fn status(&self) -> StatusCode {
        match self {
            Self::MissingSignature | Self::MissingEventType | Self::InvalidPayload(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::InvalidSignature => StatusCode::UNAUTHORIZED,
            Self::SecretNotConfigured
            | Self::CloneFailed(_)
            | Self::FetchFailed(_)
            | Self::PublishFailed(_)
            | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for WebhookError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self {
            Self::CloneFailed(e) | Self::FetchFailed(e) | Self::Internal(e) => {
                tracing::error!("{self}: {e:#}");
            }
            _ if status.is_server_error() => tracing::error!("{self}"),
            _ => tracing::warn!("Rejected webhook: {self}"),
        }
        (status, Json(json!({ "detail": self.to_string() }))).into_response()
    }
}
