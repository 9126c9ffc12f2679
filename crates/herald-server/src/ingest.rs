//! `POST /send-notification`: notification ingestion.

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use herald_hub::Notification;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::errors::ApiError;
use crate::server::AppState;

/// Ingestion request body.
#[derive(Debug, Deserialize)]
pub struct NotificationRequest {
    /// Text to fan out. `null` and absent are treated as empty.
    #[serde(default)]
    pub message: Option<String>,
}

/// Ingestion success body.
#[derive(Debug, Serialize)]
pub struct NotificationAccepted {
    /// Confirmation text.
    pub status: &'static str,
}

/// Confirmation returned for every accepted notification.
pub const ACCEPTED_STATUS: &str = "Notification sent to all connected clients";

/// Validate the body and hand the notification to the hub.
pub async fn send_notification(
    State(state): State<AppState>,
    payload: Result<Json<NotificationRequest>, JsonRejection>,
) -> Result<Json<NotificationAccepted>, ApiError> {
    let Json(request) = payload.map_err(|rejection| {
        debug!(%rejection, "rejected notification body");
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ApiError::PayloadTooLarge
        } else {
            ApiError::InvalidBody
        }
    })?;

    let message = request.message.unwrap_or_default();
    if message.is_empty() {
        return Err(ApiError::EmptyMessage);
    }

    let notification = Notification::new(message);
    let bytes = notification.len();
    state
        .hub
        .broadcast(notification)
        .await
        .map_err(|_| ApiError::HubUnavailable)?;
    info!(bytes, clients = state.hub.client_count(), "notification accepted");

    Ok(Json(NotificationAccepted {
        status: ACCEPTED_STATUS,
    }))
}
