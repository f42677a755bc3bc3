//! REST endpoints for channel administration
//!
//! Stateless request/response surface next to the real-time channel.
//! Status updates and deletions here also broadcast to all connected
//! observers via the coordinator.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::warn;

use zaplink_protocol::{ChannelRecord, UpdateStatusRequest};

use crate::state::AppState;

/// `GET /numbers` — all registered channels
pub async fn list_numbers(State(state): State<Arc<AppState>>) -> Json<Vec<ChannelRecord>> {
    Json(state.registry().list().await)
}

/// `PUT /numbers/{id}/status` — set a channel's status
pub async fn update_number_status(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<UpdateStatusRequest>,
) -> Response {
    match state.coordinator().set_status(&id, req.status).await {
        Ok(record) => (
            StatusCode::OK,
            Json(json!({
                "message": format!("Status of {} updated to {}", id, record.status)
            })),
        )
            .into_response(),
        Err(err) => {
            warn!(
                component = "http",
                event = "numbers.status.rejected",
                phone = %id,
                error = %err,
                "Status update rejected"
            );
            (
                StatusCode::NOT_FOUND,
                Json(json!({ "error": err.to_string() })),
            )
                .into_response()
        }
    }
}

/// `DELETE /numbers/{id}` — remove a channel
pub async fn delete_number(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Response {
    match state.coordinator().delete_channel(&id).await {
        Ok(record) => (
            StatusCode::OK,
            Json(json!({ "message": format!("Number {} deleted", record.phone) })),
        )
            .into_response(),
        Err(err) => {
            warn!(
                component = "http",
                event = "numbers.delete.rejected",
                phone = %id,
                error = %err,
                "Deletion rejected"
            );
            (
                StatusCode::NOT_FOUND,
                Json(json!({ "error": err.to_string() })),
            )
                .into_response()
        }
    }
}
