//! Inbound notifications from the review board.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
};
use serde::Deserialize;
use services::issue_service::record_review_reply;

use crate::response::ApiResponse;
use crate::routes::common::service_error_response;
use crate::state::AppState;

pub fn review_board_routes() -> Router<AppState> {
    Router::new().route("/{review_id}/messages", post(review_message))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ReviewMessage {
    /// Review board username of whoever replied.
    pub author: Option<String>,
}

/// POST /api/rb/{review_id}/messages
///
/// ### Request Body
/// ```json
/// { "author": "teacher" }
/// ```
///
/// - `201 Created` with the new history entry
/// - `404 Not Found` when no issue owns the review request
async fn review_message(
    State(app_state): State<AppState>,
    Path(review_id): Path<i64>,
    Json(body): Json<ReviewMessage>,
) -> Response {
    match record_review_reply(app_state.db(), review_id, body.author.as_deref()).await {
        Ok(entry) => (
            StatusCode::CREATED,
            Json(ApiResponse::success(entry, "Review comment recorded")),
        )
            .into_response(),
        Err(e) => service_error_response(e),
    }
}
