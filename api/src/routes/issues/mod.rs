//! `/issues` route group.
//!
//! - `GET /issues/{issue_id}` → issue document with history
//! - `POST /issues/{issue_id}` → apply one form (`form_name` selects it)
//! - `POST /issues/upload` → multipart comment with attachments

pub mod get;
pub mod post;

use axum::{
    Json, Router,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get as get_route, post as post_route},
};
use services::{access::Actor, history::issue_view};
use util::lang::Language;

use crate::response::ApiResponse;
use crate::routes::common::service_error_response;
use crate::state::AppState;

pub fn issues_routes() -> Router<AppState> {
    Router::new()
        .route("/upload", post_route(post::upload))
        .route(
            "/{issue_id}",
            get_route(get::get_issue).post(post::submit_form),
        )
}

/// Renders the issue as `actor` sees it, wrapped in the response envelope.
pub(crate) async fn respond_with_issue(
    app_state: &AppState,
    issue_id: i64,
    actor: Actor,
    message: &str,
) -> Response {
    match issue_view(
        app_state.db(),
        issue_id,
        actor,
        app_state.transitions(),
        Language::from_config(),
        app_state.overlay(),
    )
    .await
    {
        Ok(view) => (StatusCode::OK, Json(ApiResponse::success(view, message))).into_response(),
        Err(e) => service_error_response(e),
    }
}
