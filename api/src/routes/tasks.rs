use axum::{
    Extension, Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use services::{history::issue_view, issue_service};
use util::lang::Language;

use crate::auth::AuthUser;
use crate::response::ApiResponse;
use crate::routes::common::service_error_response;
use crate::state::AppState;

pub fn tasks_routes() -> Router<AppState> {
    Router::new().route("/{task_id}/students/{student_id}/issue", get(get_or_create_issue))
}

/// GET /api/tasks/{task_id}/students/{student_id}/issue
///
/// Returns the student's issue for the task, creating it on first access.
/// Students may open only their own; course teachers and admins anyone's.
///
/// - `200 OK` with the issue document
/// - `403 Forbidden`
/// - `404 Not Found` for an unknown task or student
async fn get_or_create_issue(
    State(app_state): State<AppState>,
    Path((task_id, student_id)): Path<(i64, i64)>,
    Extension(user): Extension<AuthUser>,
) -> Response {
    let db = app_state.db();
    let actor = user.actor();

    let issue = match issue_service::get_or_create(db, actor, task_id, student_id).await {
        Ok(issue) => issue,
        Err(e) => return service_error_response(e),
    };

    match issue_view(
        db,
        issue.id,
        actor,
        app_state.transitions(),
        Language::from_config(),
        app_state.overlay(),
    )
    .await
    {
        Ok(view) => (
            StatusCode::OK,
            Json(ApiResponse::success(view, "Issue retrieved successfully")),
        )
            .into_response(),
        Err(e) => service_error_response(e),
    }
}
