use axum::{
    Extension,
    extract::{Path, State},
    response::Response,
};

use super::respond_with_issue;
use crate::auth::AuthUser;
use crate::state::AppState;

/// GET /api/issues/{issue_id}
///
/// The issue document: course, task, student, responsible, followers,
/// status, mark, deadline and the rendered history. Teachers of the course
/// additionally get the reachable statuses and the staff list.
///
/// - `200 OK`
/// - `302 Found` to the login page when not logged in
/// - `403 Forbidden` for users unrelated to the issue
/// - `404 Not Found`
pub async fn get_issue(
    State(app_state): State<AppState>,
    Path(issue_id): Path<i64>,
    Extension(user): Extension<AuthUser>,
) -> Response {
    respond_with_issue(&app_state, issue_id, user.actor(), "Issue retrieved successfully").await
}
