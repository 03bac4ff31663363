use axum::{
    Extension, Json,
    body::Bytes,
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::Value;
use services::{
    issue_form::IssueForm,
    issue_service::{self, Upload},
};
use tracing::debug;

use super::respond_with_issue;
use crate::auth::AuthUser;
use crate::response::{ApiResponse, Empty};
use crate::routes::common::service_error_response;
use crate::state::AppState;

/// POST /api/issues/{issue_id}
///
/// Applies one form to the issue. The body is a JSON object whose
/// `form_name` is one of `responsible_name_form`, `followers_names_form`,
/// `status_form`, `mark_form` or `comment_form`:
///
/// ```json
/// { "form_name": "mark_form", "mark": "7", "Accepted": "Accepted" }
/// ```
///
/// Malformed or unusable submissions change nothing and still answer with
/// the current issue.
///
/// - `200 OK` with the issue document after the change
/// - `403 Forbidden` when a student posts anything but a comment
/// - `404 Not Found`
pub async fn submit_form(
    State(app_state): State<AppState>,
    Path(issue_id): Path<i64>,
    Extension(user): Extension<AuthUser>,
    body: Bytes,
) -> Response {
    let actor = user.actor();

    let action = serde_json::from_slice::<Value>(&body)
        .ok()
        .and_then(IssueForm::from_value)
        .and_then(|form| form.resolve(actor.user_id));

    match action {
        Some(action) => {
            if let Err(e) =
                issue_service::apply(app_state.db(), &app_state.issue_deps(), actor, issue_id, action)
                    .await
            {
                return service_error_response(e);
            }
        }
        None => debug!(issue_id, "ignoring unusable form submission"),
    }

    respond_with_issue(&app_state, issue_id, actor, "Issue updated").await
}

/// POST /api/issues/upload
///
/// Multipart comment with attachments.
///
/// ### Fields
/// - `issue_id` (required)
/// - `comment` (optional text)
/// - `files[]` / `files` (zero or more file parts)
///
/// A blank comment without files changes nothing.
///
/// - `200 OK` with the issue document
/// - `400 Bad Request` when `issue_id` is missing or the body is not valid multipart
/// - `403 Forbidden` / `404 Not Found`
pub async fn upload(
    State(app_state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    mut multipart: Multipart,
) -> Response {
    let mut issue_id: Option<i64> = None;
    let mut comment = String::new();
    let mut uploads: Vec<Upload> = Vec::new();

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => return bad_request(format!("Invalid multipart body: {e}")),
        };

        let name = field.name().unwrap_or("").to_owned();
        match name.as_str() {
            "issue_id" => {
                issue_id = field.text().await.ok().and_then(|s| s.trim().parse().ok());
            }
            "comment" => {
                comment = field.text().await.unwrap_or_default();
            }
            "files[]" | "files" => {
                let Some(filename) = field.file_name().map(str::to_owned) else {
                    continue;
                };
                if filename.is_empty() {
                    continue;
                }
                match field.bytes().await {
                    Ok(bytes) => uploads.push(Upload {
                        filename,
                        content: bytes.to_vec(),
                    }),
                    Err(e) => return bad_request(format!("Failed to read {filename}: {e}")),
                }
            }
            _ => continue,
        }
    }

    let Some(issue_id) = issue_id else {
        return bad_request("Missing required field: issue_id".to_string());
    };

    let actor = user.actor();
    if let Err(e) = issue_service::post_comment(
        app_state.db(),
        &app_state.issue_deps(),
        actor,
        issue_id,
        &comment,
        uploads,
    )
    .await
    {
        return service_error_response(e);
    }

    respond_with_issue(&app_state, issue_id, actor, "Comment added").await
}

fn bad_request(message: String) -> Response {
    (StatusCode::BAD_REQUEST, Json(ApiResponse::<Empty>::error(message))).into_response()
}
