use axum::{
    Extension, Router,
    extract::{Path, State},
    http::header::{CONTENT_DISPOSITION, CONTENT_TYPE},
    response::{IntoResponse, Response},
    routing::get,
};
use services::issue_service::open_attachment;

use crate::auth::AuthUser;
use crate::routes::common::service_error_response;
use crate::state::AppState;

pub fn media_routes() -> Router<AppState> {
    Router::new().route("/{*path}", get(download))
}

/// GET /api/media/{*path}
///
/// Streams a legacy-stored attachment to anyone who may view its issue.
/// Bucket-resident attachments are linked directly and never served here.
async fn download(
    State(app_state): State<AppState>,
    Path(path): Path<String>,
    Extension(user): Extension<AuthUser>,
) -> Response {
    match open_attachment(app_state.db(), app_state.storage(), user.actor(), &path).await {
        Ok((filename, content)) => {
            let mime = mime_guess::from_path(&filename).first_or_octet_stream();
            (
                [
                    (CONTENT_TYPE, mime.to_string()),
                    (
                        CONTENT_DISPOSITION,
                        format!("inline; filename=\"{}\"", filename.replace('"', "")),
                    ),
                ],
                content,
            )
                .into_response()
        }
        Err(e) => service_error_response(e),
    }
}
