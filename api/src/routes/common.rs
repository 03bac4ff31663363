use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use services::ServiceError;
use storage::StorageError;
use tracing::error;

use crate::response::{ApiResponse, Empty};

/// Maps a service failure onto the JSON error envelope.
pub fn service_error_response(err: ServiceError) -> Response {
    let (status, message) = match &err {
        ServiceError::Forbidden => (StatusCode::FORBIDDEN, "Forbidden".to_string()),
        ServiceError::NotFound(what) => (StatusCode::NOT_FOUND, format!("{what} not found")),
        ServiceError::Storage(StorageError::NotFound(_)) => {
            (StatusCode::NOT_FOUND, "File not found".to_string())
        }
        other => {
            error!(error = %other, "request failed");
            (StatusCode::INTERNAL_SERVER_ERROR, other.to_string())
        }
    };

    (status, Json(ApiResponse::<Empty>::error(message))).into_response()
}
