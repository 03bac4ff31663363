use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use db::models::user;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::auth::generate_jwt;
use crate::response::ApiResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize, Default)]
pub struct LoginResponse {
    pub id: i64,
    pub username: String,
    pub name: String,
    pub admin: bool,
    pub token: String,
    pub expires_at: String,
}

/// POST /api/auth/login
///
/// ### Request Body
/// ```json
/// { "username": "teacher", "password": "secret" }
/// ```
///
/// ### Responses
/// - `200 OK` with the token and its expiry
/// - `401 Unauthorized` on unknown user or wrong password
/// - `500 Internal Server Error` on database or signing failure
pub async fn login(State(app_state): State<AppState>, Json(req): Json<LoginRequest>) -> Response {
    let user = match user::Model::verify_credentials(app_state.db(), &req.username, &req.password)
        .await
    {
        Ok(Some(user)) => user,
        Ok(None) => {
            warn!(username = %req.username, "failed login");
            return (
                StatusCode::UNAUTHORIZED,
                Json(ApiResponse::<LoginResponse>::error("Invalid username or password")),
            )
                .into_response();
        }
        Err(e) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::<LoginResponse>::error(format!("Database error: {e}"))),
            )
                .into_response();
        }
    };

    let (token, expires_at) = match generate_jwt(user.id, user.admin) {
        Ok(pair) => pair,
        Err(e) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::<LoginResponse>::error(format!("Token error: {e}"))),
            )
                .into_response();
        }
    };

    info!(user_id = user.id, "login");
    let response = LoginResponse {
        id: user.id,
        name: user.display_name(),
        username: user.username,
        admin: user.admin,
        token,
        expires_at,
    };

    (
        StatusCode::OK,
        Json(ApiResponse::success(response, "Login successful")),
    )
        .into_response()
}
