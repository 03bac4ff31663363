//! HTTP routes under `/api`.
//!
//! - `/health` → liveness (public)
//! - `/auth` → login (public)
//! - `/schools` → school directory (public)
//! - `/rb` → review board webhook (public)
//! - `/tasks` → get-or-create a student's issue (login required)
//! - `/issues` → issue page, forms and uploads (login required)
//! - `/media` → legacy attachment downloads (login required)
//!
//! Login-required groups redirect anonymous callers to `LOGIN_URL`.

use axum::{Router, middleware::from_fn};

use crate::auth::guards::require_login;
use crate::state::AppState;

pub mod auth;
pub mod common;
pub mod health;
pub mod issues;
pub mod media;
pub mod review_board;
pub mod robots;
pub mod schools;
pub mod tasks;

pub fn routes(app_state: AppState) -> Router {
    Router::new()
        .nest("/health", health::health_routes())
        .nest("/auth", auth::auth_routes())
        .nest("/schools", schools::schools_routes())
        .nest("/rb", review_board::review_board_routes())
        .nest("/tasks", tasks::tasks_routes().route_layer(from_fn(require_login)))
        .nest("/issues", issues::issues_routes().route_layer(from_fn(require_login)))
        .nest("/media", media::media_routes().route_layer(from_fn(require_login)))
        .with_state(app_state)
}
