pub mod auth;
pub mod response;
pub mod routes;
pub mod state;

use axum::{
    Router,
    http::header::{CONTENT_DISPOSITION, CONTENT_TYPE},
    middleware::from_fn,
    routing::get,
};
use tower_http::cors::CorsLayer;

use crate::auth::middleware::log_request;
use crate::routes::{robots::robots_txt, routes};
use crate::state::AppState;

/// The whole HTTP surface: `/api/...` plus `/robots.txt`.
pub fn app(app_state: AppState) -> Router {
    let cors = CorsLayer::very_permissive().expose_headers([CONTENT_DISPOSITION, CONTENT_TYPE]);

    Router::new()
        .nest("/api", routes(app_state))
        .route("/robots.txt", get(robots_txt))
        .layer(from_fn(log_request))
        .layer(cors)
}
