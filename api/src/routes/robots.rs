use axum::{http::header::CONTENT_TYPE, response::IntoResponse};

const ROBOTS_TXT: &str = "User-agent: *\nAllow: /\nClean-param: next /accounts/login/\n";

/// GET /robots.txt
pub async fn robots_txt() -> impl IntoResponse {
    ([(CONTENT_TYPE, "text/plain; charset=utf-8")], ROBOTS_TXT)
}
