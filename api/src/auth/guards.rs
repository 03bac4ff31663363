use axum::{
    body::Body,
    extract::{FromRequestParts, OriginalUri},
    http::{Request, StatusCode, header::LOCATION},
    middleware::Next,
    response::{IntoResponse, Response},
};
use util::config;

use crate::auth::claims::AuthUser;

/// Login page URL with `next` pointing back at `path`.
pub fn login_redirect_target(path: &str) -> String {
    format!("{}?next={}", config::login_url(), path)
}

/// Lets authenticated requests through with `AuthUser` in the extensions.
/// Anyone else is sent to the login page with `302 Found`.
pub async fn require_login(req: Request<Body>, next: Next) -> Response {
    let (mut parts, body) = req.into_parts();

    match AuthUser::from_request_parts(&mut parts, &()).await {
        Ok(user) => {
            let mut req = Request::from_parts(parts, body);
            req.extensions_mut().insert(user);
            next.run(req).await
        }
        Err(_) => {
            // Nested routers see a stripped URI; redirect to the one the client asked for.
            let path = parts
                .extensions
                .get::<OriginalUri>()
                .map(|OriginalUri(uri)| uri.path().to_owned())
                .unwrap_or_else(|| parts.uri.path().to_owned());

            (
                StatusCode::FOUND,
                [(LOCATION, login_redirect_target(&path))],
            )
                .into_response()
        }
    }
}
