#[cfg(test)]
mod tests {
    use crate::helpers::{body_json, make_test_app};
    use axum::{body::to_bytes, http::StatusCode};

    #[tokio::test]
    async fn test_health_check() {
        let app = make_test_app().await;
        let response = app.get("/api/health", None).await;

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["data"], "OK");
    }

    #[tokio::test]
    async fn test_robots_txt() {
        let app = make_test_app().await;
        let response = app.get("/robots.txt", None).await;

        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(
            std::str::from_utf8(&body).unwrap(),
            "User-agent: *\nAllow: /\nClean-param: next /accounts/login/\n"
        );
    }
}
