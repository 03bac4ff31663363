#[cfg(test)]
mod tests {
    use crate::helpers::{body_json, make_test_app};
    use axum::{
        body::Body,
        http::{Request, StatusCode, header::CONTENT_TYPE},
    };
    use serde_json::json;

    fn login_request(username: &str, password: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/auth/login")
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(
                json!({ "username": username, "password": password }).to_string(),
            ))
            .unwrap()
    }

    #[tokio::test]
    async fn test_login_success() {
        let app = make_test_app().await;
        let response = app.send(login_request("teacher", "password")).await;

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["success"], true);
        assert_eq!(json["data"]["id"], app.teacher.id);
        assert_eq!(json["data"]["name"], "teacher_last_name teacher_name");
        assert!(json["data"]["token"].as_str().is_some_and(|t| !t.is_empty()));
    }

    #[tokio::test]
    async fn test_login_wrong_password() {
        let app = make_test_app().await;
        let response = app.send(login_request("teacher", "nope")).await;

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let json = body_json(response).await;
        assert_eq!(json["success"], false);
        assert_eq!(json["message"], "Invalid username or password");
    }

    #[tokio::test]
    async fn test_login_unknown_user() {
        let app = make_test_app().await;
        let response = app.send(login_request("ghost", "password")).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
