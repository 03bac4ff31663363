#[cfg(test)]
mod tests {
    use crate::helpers::{body_json, make_test_app};
    use axum::{
        body::Body,
        http::{Request, StatusCode, header::CONTENT_TYPE},
    };
    use db::models::issue;
    use serde_json::json;

    fn webhook(review_id: i64, author: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(format!("/api/rb/{review_id}/messages"))
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(json!({ "author": author }).to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_review_reply_lands_in_history() {
        let app = make_test_app().await;
        let issue_id = app.open_issue().await;
        issue::Model::set_review_id(app.state.db(), issue_id, Some(1))
            .await
            .unwrap();

        let response = app.send(webhook(1, "teacher")).await;
        assert_eq!(response.status(), StatusCode::CREATED);

        let json = body_json(
            app.get(&format!("/api/issues/{issue_id}"), Some(&app.teacher))
                .await,
        )
        .await;
        let entry = &json["data"]["history"][0];
        assert_eq!(entry["author"]["name"], "teacher_last_name teacher_name");
        assert_eq!(entry["text"], "New comment\nReview request 1");
    }

    #[tokio::test]
    async fn test_unknown_review_is_not_found() {
        let app = make_test_app().await;
        let response = app.send(webhook(42, "teacher")).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
