#[cfg(test)]
mod tests {
    use crate::helpers::{body_json, make_test_app};
    use axum::{
        body::{Body, to_bytes},
        http::{
            Request, StatusCode,
            header::{AUTHORIZATION, CONTENT_TYPE},
        },
    };
    use storage::StorageBackend;

    const BOUNDARY: &str = "anytask-test-boundary";

    fn multipart_body(issue_id: i64, comment: &str, filename: &str, content: &str) -> String {
        format!(
            "--{BOUNDARY}\r\n\
             Content-Disposition: form-data; name=\"issue_id\"\r\n\r\n\
             {issue_id}\r\n\
             --{BOUNDARY}\r\n\
             Content-Disposition: form-data; name=\"comment\"\r\n\r\n\
             {comment}\r\n\
             --{BOUNDARY}\r\n\
             Content-Disposition: form-data; name=\"files[]\"; filename=\"{filename}\"\r\n\
             Content-Type: application/octet-stream\r\n\r\n\
             {content}\r\n\
             --{BOUNDARY}--\r\n"
        )
    }

    #[tokio::test]
    async fn test_upload_then_download_attachment() {
        let app = make_test_app().await;
        let issue_id = app.open_issue().await;

        let req = Request::builder()
            .method("POST")
            .uri("/api/issues/upload")
            .header(AUTHORIZATION, app.token(&app.student))
            .header(
                CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(multipart_body(
                issue_id,
                "test_comment",
                "test_solution.c",
                "main(){}",
            )))
            .unwrap();
        let response = app.send(req).await;
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        let entry = &json["data"]["history"][0];
        assert_eq!(entry["text"], "test_comment");
        assert_eq!(entry["files"][0]["filename"], "test_solution.c");
        let url = entry["files"][0]["url"].as_str().unwrap().to_string();
        assert!(url.starts_with("/api/media/files/issue_"));

        let key = url.trim_start_matches("/api/media/");
        assert_eq!(app.storage.open(key).await.unwrap(), b"main(){}");

        let response = app.get(&url, Some(&app.teacher)).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"main(){}");

        let response = app.get(&url, Some(&app.outsider)).await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_upload_without_issue_id_is_rejected() {
        let app = make_test_app().await;
        let body = format!(
            "--{BOUNDARY}\r\n\
             Content-Disposition: form-data; name=\"comment\"\r\n\r\n\
             hello\r\n\
             --{BOUNDARY}--\r\n"
        );
        let req = Request::builder()
            .method("POST")
            .uri("/api/issues/upload")
            .header(AUTHORIZATION, app.token(&app.student))
            .header(
                CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap();

        let response = app.send(req).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_unknown_media_is_not_found() {
        let app = make_test_app().await;
        let response = app.get("/api/media/files/missing.txt", Some(&app.teacher)).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
