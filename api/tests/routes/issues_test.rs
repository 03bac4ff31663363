#[cfg(test)]
mod tests {
    use crate::helpers::{body_json, make_test_app};
    use axum::http::{StatusCode, header::LOCATION};
    use serde_json::{Value, json};

    fn history(json: &Value) -> &Vec<Value> {
        json["data"]["history"].as_array().unwrap()
    }

    #[tokio::test]
    async fn test_anonymous_is_redirected_to_login() {
        let app = make_test_app().await;
        let response = app.get("/api/issues/1", None).await;

        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(
            response.headers()[LOCATION],
            "/accounts/login/?next=/api/issues/1"
        );
    }

    #[tokio::test]
    async fn test_get_or_create_returns_same_issue() {
        let app = make_test_app().await;
        let first = app.open_issue().await;
        let second = app.open_issue().await;
        assert_eq!(first, second);

        let uri = format!(
            "/api/tasks/{}/students/{}/issue",
            app.task.id, app.student.id
        );
        let json = body_json(app.get(&uri, Some(&app.teacher)).await).await;
        assert_eq!(json["data"]["id"], first);
        assert_eq!(json["data"]["status"]["tag"], "new");
        assert_eq!(json["data"]["mark_display"], "0 out of 10");
    }

    #[tokio::test]
    async fn test_outsider_cannot_open_students_issue() {
        let app = make_test_app().await;
        let uri = format!(
            "/api/tasks/{}/students/{}/issue",
            app.task.id, app.student.id
        );
        let response = app.get(&uri, Some(&app.outsider)).await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let issue_id = app.open_issue().await;
        let response = app
            .get(&format!("/api/issues/{issue_id}"), Some(&app.outsider))
            .await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_mark_with_accept_appends_status_then_mark() {
        let app = make_test_app().await;
        let issue_id = app.open_issue().await;

        let response = app
            .post_json(
                &format!("/api/issues/{issue_id}"),
                &app.teacher,
                json!({ "form_name": "mark_form", "mark": "3", "Accepted": "Accepted" }),
            )
            .await;
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        assert_eq!(json["data"]["status"]["tag"], "accepted");
        assert_eq!(json["data"]["mark_display"], "3 out of 10");
        let history = history(&json);
        assert_eq!(history.len(), 2);
        assert_eq!(history[0]["field"], "status");
        assert_eq!(history[1]["field"], "mark");
        assert_eq!(history[1]["text"], "Grade mark changed to 3");
    }

    #[tokio::test]
    async fn test_responsible_me_button() {
        let app = make_test_app().await;
        let issue_id = app.open_issue().await;

        let json = body_json(
            app.post_json(
                &format!("/api/issues/{issue_id}"),
                &app.teacher,
                json!({ "form_name": "responsible_name_form", "Me": "Me" }),
            )
            .await,
        )
        .await;

        assert_eq!(json["data"]["responsible"]["id"], app.teacher.id);
        assert_eq!(
            history(&json)[0]["text"],
            "Task reviewer changed: teacher_last_name teacher_name"
        );
    }

    #[tokio::test]
    async fn test_student_cannot_change_status() {
        let app = make_test_app().await;
        let issue_id = app.open_issue().await;

        let response = app
            .post_json(
                &format!("/api/issues/{issue_id}"),
                &app.student,
                json!({ "form_name": "status_form", "status": "accepted" }),
            )
            .await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_malformed_form_changes_nothing() {
        let app = make_test_app().await;
        let issue_id = app.open_issue().await;
        let uri = format!("/api/issues/{issue_id}");

        for body in [
            json!({ "form_name": "mark_form", "mark": "abc" }),
            json!({ "form_name": "no_such_form" }),
            json!({ "form_name": "status_form" }),
            json!({ "form_name": "comment_form", "comment": "   " }),
        ] {
            let response = app.post_json(&uri, &app.teacher, body).await;
            assert_eq!(response.status(), StatusCode::OK);
            let json = body_json(response).await;
            assert!(history(&json).is_empty());
            assert_eq!(json["data"]["status"]["tag"], "new");
        }
    }

    #[tokio::test]
    async fn test_student_comment_is_recorded() {
        let app = make_test_app().await;
        let issue_id = app.open_issue().await;

        let json = body_json(
            app.post_json(
                &format!("/api/issues/{issue_id}"),
                &app.student,
                json!({ "form_name": "comment_form", "comment": "test_comment" }),
            )
            .await,
        )
        .await;

        let history = history(&json);
        assert_eq!(history.len(), 1);
        assert_eq!(history[0]["type"], "event");
        assert_eq!(history[0]["text"], "test_comment");
        assert_eq!(history[0]["author"]["username"], "student");
        // Students do not see grading controls.
        assert_eq!(json["data"]["can_grade"], false);
    }
}
