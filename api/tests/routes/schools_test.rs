#[cfg(test)]
mod tests {
    use crate::helpers::{body_json, make_test_app};
    use axum::http::StatusCode;
    use db::models::school;

    #[tokio::test]
    async fn test_active_and_archived_schools_are_split() {
        let app = make_test_app().await;
        let db = app.state.db();
        let b = school::Model::create(db, "school_name_2", "school_link_2", true)
            .await
            .unwrap();
        school::Model::create(db, "school_name_1", "school_link_1", true)
            .await
            .unwrap();
        school::Model::create(db, "school_name_3", "school_link_3", false)
            .await
            .unwrap();
        school::Model::add_course(db, b.id, app.task.course_id).await.unwrap();

        let response = app.get("/api/schools", None).await;
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        let schools = json["data"].as_array().unwrap();
        assert_eq!(schools.len(), 2);
        assert_eq!(schools[0]["name"], "school_name_1");
        assert_eq!(schools[1]["name"], "school_name_2");
        assert_eq!(schools[1]["url"], "/school/school_link_2");
        assert_eq!(schools[1]["courses"][0]["name"], "course_name");

        let json = body_json(app.get("/api/schools/archive", None).await).await;
        let archived = json["data"].as_array().unwrap();
        assert_eq!(archived.len(), 1);
        assert_eq!(archived[0]["name"], "school_name_3");
    }
}
