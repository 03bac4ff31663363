use api::{app, auth::generate_jwt, state::AppState};
use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, header},
    response::Response,
};
use db::{
    models::{course, task, user},
    test_utils::setup_test_db,
};
use serde_json::Value;
use services::{review_board::DisabledReviewBoard, status_transitions::StatusTransitions};
use std::sync::Arc;
use storage::{MemoryStorage, S3Overlay};
use tower::ServiceExt;

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub storage: Arc<MemoryStorage>,
    pub teacher: user::Model,
    pub student: user::Model,
    pub outsider: user::Model,
    pub task: task::Model,
}

/// Full router over a fresh in-memory database with one course, one
/// teacher, one student, an unrelated user and a task worth 10 points.
pub async fn make_test_app() -> TestApp {
    let db = setup_test_db().await;

    let course = course::Model::create(&db, "course_name", 2016).await.unwrap();
    let teacher = user::Model::create(
        &db,
        "teacher",
        "teacher@test.com",
        "teacher_name",
        "teacher_last_name",
        "password",
        false,
    )
    .await
    .unwrap();
    let student = user::Model::create(
        &db,
        "student",
        "student@test.com",
        "student_name",
        "student_last_name",
        "password",
        false,
    )
    .await
    .unwrap();
    let outsider = user::Model::create(
        &db,
        "outsider",
        "outsider@test.com",
        "out",
        "sider",
        "password",
        false,
    )
    .await
    .unwrap();
    course::Model::add_teacher(&db, course.id, teacher.id).await.unwrap();
    let task = task::Model::create(&db, course.id, "task_title", 10, None)
        .await
        .unwrap();

    let storage = Arc::new(MemoryStorage::new());
    let state = AppState::new(
        db,
        storage.clone(),
        S3Overlay::default(),
        Arc::new(DisabledReviewBoard),
        StatusTransitions::default(),
    );

    TestApp {
        router: app(state.clone()),
        state,
        storage,
        teacher,
        student,
        outsider,
        task,
    }
}

impl TestApp {
    pub fn token(&self, user: &user::Model) -> String {
        let (token, _) = generate_jwt(user.id, user.admin).unwrap();
        format!("Bearer {token}")
    }

    pub async fn send(&self, req: Request<Body>) -> Response {
        self.router.clone().oneshot(req).await.unwrap()
    }

    pub async fn get(&self, uri: &str, user: Option<&user::Model>) -> Response {
        let mut builder = Request::builder().method("GET").uri(uri);
        if let Some(user) = user {
            builder = builder.header(header::AUTHORIZATION, self.token(user));
        }
        self.send(builder.body(Body::empty()).unwrap()).await
    }

    pub async fn post_json(&self, uri: &str, user: &user::Model, body: Value) -> Response {
        let req = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::AUTHORIZATION, self.token(user))
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send(req).await
    }

    /// Opens (creating if needed) the student's issue and returns its id.
    pub async fn open_issue(&self) -> i64 {
        let uri = format!(
            "/api/tasks/{}/students/{}/issue",
            self.task.id, self.student.id
        );
        let json = body_json(self.get(&uri, Some(&self.student)).await).await;
        json["data"]["id"].as_i64().unwrap()
    }
}

pub async fn body_json(response: Response) -> Value {
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&body).unwrap()
}
