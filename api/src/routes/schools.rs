//! School directory: active schools and the archive of inactive ones.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use db::models::{course, school};
use sea_orm::{DatabaseConnection, DbErr};
use serde::Serialize;

use crate::response::ApiResponse;
use crate::state::AppState;

pub fn schools_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_active))
        .route("/archive", get(list_archived))
}

#[derive(Debug, Serialize)]
pub struct SchoolResponse {
    pub id: i64,
    pub name: String,
    pub link: String,
    pub url: String,
    pub courses: Vec<course::Model>,
}

async fn describe(db: &DatabaseConnection, schools: Vec<school::Model>) -> Result<Vec<SchoolResponse>, DbErr> {
    let mut out = Vec::with_capacity(schools.len());
    for school in schools {
        let courses = school.courses(db).await?;
        out.push(SchoolResponse {
            id: school.id,
            url: school.url(),
            name: school.name,
            link: school.link,
            courses,
        });
    }
    Ok(out)
}

fn respond(result: Result<Vec<SchoolResponse>, DbErr>, message: &str) -> Response {
    match result {
        Ok(schools) => (StatusCode::OK, Json(ApiResponse::success(schools, message))).into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiResponse::<Vec<SchoolResponse>>::error(format!("Database error: {e}"))),
        )
            .into_response(),
    }
}

/// GET /api/schools
///
/// Active schools ordered by name, each with its courses.
async fn list_active(State(app_state): State<AppState>) -> Response {
    let db = app_state.db();
    let result = match school::Model::find_active(db).await {
        Ok(schools) => describe(db, schools).await,
        Err(e) => Err(e),
    };
    respond(result, "Schools retrieved successfully")
}

/// GET /api/schools/archive
///
/// Inactive schools ordered by name.
async fn list_archived(State(app_state): State<AppState>) -> Response {
    let db = app_state.db();
    let result = match school::Model::find_archived(db).await {
        Ok(schools) => describe(db, schools).await,
        Err(e) => Err(e),
    };
    respond(result, "Archived schools retrieved successfully")
}
