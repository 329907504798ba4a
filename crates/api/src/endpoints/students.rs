//! Student endpoints.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    response::IntoResponse,
    routing::get,
};
use school_common::AppResult;
use school_core::{CreateStudentInput, Page, StudentQuery};
use school_db::entities::student;
use sea_orm::prelude::DateTimeWithTimeZone;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{
    extractors::{AppJson, ListQuery},
    middleware::AppState,
    response::{ApiResponse, Created, ok},
};

/// Create student router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_students).post(create_student))
        .route("/{id}", get(get_student).delete(delete_student))
}

/// Student response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentResponse {
    pub id: String,
    pub first_name: String,
    pub last_name: Option<String>,
    pub roll_number: Option<String>,
    pub section_id: String,
    pub is_active: bool,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: Option<DateTimeWithTimeZone>,
}

impl From<student::Model> for StudentResponse {
    fn from(student: student::Model) -> Self {
        Self {
            id: student.id,
            first_name: student.first_name,
            last_name: student.last_name,
            roll_number: student.roll_number,
            section_id: student.section_id,
            is_active: student.is_active,
            created_at: student.created_at,
            updated_at: student.updated_at,
        }
    }
}

/// `?sectionId=&classId=` plus paging.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListStudentsQuery {
    pub section_id: Option<String>,
    pub class_id: Option<String>,
}

async fn create_student(
    State(state): State<AppState>,
    AppJson(input): AppJson<CreateStudentInput>,
) -> AppResult<Created<StudentResponse>> {
    info!(section_id = %input.section_id, "Enrolling student");
    let student = state.student_service.create(input).await?;
    Ok(Created(student.into()))
}

async fn list_students(
    State(state): State<AppState>,
    Query(filter): Query<ListStudentsQuery>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<Page<StudentResponse>>> {
    let page = state
        .student_service
        .list(
            &StudentQuery {
                section_id: filter.section_id,
                class_id: filter.class_id,
            },
            query.page_request(),
            query.include_inactive(),
        )
        .await?;

    Ok(Json(page.map(StudentResponse::from)))
}

async fn get_student(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<StudentResponse>> {
    let student = state.student_service.get(&id).await?;
    Ok(ApiResponse::ok(student.into()))
}

async fn delete_student(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    state.student_service.delete(&id).await?;
    Ok(ok())
}
