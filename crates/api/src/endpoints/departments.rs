//! Department endpoints, including the per-class department switches.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    response::IntoResponse,
    routing::{get, post},
};
use school_common::AppResult;
use school_core::{
    BulkUpdateInput, ClassDepartmentResponse, ClassDepartmentSetupInput, ClassDepartmentsView,
    CreateDepartmentInput, DepartmentResponse, DepartmentSetupInput, Page, SetupSummary,
    UpdateDepartmentInput,
};
use tracing::info;

use crate::{
    extractors::{AppJson, ListQuery},
    middleware::AppState,
    response::{ApiResponse, Created, ok},
};

/// Create department router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_department).get(list_departments))
        .route("/by-class/{class_id}", get(list_by_class))
        .route("/setup", post(setup_departments))
        .route("/bulk-update", post(bulk_update))
        .route("/reset", post(reset_departments))
        .route("/class-setup", post(setup_for_class))
        .route("/class-setup/{class_id}", get(get_for_class))
        .route("/class-reset/{class_id}", post(reset_for_class))
        .route(
            "/{id}",
            get(get_department)
                .patch(update_department)
                .delete(delete_department),
        )
}

async fn create_department(
    State(state): State<AppState>,
    AppJson(input): AppJson<CreateDepartmentInput>,
) -> AppResult<Created<DepartmentResponse>> {
    info!(name = %input.name, "Creating department");
    let department = state.department_service.create(input).await?;
    Ok(Created(department))
}

async fn list_departments(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<Page<DepartmentResponse>>> {
    let page = state
        .department_service
        .list(query.page_request(), query.include_inactive())
        .await?;
    Ok(Json(page))
}

async fn list_by_class(
    State(state): State<AppState>,
    Path(class_id): Path<String>,
) -> AppResult<ApiResponse<Vec<DepartmentResponse>>> {
    Ok(ApiResponse::ok(
        state.department_service.find_by_class(&class_id).await?,
    ))
}

async fn get_department(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<DepartmentResponse>> {
    Ok(ApiResponse::ok(state.department_service.get(&id).await?))
}

async fn update_department(
    State(state): State<AppState>,
    Path(id): Path<String>,
    AppJson(input): AppJson<UpdateDepartmentInput>,
) -> AppResult<ApiResponse<DepartmentResponse>> {
    Ok(ApiResponse::ok(
        state.department_service.update(&id, input).await?,
    ))
}

async fn delete_department(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    state.department_service.delete(&id).await?;
    Ok(ok())
}

async fn setup_departments(
    State(state): State<AppState>,
    AppJson(input): AppJson<DepartmentSetupInput>,
) -> AppResult<ApiResponse<Vec<DepartmentResponse>>> {
    Ok(ApiResponse::ok(state.department_service.setup(input).await?))
}

async fn bulk_update(
    State(state): State<AppState>,
    AppJson(input): AppJson<BulkUpdateInput>,
) -> AppResult<ApiResponse<Vec<DepartmentResponse>>> {
    Ok(ApiResponse::ok(
        state.department_service.bulk_set_active(input).await?,
    ))
}

async fn reset_departments(State(state): State<AppState>) -> AppResult<ApiResponse<SetupSummary>> {
    Ok(ApiResponse::ok(state.department_service.reset().await?))
}

async fn get_for_class(
    State(state): State<AppState>,
    Path(class_id): Path<String>,
) -> AppResult<ApiResponse<ClassDepartmentsView>> {
    Ok(ApiResponse::ok(
        state
            .class_department_service
            .get_for_class(&class_id)
            .await?,
    ))
}

async fn setup_for_class(
    State(state): State<AppState>,
    AppJson(input): AppJson<ClassDepartmentSetupInput>,
) -> AppResult<ApiResponse<Vec<ClassDepartmentResponse>>> {
    Ok(ApiResponse::ok(
        state
            .class_department_service
            .setup_for_class(input)
            .await?,
    ))
}

async fn reset_for_class(
    State(state): State<AppState>,
    Path(class_id): Path<String>,
) -> AppResult<ApiResponse<SetupSummary>> {
    Ok(ApiResponse::ok(
        state
            .class_department_service
            .reset_for_class(&class_id)
            .await?,
    ))
}
