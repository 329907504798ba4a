//! Section endpoints.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    response::IntoResponse,
    routing::{get, post},
};
use school_common::AppResult;
use school_core::{
    BulkUpdateInput, CreateSectionInput, Page, SectionResponse, SectionSetupInput, SetupSummary,
    UpdateSectionInput,
};
use serde::Deserialize;
use tracing::info;

use crate::{
    extractors::{AppJson, ListQuery},
    middleware::AppState,
    response::{ApiResponse, Created, ok},
};

/// Create section router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_section).get(list_sections))
        .route("/by-class/{class_id}", get(list_by_class))
        .route("/setup", post(setup_sections))
        .route("/bulk-update", post(bulk_update))
        .route("/reset/{class_id}", post(reset_sections))
        .route(
            "/{id}",
            get(get_section).patch(update_section).delete(delete_section),
        )
}

/// Optional department narrowing of a class-scoped request.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepartmentQuery {
    pub department_id: Option<String>,
}

async fn create_section(
    State(state): State<AppState>,
    AppJson(input): AppJson<CreateSectionInput>,
) -> AppResult<Created<SectionResponse>> {
    info!(name = %input.name, class_id = %input.class_id, "Creating section");
    let section = state.section_service.create(input).await?;
    Ok(Created(section))
}

async fn list_sections(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<Page<SectionResponse>>> {
    let page = state
        .section_service
        .list(query.page_request(), query.include_inactive())
        .await?;
    Ok(Json(page))
}

async fn list_by_class(
    State(state): State<AppState>,
    Path(class_id): Path<String>,
    Query(department): Query<DepartmentQuery>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<Page<SectionResponse>>> {
    let page = state
        .section_service
        .list_by_class(
            &class_id,
            department.department_id.as_deref(),
            query.page_request(),
            query.include_inactive(),
        )
        .await?;
    Ok(Json(page))
}

async fn get_section(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<SectionResponse>> {
    Ok(ApiResponse::ok(state.section_service.get(&id).await?))
}

async fn update_section(
    State(state): State<AppState>,
    Path(id): Path<String>,
    AppJson(input): AppJson<UpdateSectionInput>,
) -> AppResult<ApiResponse<SectionResponse>> {
    Ok(ApiResponse::ok(state.section_service.update(&id, input).await?))
}

async fn delete_section(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    state.section_service.delete(&id).await?;
    Ok(ok())
}

async fn setup_sections(
    State(state): State<AppState>,
    AppJson(input): AppJson<SectionSetupInput>,
) -> AppResult<ApiResponse<Vec<SectionResponse>>> {
    Ok(ApiResponse::ok(state.section_service.setup(input).await?))
}

async fn bulk_update(
    State(state): State<AppState>,
    AppJson(input): AppJson<BulkUpdateInput>,
) -> AppResult<ApiResponse<Vec<SectionResponse>>> {
    Ok(ApiResponse::ok(
        state.section_service.bulk_set_active(input).await?,
    ))
}

async fn reset_sections(
    State(state): State<AppState>,
    Path(class_id): Path<String>,
    Query(query): Query<DepartmentQuery>,
) -> AppResult<ApiResponse<SetupSummary>> {
    Ok(ApiResponse::ok(
        state
            .section_service
            .reset(&class_id, query.department_id.as_deref())
            .await?,
    ))
}
