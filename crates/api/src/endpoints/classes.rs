//! Class endpoints.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    response::IntoResponse,
    routing::{get, post},
};
use school_common::AppResult;
use school_core::{
    BulkUpdateInput, ClassDetailResponse, ClassResponse, ClassSetupInput, CreateClassInput,
    Page, SetupSummary, UpdateClassInput,
};
use school_db::entities::class::Medium;
use serde::Deserialize;
use tracing::info;

use crate::{
    extractors::{AppJson, ListQuery},
    middleware::AppState,
    response::{ApiResponse, Created, ok},
};

/// Create class router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_class).get(list_classes))
        .route("/by-medium", get(list_by_medium))
        .route("/setup", post(setup_classes))
        .route("/bulk-update", post(bulk_update))
        .route("/reset", post(reset_classes))
        .route(
            "/{id}",
            get(get_class).patch(update_class).delete(delete_class),
        )
}

/// `?medium=&includeInactive=`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediumQuery {
    pub medium: Option<Medium>,
    #[serde(default = "default_true")]
    pub include_inactive: bool,
}

const fn default_true() -> bool {
    true
}

/// `?medium=` of a reset; every class when absent.
#[derive(Debug, Default, Deserialize)]
pub struct ResetClassesQuery {
    pub medium: Option<Medium>,
}

async fn create_class(
    State(state): State<AppState>,
    AppJson(input): AppJson<CreateClassInput>,
) -> AppResult<Created<ClassResponse>> {
    info!(name = %input.name, "Creating class");
    let class = state.class_service.create(input).await?;
    Ok(Created(class))
}

async fn list_classes(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> AppResult<Json<Page<ClassResponse>>> {
    let page = state
        .class_service
        .list(query.page_request(), query.include_inactive())
        .await?;
    Ok(Json(page))
}

async fn list_by_medium(
    State(state): State<AppState>,
    Query(query): Query<MediumQuery>,
) -> AppResult<ApiResponse<Vec<ClassResponse>>> {
    let classes = state
        .class_service
        .list_by_medium(query.medium, query.include_inactive)
        .await?;
    Ok(ApiResponse::ok(classes))
}

async fn get_class(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<ClassDetailResponse>> {
    Ok(ApiResponse::ok(state.class_service.get(&id).await?))
}

async fn update_class(
    State(state): State<AppState>,
    Path(id): Path<String>,
    AppJson(input): AppJson<UpdateClassInput>,
) -> AppResult<ApiResponse<ClassResponse>> {
    Ok(ApiResponse::ok(state.class_service.update(&id, input).await?))
}

async fn delete_class(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    state.class_service.delete(&id).await?;
    Ok(ok())
}

async fn setup_classes(
    State(state): State<AppState>,
    AppJson(input): AppJson<ClassSetupInput>,
) -> AppResult<ApiResponse<Vec<ClassResponse>>> {
    Ok(ApiResponse::ok(state.class_service.setup(input).await?))
}

async fn bulk_update(
    State(state): State<AppState>,
    AppJson(input): AppJson<BulkUpdateInput>,
) -> AppResult<ApiResponse<Vec<ClassResponse>>> {
    Ok(ApiResponse::ok(
        state.class_service.bulk_set_active(input).await?,
    ))
}

async fn reset_classes(
    State(state): State<AppState>,
    Query(query): Query<ResetClassesQuery>,
) -> AppResult<ApiResponse<SetupSummary>> {
    Ok(ApiResponse::ok(state.class_service.reset(query.medium).await?))
}
