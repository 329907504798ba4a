//! Setup wizard endpoints.
//!
//! Step-by-step screens over the registry: pick the classes of a medium,
//! switch departments per class, then lay out sections per scope. Saves and
//! resets answer with a `{message, affected}` summary.

use axum::{
    Router,
    extract::{Path, Query, State},
    routing::{get, post},
};
use school_common::AppResult;
use school_core::{
    ClassDepartmentSetupInput, ClassDepartmentsView, ClassResponse, ClassSetupInput,
    SectionResponse, SectionSetupInput, SetupSummary,
};
use school_db::entities::class::Medium;
use serde::Deserialize;
use tracing::info;

use crate::{extractors::AppJson, middleware::AppState, response::ApiResponse};

/// Create setup wizard router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/classes", get(classes))
        .route("/classes/save", post(save_classes))
        .route("/classes/reset", post(reset_classes))
        .route("/departments", get(departments))
        .route("/departments/save", post(save_departments))
        .route("/departments/reset/{class_id}", post(reset_departments))
        .route("/sections", get(sections))
        .route("/sections/save", post(save_sections))
        .route("/sections/reset", post(reset_sections))
}

/// `?medium=`
#[derive(Debug, Default, Deserialize)]
pub struct MediumParams {
    pub medium: Option<Medium>,
}

/// `?classId=`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassParams {
    pub class_id: String,
}

/// A `(class, department)` section scope.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScopeParams {
    pub class_id: String,
    pub department_id: Option<String>,
}

/// Every class of the medium, inactive ones included.
async fn classes(
    State(state): State<AppState>,
    Query(params): Query<MediumParams>,
) -> AppResult<ApiResponse<Vec<ClassResponse>>> {
    Ok(ApiResponse::ok(
        state.class_service.list_by_medium(params.medium, true).await?,
    ))
}

async fn save_classes(
    State(state): State<AppState>,
    AppJson(input): AppJson<ClassSetupInput>,
) -> AppResult<ApiResponse<SetupSummary>> {
    let affected = input.class_configs.len() as u64;
    state.class_service.setup(input).await?;
    info!(affected, "Saved class setup");

    Ok(ApiResponse::ok(SetupSummary::new(
        "Class setup saved successfully",
        affected,
    )))
}

async fn reset_classes(
    State(state): State<AppState>,
    Query(params): Query<MediumParams>,
) -> AppResult<ApiResponse<SetupSummary>> {
    Ok(ApiResponse::ok(
        state.class_service.reset(params.medium).await?,
    ))
}

async fn departments(
    State(state): State<AppState>,
    Query(params): Query<ClassParams>,
) -> AppResult<ApiResponse<ClassDepartmentsView>> {
    Ok(ApiResponse::ok(
        state
            .class_department_service
            .get_for_class(&params.class_id)
            .await?,
    ))
}

async fn save_departments(
    State(state): State<AppState>,
    AppJson(input): AppJson<ClassDepartmentSetupInput>,
) -> AppResult<ApiResponse<SetupSummary>> {
    let affected = input.departments.len() as u64;
    let class_id = input.class_id.clone();
    state.class_department_service.setup_for_class(input).await?;
    info!(%class_id, affected, "Saved department setup");

    Ok(ApiResponse::ok(SetupSummary::new(
        "Department setup saved successfully",
        affected,
    )))
}

async fn reset_departments(
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

/// Sections of exactly one scope; no department means the unassigned ones.
async fn sections(
    State(state): State<AppState>,
    Query(params): Query<ScopeParams>,
) -> AppResult<ApiResponse<Vec<SectionResponse>>> {
    Ok(ApiResponse::ok(
        state
            .section_service
            .list_scope(&params.class_id, params.department_id.as_deref())
            .await?,
    ))
}

async fn save_sections(
    State(state): State<AppState>,
    AppJson(input): AppJson<SectionSetupInput>,
) -> AppResult<ApiResponse<SetupSummary>> {
    let affected = input.section_configs.len() as u64;
    let class_id = input.class_id.clone();
    state.section_service.setup(input).await?;
    info!(%class_id, affected, "Saved section setup");

    Ok(ApiResponse::ok(SetupSummary::new(
        "Section setup saved successfully",
        affected,
    )))
}

async fn reset_sections(
    State(state): State<AppState>,
    AppJson(params): AppJson<ScopeParams>,
) -> AppResult<ApiResponse<SetupSummary>> {
    Ok(ApiResponse::ok(
        state
            .section_service
            .reset(&params.class_id, params.department_id.as_deref())
            .await?,
    ))
}
