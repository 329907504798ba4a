//! Department registry service.

use chrono::Utc;
use school_common::{AppError, AppResult, id::IdGenerator};
use school_db::entities::department;
use school_db::repositories::{
    ClassRepository, DepartmentRepository, SectionRepository, StudentRepository,
};
use sea_orm::{Set, prelude::DateTimeWithTimeZone};
use serde::{Deserialize, Serialize};
use tracing::info;
use validator::Validate;

use crate::services::activation::{
    ActivationInput, BulkUpdateInput, SetupSummary, clean_name, dedupe_last_wins,
    ensure_all_found, nullable,
};
use crate::services::paging::{Page, PageRequest};

/// Input for creating a department.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateDepartmentInput {
    #[validate(length(min = 1, max = 128))]
    pub name: String,
    #[validate(length(max = 1024))]
    pub description: Option<String>,
}

/// Input for updating a department.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDepartmentInput {
    #[validate(length(min = 1, max = 128))]
    pub name: Option<String>,
    #[validate(length(max = 1024))]
    #[serde(default, deserialize_with = "nullable")]
    pub description: Option<Option<String>>,
    pub is_active: Option<bool>,
}

/// Input for the global department setup step.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct DepartmentSetupInput {
    #[validate(nested)]
    pub department_configs: Vec<ActivationInput>,
}

/// Nested counts of a department.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DepartmentCount {
    pub sections: u64,
}

/// Department as returned by the API.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DepartmentResponse {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub is_active: bool,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: Option<DateTimeWithTimeZone>,
    #[serde(rename = "_count")]
    pub count: DepartmentCount,
}

impl DepartmentResponse {
    fn new(model: department::Model, sections: u64) -> Self {
        Self {
            id: model.id,
            name: model.name,
            description: model.description,
            is_active: model.is_active,
            created_at: model.created_at,
            updated_at: model.updated_at,
            count: DepartmentCount { sections },
        }
    }
}

/// Service for managing departments.
#[derive(Clone)]
pub struct DepartmentService {
    department_repo: DepartmentRepository,
    class_repo: ClassRepository,
    section_repo: SectionRepository,
    student_repo: StudentRepository,
    id_gen: IdGenerator,
}

impl DepartmentService {
    /// Create a new department service.
    #[must_use]
    pub const fn new(
        department_repo: DepartmentRepository,
        class_repo: ClassRepository,
        section_repo: SectionRepository,
        student_repo: StudentRepository,
    ) -> Self {
        Self {
            department_repo,
            class_repo,
            section_repo,
            student_repo,
            id_gen: IdGenerator::new(),
        }
    }

    async fn with_counts(
        &self,
        departments: Vec<department::Model>,
    ) -> AppResult<Vec<DepartmentResponse>> {
        let ids: Vec<String> = departments.iter().map(|d| d.id.clone()).collect();
        let counts = self.section_repo.counts_by_department(&ids).await?;

        Ok(departments
            .into_iter()
            .map(|d| {
                let sections = counts.get(&d.id).copied().unwrap_or(0);
                DepartmentResponse::new(d, sections)
            })
            .collect())
    }

    /// Find a department by exact name.
    pub async fn find_by_name(&self, name: &str) -> AppResult<Option<department::Model>> {
        self.department_repo.find_by_name(name).await
    }

    /// Create a new department.
    pub async fn create(&self, input: CreateDepartmentInput) -> AppResult<DepartmentResponse> {
        input.validate()?;

        let name = clean_name(&input.name)?;
        if self.department_repo.find_by_name(&name).await?.is_some() {
            return Err(AppError::Duplicate(format!(
                "Department with name \"{name}\" already exists"
            )));
        }

        let model = department::ActiveModel {
            id: Set(self.id_gen.generate()),
            name: Set(name),
            description: Set(input.description),
            is_active: Set(true),
            created_at: Set(Utc::now().into()),
            updated_at: Set(None),
        };

        let created = self.department_repo.create(model).await?;
        info!(department_id = %created.id, name = %created.name, "Created department");

        Ok(DepartmentResponse::new(created, 0))
    }

    /// List one page of departments ordered by name.
    pub async fn list(
        &self,
        request: PageRequest,
        include_inactive: bool,
    ) -> AppResult<Page<DepartmentResponse>> {
        let request = request.normalized();
        let total = self.department_repo.count(include_inactive).await?;
        let departments = self
            .department_repo
            .find_page(include_inactive, request.offset(), request.limit)
            .await?;

        Ok(Page::new(
            self.with_counts(departments).await?,
            request,
            total,
        ))
    }

    /// List every department, for the setup screens.
    pub async fn list_all(&self, include_inactive: bool) -> AppResult<Vec<DepartmentResponse>> {
        let departments = self.department_repo.find_all(include_inactive).await?;
        self.with_counts(departments).await
    }

    /// Departments offered in a class, with section counts scoped to that class.
    pub async fn find_by_class(&self, class_id: &str) -> AppResult<Vec<DepartmentResponse>> {
        self.class_repo.get_by_id(class_id).await?;

        let departments = self.department_repo.find_active_for_class(class_id).await?;
        let counts = self
            .section_repo
            .counts_by_department_in_class(class_id)
            .await?;

        Ok(departments
            .into_iter()
            .map(|d| {
                let sections = counts.get(&Some(d.id.clone())).copied().unwrap_or(0);
                DepartmentResponse::new(d, sections)
            })
            .collect())
    }

    /// Get a department.
    pub async fn get(&self, id: &str) -> AppResult<DepartmentResponse> {
        let department = self.department_repo.get_by_id(id).await?;
        let mut with_count = self.with_counts(vec![department]).await?;
        with_count
            .pop()
            .ok_or_else(|| AppError::Internal("department vanished while counting".to_string()))
    }

    /// Update a department.
    pub async fn update(
        &self,
        id: &str,
        input: UpdateDepartmentInput,
    ) -> AppResult<DepartmentResponse> {
        input.validate()?;

        let department = self.department_repo.get_by_id(id).await?;
        let mut active: department::ActiveModel = department.into();

        if let Some(name) = input.name {
            let name = clean_name(&name)?;
            let taken = self.department_repo.find_by_name(&name).await?;
            if taken.is_some_and(|existing| existing.id != id) {
                return Err(AppError::Duplicate(format!(
                    "Department with name \"{name}\" already exists"
                )));
            }
            active.name = Set(name);
        }
        if let Some(description) = input.description {
            active.description = Set(description);
        }
        if let Some(is_active) = input.is_active {
            active.is_active = Set(is_active);
        }
        active.updated_at = Set(Some(Utc::now().into()));

        let updated = self.department_repo.update(active).await?;
        let mut with_count = self.with_counts(vec![updated]).await?;
        with_count
            .pop()
            .ok_or_else(|| AppError::Internal("department vanished while counting".to_string()))
    }

    /// Delete a department that has no enrolled students in any class.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        self.department_repo.get_by_id(id).await?;

        let students = self.student_repo.count_in_department(id).await?;
        if students > 0 {
            return Err(AppError::HasDependents(format!(
                "Cannot delete department with {students} enrolled students"
            )));
        }

        self.department_repo.delete(id).await?;
        info!(department_id = %id, "Deleted department");
        Ok(())
    }

    /// Set one global activation state on many departments.
    pub async fn bulk_set_active(
        &self,
        input: BulkUpdateInput,
    ) -> AppResult<Vec<DepartmentResponse>> {
        input.validate()?;

        let found = self.department_repo.find_by_ids(&input.ids).await?;
        let found_ids: Vec<String> = found.into_iter().map(|d| d.id).collect();
        ensure_all_found("Departments", &input.ids, &found_ids)?;

        let entries: Vec<(String, bool)> = found_ids
            .iter()
            .map(|id| (id.clone(), input.is_active))
            .collect();
        let affected = self.department_repo.set_active(&entries).await?;
        info!(affected, is_active = input.is_active, "Bulk updated departments");

        let refreshed = self.department_repo.find_by_ids(&found_ids).await?;
        self.with_counts(refreshed).await
    }

    /// Apply per-department global activation in one transaction.
    pub async fn setup(&self, input: DepartmentSetupInput) -> AppResult<Vec<DepartmentResponse>> {
        input.validate()?;

        let entries = dedupe_last_wins(
            input
                .department_configs
                .into_iter()
                .map(|c| (c.id, c.is_active)),
        );
        let requested: Vec<String> = entries.iter().map(|(id, _)| id.clone()).collect();
        let found = self.department_repo.find_by_ids(&requested).await?;
        let found_ids: Vec<String> = found.into_iter().map(|d| d.id).collect();
        ensure_all_found("Departments", &requested, &found_ids)?;

        let affected = self.department_repo.set_active(&entries).await?;
        info!(affected, "Applied department setup");

        self.list_all(true).await
    }

    /// Deactivate every department.
    pub async fn reset(&self) -> AppResult<SetupSummary> {
        let affected = self.department_repo.deactivate_all().await?;
        info!(affected, "Reset departments");
        Ok(SetupSummary::new(
            "All departments have been reset to inactive",
            affected,
        ))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;

    fn create_mock_department(id: &str, name: &str) -> department::Model {
        department::Model {
            id: id.to_string(),
            name: name.to_string(),
            description: None,
            is_active: true,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    fn service_over(db: MockDatabase) -> DepartmentService {
        let db = Arc::new(db.into_connection());
        DepartmentService::new(
            DepartmentRepository::new(db.clone()),
            ClassRepository::new(db.clone()),
            SectionRepository::new(db.clone()),
            StudentRepository::new(db),
        )
    }

    #[tokio::test]
    async fn test_create_rejects_duplicate_name() {
        let service = service_over(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_mock_department("d1", "Science")]]),
        );

        let result = service
            .create(CreateDepartmentInput {
                name: "Science".to_string(),
                description: None,
            })
            .await;

        assert!(matches!(result, Err(AppError::Duplicate(_))));
    }

    #[tokio::test]
    async fn test_delete_blocked_by_students() {
        let service = service_over(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_mock_department("d1", "Science")]])
                .append_query_results([[maplit::btreemap! {
                    "num_items" => sea_orm::Value::BigInt(Some(4))
                }]]),
        );

        let result = service.delete("d1").await;

        assert!(matches!(result, Err(AppError::HasDependents(_))));
    }
}
