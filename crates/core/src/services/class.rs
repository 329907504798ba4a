//! Class registry service.

use chrono::Utc;
use school_common::{AppError, AppResult, id::IdGenerator};
use school_db::entities::{class, class::Medium, section};
use school_db::repositories::{
    ClassRepository, DepartmentFilter, SectionFilter, SectionRepository, StudentRepository,
};
use sea_orm::{Set, prelude::DateTimeWithTimeZone};
use serde::{Deserialize, Serialize};
use tracing::info;
use validator::Validate;

use crate::services::activation::{
    ActivationInput, BulkUpdateInput, SetupSummary, clean_name, dedupe_last_wins,
    ensure_all_found,
};
use crate::services::paging::{Page, PageRequest};

/// Input for creating a class.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateClassInput {
    #[validate(length(min = 1, max = 64))]
    pub name: String,
    #[serde(default)]
    pub medium: Medium,
}

/// Input for updating a class.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateClassInput {
    #[validate(length(min = 1, max = 64))]
    pub name: Option<String>,
    pub medium: Option<Medium>,
    pub is_active: Option<bool>,
}

/// Input for the class setup step.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ClassSetupInput {
    /// Narrows the returned rows to one medium.
    pub medium: Option<Medium>,
    #[validate(nested)]
    pub class_configs: Vec<ActivationInput>,
}

/// Nested counts of a class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ClassCount {
    pub sections: u64,
}

/// Class as returned by the API.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassResponse {
    pub id: String,
    pub name: String,
    pub medium: Medium,
    pub is_active: bool,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: Option<DateTimeWithTimeZone>,
    #[serde(rename = "_count")]
    pub count: ClassCount,
}

impl ClassResponse {
    fn new(model: class::Model, sections: u64) -> Self {
        Self {
            id: model.id,
            name: model.name,
            medium: model.medium,
            is_active: model.is_active,
            created_at: model.created_at,
            updated_at: model.updated_at,
            count: ClassCount { sections },
        }
    }
}

/// Section summary nested in a class detail.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassSectionSummary {
    pub id: String,
    pub name: String,
    pub department_id: Option<String>,
    pub capacity: i32,
    pub is_active: bool,
    #[serde(rename = "_count")]
    pub count: SectionStudentCount,
}

/// Nested student count of a section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SectionStudentCount {
    pub students: u64,
}

/// A class with its sections.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassDetailResponse {
    #[serde(flatten)]
    pub class: ClassResponse,
    pub sections: Vec<ClassSectionSummary>,
}

/// Service for managing classes.
#[derive(Clone)]
pub struct ClassService {
    class_repo: ClassRepository,
    section_repo: SectionRepository,
    student_repo: StudentRepository,
    id_gen: IdGenerator,
}

impl ClassService {
    /// Create a new class service.
    #[must_use]
    pub const fn new(
        class_repo: ClassRepository,
        section_repo: SectionRepository,
        student_repo: StudentRepository,
    ) -> Self {
        Self {
            class_repo,
            section_repo,
            student_repo,
            id_gen: IdGenerator::new(),
        }
    }

    async fn with_counts(&self, classes: Vec<class::Model>) -> AppResult<Vec<ClassResponse>> {
        let ids: Vec<String> = classes.iter().map(|c| c.id.clone()).collect();
        let counts = self.section_repo.counts_by_class(&ids).await?;

        Ok(classes
            .into_iter()
            .map(|c| {
                let sections = counts.get(&c.id).copied().unwrap_or(0);
                ClassResponse::new(c, sections)
            })
            .collect())
    }

    async fn with_count(&self, class: class::Model) -> AppResult<ClassResponse> {
        let counts = self
            .section_repo
            .counts_by_class(std::slice::from_ref(&class.id))
            .await?;
        let sections = counts.get(&class.id).copied().unwrap_or(0);
        Ok(ClassResponse::new(class, sections))
    }

    /// Find a class by exact name.
    pub async fn find_by_name(&self, name: &str) -> AppResult<Option<class::Model>> {
        self.class_repo.find_by_name(name).await
    }

    /// Create a new class.
    pub async fn create(&self, input: CreateClassInput) -> AppResult<ClassResponse> {
        input.validate()?;

        let name = clean_name(&input.name)?;
        if self.class_repo.find_by_name(&name).await?.is_some() {
            return Err(AppError::Duplicate(format!(
                "Class with name \"{name}\" already exists"
            )));
        }

        let model = class::ActiveModel {
            id: Set(self.id_gen.generate()),
            name: Set(name),
            medium: Set(input.medium),
            is_active: Set(true),
            created_at: Set(Utc::now().into()),
            updated_at: Set(None),
        };

        let created = self.class_repo.create(model).await?;
        info!(class_id = %created.id, name = %created.name, "Created class");

        Ok(ClassResponse::new(created, 0))
    }

    /// List one page of classes ordered by name.
    pub async fn list(
        &self,
        request: PageRequest,
        include_inactive: bool,
    ) -> AppResult<Page<ClassResponse>> {
        let request = request.normalized();
        let total = self.class_repo.count(include_inactive).await?;
        let classes = self
            .class_repo
            .find_page(include_inactive, request.offset(), request.limit)
            .await?;

        Ok(Page::new(self.with_counts(classes).await?, request, total))
    }

    /// List the classes of one medium, or of every medium.
    pub async fn list_by_medium(
        &self,
        medium: Option<Medium>,
        include_inactive: bool,
    ) -> AppResult<Vec<ClassResponse>> {
        let classes = self
            .class_repo
            .find_by_medium(medium, include_inactive)
            .await?;
        self.with_counts(classes).await
    }

    /// Get a class with its sections and their student counts.
    pub async fn get(&self, id: &str) -> AppResult<ClassDetailResponse> {
        let class = self.class_repo.get_by_id(id).await?;

        let sections: Vec<section::Model> = self
            .section_repo
            .find_all(&SectionFilter {
                class_id: Some(id),
                department: DepartmentFilter::Any,
                include_inactive: true,
            })
            .await?;
        let section_ids: Vec<String> = sections.iter().map(|s| s.id.clone()).collect();
        let students = self.student_repo.counts_by_section(&section_ids).await?;

        let summaries: Vec<ClassSectionSummary> = sections
            .into_iter()
            .map(|s| ClassSectionSummary {
                count: SectionStudentCount {
                    students: students.get(&s.id).copied().unwrap_or(0),
                },
                id: s.id,
                name: s.name,
                department_id: s.department_id,
                capacity: s.capacity,
                is_active: s.is_active,
            })
            .collect();

        Ok(ClassDetailResponse {
            class: ClassResponse::new(class, summaries.len() as u64),
            sections: summaries,
        })
    }

    /// Update a class.
    pub async fn update(&self, id: &str, input: UpdateClassInput) -> AppResult<ClassResponse> {
        input.validate()?;

        let class = self.class_repo.get_by_id(id).await?;
        let mut active: class::ActiveModel = class.into();

        if let Some(name) = input.name {
            let name = clean_name(&name)?;
            let taken = self.class_repo.find_by_name(&name).await?;
            if taken.is_some_and(|existing| existing.id != id) {
                return Err(AppError::Duplicate(format!(
                    "Class with name \"{name}\" already exists"
                )));
            }
            active.name = Set(name);
        }
        if let Some(medium) = input.medium {
            active.medium = Set(medium);
        }
        if let Some(is_active) = input.is_active {
            active.is_active = Set(is_active);
        }
        active.updated_at = Set(Some(Utc::now().into()));

        let updated = self.class_repo.update(active).await?;
        self.with_count(updated).await
    }

    /// Delete a class that has no enrolled students.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        self.class_repo.get_by_id(id).await?;

        let students = self.student_repo.count_in_class(id).await?;
        if students > 0 {
            return Err(AppError::HasDependents(format!(
                "Cannot delete class with {students} enrolled students"
            )));
        }

        self.class_repo.delete(id).await?;
        info!(class_id = %id, "Deleted class");
        Ok(())
    }

    /// Set one activation state on many classes.
    ///
    /// Fails without touching anything when an id does not resolve.
    pub async fn bulk_set_active(&self, input: BulkUpdateInput) -> AppResult<Vec<ClassResponse>> {
        input.validate()?;

        let found = self.class_repo.find_by_ids(&input.ids).await?;
        let found_ids: Vec<String> = found.into_iter().map(|c| c.id).collect();
        ensure_all_found("Classes", &input.ids, &found_ids)?;

        let entries: Vec<(String, bool)> = found_ids
            .iter()
            .map(|id| (id.clone(), input.is_active))
            .collect();
        let affected = self.class_repo.set_active(&entries).await?;
        info!(affected, is_active = input.is_active, "Bulk updated classes");

        let refreshed = self.class_repo.find_by_ids(&found_ids).await?;
        self.with_counts(refreshed).await
    }

    /// Apply per-class activation in one transaction.
    ///
    /// Returns the refreshed classes, narrowed to the given medium when set.
    pub async fn setup(&self, input: ClassSetupInput) -> AppResult<Vec<ClassResponse>> {
        input.validate()?;

        let entries = dedupe_last_wins(
            input
                .class_configs
                .into_iter()
                .map(|c| (c.id, c.is_active)),
        );
        let requested: Vec<String> = entries.iter().map(|(id, _)| id.clone()).collect();
        let found = self.class_repo.find_by_ids(&requested).await?;
        let found_ids: Vec<String> = found.into_iter().map(|c| c.id).collect();
        ensure_all_found("Classes", &requested, &found_ids)?;

        let affected = self.class_repo.set_active(&entries).await?;
        info!(affected, "Applied class setup");

        self.list_by_medium(input.medium, true).await
    }

    /// Deactivate every class, or every class of one medium.
    pub async fn reset(&self, medium: Option<Medium>) -> AppResult<SetupSummary> {
        let affected = self.class_repo.deactivate_all(medium).await?;
        info!(affected, ?medium, "Reset classes");

        let message = match medium {
            Some(Medium::Bangla) => "All BANGLA classes have been reset to inactive",
            Some(Medium::English) => "All ENGLISH classes have been reset to inactive",
            None => "All classes have been reset to inactive",
        };
        Ok(SetupSummary::new(message, affected))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;

    fn create_mock_class(id: &str, name: &str) -> class::Model {
        class::Model {
            id: id.to_string(),
            name: name.to_string(),
            medium: Medium::Bangla,
            is_active: true,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    fn service_over(db: MockDatabase) -> ClassService {
        let db = Arc::new(db.into_connection());
        ClassService::new(
            ClassRepository::new(db.clone()),
            SectionRepository::new(db.clone()),
            StudentRepository::new(db),
        )
    }

    #[tokio::test]
    async fn test_create_rejects_duplicate_name() {
        let service = service_over(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_mock_class("c8", "Eight")]]),
        );

        let result = service
            .create(CreateClassInput {
                name: "Eight".to_string(),
                medium: Medium::Bangla,
            })
            .await;

        assert!(matches!(result, Err(AppError::Duplicate(_))));
    }

    #[tokio::test]
    async fn test_create_rejects_empty_name() {
        let service = service_over(MockDatabase::new(DatabaseBackend::Postgres));

        let result = service
            .create(CreateClassInput {
                name: String::new(),
                medium: Medium::Bangla,
            })
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_bulk_set_active_lists_missing_ids() {
        let service = service_over(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_mock_class("c1", "One")]]),
        );

        let result = service
            .bulk_set_active(BulkUpdateInput {
                ids: vec!["c1".to_string(), "ghost".to_string()],
                is_active: false,
            })
            .await;

        match result {
            Err(AppError::MissingIds { ids, .. }) => assert_eq!(ids, vec!["ghost".to_string()]),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_delete_missing_class_is_not_found() {
        let service = service_over(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<class::Model>::new()]),
        );

        let result = service.delete("ghost").await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }
}
