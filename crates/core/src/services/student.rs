//! Student registry service.
//!
//! Only what the delete guards of the class hierarchy need: enrol, look
//! up, list and remove.

use chrono::Utc;
use school_common::{AppError, AppResult, id::IdGenerator};
use school_db::entities::student;
use school_db::repositories::{SectionRepository, StudentFilter, StudentRepository};
use sea_orm::Set;
use serde::Deserialize;
use tracing::info;
use validator::Validate;

use crate::services::activation::clean_name;
use crate::services::paging::{Page, PageRequest};

/// Input for enrolling a student.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateStudentInput {
    #[validate(length(min = 1, max = 128))]
    pub first_name: String,
    #[validate(length(max = 128))]
    pub last_name: Option<String>,
    #[validate(length(min = 1, max = 32))]
    pub roll_number: Option<String>,
    #[validate(length(min = 1, max = 32))]
    pub section_id: String,
}

/// Query for listing students.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentQuery {
    pub section_id: Option<String>,
    pub class_id: Option<String>,
}

/// Service for managing students.
#[derive(Clone)]
pub struct StudentService {
    student_repo: StudentRepository,
    section_repo: SectionRepository,
    id_gen: IdGenerator,
}

impl StudentService {
    /// Create a new student service.
    #[must_use]
    pub const fn new(student_repo: StudentRepository, section_repo: SectionRepository) -> Self {
        Self {
            student_repo,
            section_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Enrol a student in a section.
    pub async fn create(&self, input: CreateStudentInput) -> AppResult<student::Model> {
        input.validate()?;
        let first_name = clean_name(&input.first_name)?;

        if self.section_repo.find_by_id(&input.section_id).await?.is_none() {
            return Err(AppError::InvalidReference(format!(
                "Section with ID {} not found",
                input.section_id
            )));
        }

        if let Some(roll_number) = &input.roll_number {
            let taken = self.student_repo.find_by_roll_number(roll_number).await?;
            if taken.is_some() {
                return Err(AppError::Duplicate(format!(
                    "Student with roll number {roll_number} already exists"
                )));
            }
        }

        let model = student::ActiveModel {
            id: Set(self.id_gen.generate()),
            first_name: Set(first_name),
            last_name: Set(input.last_name),
            roll_number: Set(input.roll_number),
            section_id: Set(input.section_id),
            is_active: Set(true),
            created_at: Set(Utc::now().into()),
            updated_at: Set(None),
        };

        let created = self.student_repo.create(model).await?;
        info!(student_id = %created.id, section_id = %created.section_id, "Enrolled student");
        Ok(created)
    }

    /// Get a student.
    pub async fn get(&self, id: &str) -> AppResult<student::Model> {
        self.student_repo.get_by_id(id).await
    }

    /// List one page of students.
    pub async fn list(
        &self,
        query: &StudentQuery,
        request: PageRequest,
        include_inactive: bool,
    ) -> AppResult<Page<student::Model>> {
        let request = request.normalized();
        let filter = StudentFilter {
            section_id: query.section_id.as_deref(),
            class_id: query.class_id.as_deref(),
            include_inactive,
        };

        let total = self.student_repo.count(&filter).await?;
        let students = self
            .student_repo
            .find_page(&filter, request.offset(), request.limit)
            .await?;

        Ok(Page::new(students, request, total))
    }

    /// Remove a student.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        self.student_repo.get_by_id(id).await?;
        self.student_repo.delete(id).await?;
        info!(student_id = %id, "Removed student");
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use school_db::entities::section;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_create_in_unknown_section_is_invalid_reference() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<section::Model>::new()])
                .into_connection(),
        );
        let service = StudentService::new(
            StudentRepository::new(db.clone()),
            SectionRepository::new(db),
        );

        let result = service
            .create(CreateStudentInput {
                first_name: "Nadia".to_string(),
                last_name: None,
                roll_number: None,
                section_id: "ghost".to_string(),
            })
            .await;

        assert!(matches!(result, Err(AppError::InvalidReference(_))));
    }
}
