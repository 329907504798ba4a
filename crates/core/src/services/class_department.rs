//! Class-department association service.
//!
//! A department is offered in a class when an active association row
//! exists for the pair. No row reads as inactive.

use school_common::{AppError, AppResult, id::IdGenerator};
use school_db::entities::class::Medium;
use school_db::repositories::{
    ClassDepartmentRepository, ClassRepository, DepartmentRepository, SectionRepository,
    missing_ids,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use validator::Validate;

use crate::services::activation::{SetupSummary, dedupe_last_wins};

/// Desired state of one department within a class.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct DepartmentActivationInput {
    #[validate(length(min = 1, max = 32))]
    pub department_id: String,
    pub is_active: bool,
}

/// Input for configuring the departments of one class.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ClassDepartmentSetupInput {
    #[validate(length(min = 1, max = 32))]
    pub class_id: String,
    #[validate(nested)]
    pub departments: Vec<DepartmentActivationInput>,
}

/// Class header of a class-department view.
#[derive(Debug, Clone, Serialize)]
pub struct ClassSummary {
    pub id: String,
    pub name: String,
    pub medium: Medium,
}

/// Department header nested in an association row.
#[derive(Debug, Clone, Serialize)]
pub struct DepartmentSummary {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
}

/// Section count scoped to one class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ScopedSectionCount {
    pub sections: u64,
}

/// One department as seen from a class.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassDepartmentStatus {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    /// Class-specific activation, false when no association row exists.
    pub is_active: bool,
    /// Association row id, absent until the pair has been configured.
    pub class_department_id: Option<String>,
    #[serde(rename = "_count")]
    pub count: ScopedSectionCount,
}

/// Every active department with its status in one class.
#[derive(Debug, Clone, Serialize)]
pub struct ClassDepartmentsView {
    pub class: ClassSummary,
    pub departments: Vec<ClassDepartmentStatus>,
}

/// An association row with its department.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassDepartmentResponse {
    pub id: String,
    pub class_id: String,
    pub department_id: String,
    pub is_active: bool,
    pub department: DepartmentSummary,
}

/// Service for the per-class department switches.
#[derive(Clone)]
pub struct ClassDepartmentService {
    link_repo: ClassDepartmentRepository,
    class_repo: ClassRepository,
    department_repo: DepartmentRepository,
    section_repo: SectionRepository,
    id_gen: IdGenerator,
}

impl ClassDepartmentService {
    /// Create a new class-department service.
    #[must_use]
    pub const fn new(
        link_repo: ClassDepartmentRepository,
        class_repo: ClassRepository,
        department_repo: DepartmentRepository,
        section_repo: SectionRepository,
    ) -> Self {
        Self {
            link_repo,
            class_repo,
            department_repo,
            section_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Every active department with its activation specific to this class.
    pub async fn get_for_class(&self, class_id: &str) -> AppResult<ClassDepartmentsView> {
        let class = self.class_repo.get_by_id(class_id).await?;

        let departments = self.department_repo.find_all(false).await?;
        let links = self.link_repo.find_by_class(class_id).await?;
        let counts = self
            .section_repo
            .counts_by_department_in_class(class_id)
            .await?;

        let departments = departments
            .into_iter()
            .map(|d| {
                let link = links.iter().find(|l| l.department_id == d.id);
                ClassDepartmentStatus {
                    is_active: link.is_some_and(|l| l.is_active),
                    class_department_id: link.map(|l| l.id.clone()),
                    count: ScopedSectionCount {
                        sections: counts.get(&Some(d.id.clone())).copied().unwrap_or(0),
                    },
                    id: d.id,
                    name: d.name,
                    description: d.description,
                }
            })
            .collect();

        Ok(ClassDepartmentsView {
            class: ClassSummary {
                id: class.id,
                name: class.name,
                medium: class.medium,
            },
            departments,
        })
    }

    /// Upsert the department switches of one class in a single transaction.
    pub async fn setup_for_class(
        &self,
        input: ClassDepartmentSetupInput,
    ) -> AppResult<Vec<ClassDepartmentResponse>> {
        input.validate()?;

        self.class_repo.get_by_id(&input.class_id).await?;

        let entries = dedupe_last_wins(
            input
                .departments
                .into_iter()
                .map(|d| (d.department_id, d.is_active)),
        );
        let requested: Vec<String> = entries.iter().map(|(id, _)| id.clone()).collect();
        let found = self.department_repo.find_by_ids(&requested).await?;
        let found_ids: Vec<String> = found.into_iter().map(|d| d.id).collect();
        let missing = missing_ids(&requested, &found_ids);
        if !missing.is_empty() {
            return Err(AppError::InvalidReference(format!(
                "Departments not found: {}",
                missing.join(", ")
            )));
        }

        let ids = entries.iter().map(|_| self.id_gen.generate()).collect();
        let affected = self
            .link_repo
            .upsert_many(&input.class_id, &entries, ids)
            .await?;
        info!(class_id = %input.class_id, affected, "Applied class department setup");

        self.list_links(&input.class_id).await
    }

    /// Association rows of a class with their departments.
    pub async fn list_links(&self, class_id: &str) -> AppResult<Vec<ClassDepartmentResponse>> {
        let rows = self.link_repo.find_by_class_with_department(class_id).await?;

        Ok(rows
            .into_iter()
            .map(|(link, department)| ClassDepartmentResponse {
                id: link.id,
                class_id: link.class_id,
                department_id: link.department_id,
                is_active: link.is_active,
                department: DepartmentSummary {
                    id: department.id,
                    name: department.name,
                    description: department.description,
                },
            })
            .collect())
    }

    /// Deactivate every department switch of a class.
    pub async fn reset_for_class(&self, class_id: &str) -> AppResult<SetupSummary> {
        let class = self.class_repo.get_by_id(class_id).await?;

        let affected = self.link_repo.deactivate_for_class(class_id).await?;
        info!(class_id = %class_id, affected, "Reset class departments");

        Ok(SetupSummary::new(
            format!(
                "All departments for class {} have been reset to inactive",
                class.name
            ),
            affected,
        ))
    }
}
