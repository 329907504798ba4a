//! Demo data.
//!
//! Populates a fresh database with the standard grades, departments and a
//! few sections through the same services the API uses. Rows that already
//! exist are left alone, so running it twice is harmless.

use school_common::AppResult;
use school_db::entities::class::Medium;
use serde::Serialize;
use tracing::info;

use crate::services::class::{ClassService, CreateClassInput};
use crate::services::class_department::{
    ClassDepartmentService, ClassDepartmentSetupInput, DepartmentActivationInput,
};
use crate::services::department::{CreateDepartmentInput, DepartmentService};
use crate::services::section::{CreateSectionInput, SectionService};

/// Grades, lowest first.
pub const DEMO_CLASSES: &[&str] = &[
    "Play", "Nursery", "KG", "One", "Two", "Three", "Four", "Five", "Six", "Seven", "Eight",
    "Nine", "Ten",
];

/// Departments with their descriptions.
pub const DEMO_DEPARTMENTS: &[(&str, &str)] = &[
    ("Science", "Science department"),
    ("Business Studies", "Business Studies department"),
    ("Humanities", "Humanities department"),
    ("Vocational - General Mechanics", "Vocational General Mechanics"),
    ("Vocational - Electrical", "Vocational Electrical"),
    ("Vocational", "General Vocational"),
    ("B.S.S", "Bachelor of Social Science"),
];

/// Classes that offer every department.
const DEPARTMENT_CLASSES: &[&str] = &["Nine", "Ten"];

/// What a seeding run created.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedReport {
    pub classes_created: u64,
    pub departments_created: u64,
    pub sections_created: u64,
    pub class_departments_configured: u64,
}

/// Seeds demo data through the registry services.
#[derive(Clone)]
pub struct SeedService {
    class_service: ClassService,
    department_service: DepartmentService,
    class_department_service: ClassDepartmentService,
    section_service: SectionService,
}

impl SeedService {
    /// Create a new seed service.
    #[must_use]
    pub const fn new(
        class_service: ClassService,
        department_service: DepartmentService,
        class_department_service: ClassDepartmentService,
        section_service: SectionService,
    ) -> Self {
        Self {
            class_service,
            department_service,
            class_department_service,
            section_service,
        }
    }

    /// Create whatever part of the demo data is missing.
    pub async fn seed_demo_data(&self) -> AppResult<SeedReport> {
        let mut report = SeedReport::default();

        for name in DEMO_CLASSES {
            if self.class_service.find_by_name(name).await?.is_none() {
                self.class_service
                    .create(CreateClassInput {
                        name: (*name).to_string(),
                        medium: Medium::Bangla,
                    })
                    .await?;
                report.classes_created += 1;
            }
        }

        for (name, description) in DEMO_DEPARTMENTS {
            if self.department_service.find_by_name(name).await?.is_none() {
                self.department_service
                    .create(CreateDepartmentInput {
                        name: (*name).to_string(),
                        description: Some((*description).to_string()),
                    })
                    .await?;
                report.departments_created += 1;
            }
        }

        report.sections_created += self.seed_sections("One", None, &["A", "B", "C"]).await?;
        report.sections_created += self
            .seed_sections("Eight", Some("Science"), &["A", "B"])
            .await?;

        let departments = self.department_service.list_all(true).await?;
        for class_name in DEPARTMENT_CLASSES {
            let Some(class) = self.class_service.find_by_name(class_name).await? else {
                continue;
            };
            let linked = self.class_department_service.list_links(&class.id).await?;
            let unlinked: Vec<DepartmentActivationInput> = departments
                .iter()
                .filter(|d| !linked.iter().any(|l| l.department_id == d.id))
                .map(|d| DepartmentActivationInput {
                    department_id: d.id.clone(),
                    is_active: true,
                })
                .collect();
            if unlinked.is_empty() {
                continue;
            }

            report.class_departments_configured += unlinked.len() as u64;
            self.class_department_service
                .setup_for_class(ClassDepartmentSetupInput {
                    class_id: class.id,
                    departments: unlinked,
                })
                .await?;
        }

        info!(
            classes = report.classes_created,
            departments = report.departments_created,
            sections = report.sections_created,
            "Seeded demo data"
        );
        Ok(report)
    }

    async fn seed_sections(
        &self,
        class_name: &str,
        department_name: Option<&str>,
        names: &[&str],
    ) -> AppResult<u64> {
        let Some(class) = self.class_service.find_by_name(class_name).await? else {
            return Ok(0);
        };
        let department_id = match department_name {
            Some(name) => match self.department_service.find_by_name(name).await? {
                Some(department) => Some(department.id),
                None => return Ok(0),
            },
            None => None,
        };

        let mut created = 0;
        for name in names {
            let existing = self
                .section_service
                .find_in_scope(&class.id, department_id.as_deref(), name)
                .await?;
            if existing.is_none() {
                self.section_service
                    .create(CreateSectionInput {
                        name: (*name).to_string(),
                        class_id: class.id.clone(),
                        department_id: department_id.clone(),
                        capacity: None,
                    })
                    .await?;
                created += 1;
            }
        }
        Ok(created)
    }
}
