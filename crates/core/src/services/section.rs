//! Section registry and setup service.

use std::collections::HashSet;

use chrono::Utc;
use school_common::{AppError, AppResult, id::IdGenerator};
use school_db::entities::section;
use school_db::repositories::{
    ClassRepository, DepartmentFilter, DepartmentRepository, SectionFilter, SectionRepository,
    StudentRepository,
};
use sea_orm::{Set, prelude::DateTimeWithTimeZone};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use validator::Validate;

use crate::services::activation::{
    BulkUpdateInput, SetupSummary, clean_name, dedupe_last_wins, ensure_all_found, nullable,
};
use crate::services::paging::{Page, PageRequest};

/// Input for creating a section.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateSectionInput {
    #[validate(length(min = 1, max = 64))]
    pub name: String,
    #[validate(length(min = 1, max = 32))]
    pub class_id: String,
    #[validate(length(min = 1, max = 32))]
    pub department_id: Option<String>,
    #[validate(range(min = 1, max = 100))]
    pub capacity: Option<i32>,
}

/// Input for updating a section.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSectionInput {
    #[validate(length(min = 1, max = 64))]
    pub name: Option<String>,
    #[validate(length(min = 1, max = 32))]
    pub class_id: Option<String>,
    /// `Some(None)` moves the section out of its department.
    #[serde(default, deserialize_with = "nullable")]
    pub department_id: Option<Option<String>>,
    #[validate(range(min = 1, max = 100))]
    pub capacity: Option<i32>,
    pub is_active: Option<bool>,
}

/// One row of a section setup request.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SectionConfigInput {
    /// Existing section to toggle; absent to create a new one.
    pub id: Option<String>,
    #[validate(length(min = 1, max = 64))]
    pub name: String,
    pub is_active: bool,
}

/// Input for reconciling the sections of a `(class, department)` scope.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SectionSetupInput {
    #[validate(length(min = 1, max = 32))]
    pub class_id: String,
    pub department_id: Option<String>,
    #[validate(nested)]
    pub section_configs: Vec<SectionConfigInput>,
}

/// Nested counts of a section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SectionCount {
    pub students: u64,
}

/// Section as returned by the API.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionResponse {
    pub id: String,
    pub name: String,
    pub class_id: String,
    pub department_id: Option<String>,
    pub capacity: i32,
    pub is_active: bool,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: Option<DateTimeWithTimeZone>,
    #[serde(rename = "_count")]
    pub count: SectionCount,
}

impl SectionResponse {
    fn new(model: section::Model, students: u64) -> Self {
        Self {
            id: model.id,
            name: model.name,
            class_id: model.class_id,
            department_id: model.department_id,
            capacity: model.capacity,
            is_active: model.is_active,
            created_at: model.created_at,
            updated_at: model.updated_at,
            count: SectionCount { students },
        }
    }
}

/// Service for managing sections.
#[derive(Clone)]
pub struct SectionService {
    section_repo: SectionRepository,
    class_repo: ClassRepository,
    department_repo: DepartmentRepository,
    student_repo: StudentRepository,
    id_gen: IdGenerator,
}

impl SectionService {
    /// Create a new section service.
    #[must_use]
    pub const fn new(
        section_repo: SectionRepository,
        class_repo: ClassRepository,
        department_repo: DepartmentRepository,
        student_repo: StudentRepository,
    ) -> Self {
        Self {
            section_repo,
            class_repo,
            department_repo,
            student_repo,
            id_gen: IdGenerator::new(),
        }
    }

    async fn with_counts(&self, sections: Vec<section::Model>) -> AppResult<Vec<SectionResponse>> {
        let ids: Vec<String> = sections.iter().map(|s| s.id.clone()).collect();
        let counts = self.student_repo.counts_by_section(&ids).await?;

        Ok(sections
            .into_iter()
            .map(|s| {
                let students = counts.get(&s.id).copied().unwrap_or(0);
                SectionResponse::new(s, students)
            })
            .collect())
    }

    async fn with_count(&self, section: section::Model) -> AppResult<SectionResponse> {
        let students = self.student_repo.count_in_section(&section.id).await?;
        Ok(SectionResponse::new(section, students))
    }

    /// Referenced class must exist.
    async fn check_class_reference(&self, class_id: &str) -> AppResult<()> {
        if self.class_repo.find_by_id(class_id).await?.is_none() {
            return Err(AppError::InvalidReference(format!(
                "Class with ID {class_id} not found"
            )));
        }
        Ok(())
    }

    /// Referenced department, when given, must exist.
    async fn check_department_reference(&self, department_id: Option<&str>) -> AppResult<()> {
        let Some(department_id) = department_id else {
            return Ok(());
        };
        if self.department_repo.find_by_id(department_id).await?.is_none() {
            return Err(AppError::InvalidReference(format!(
                "Department with ID {department_id} not found"
            )));
        }
        Ok(())
    }

    fn duplicate(name: &str) -> AppError {
        AppError::Duplicate(format!(
            "Section \"{name}\" already exists in this class and department"
        ))
    }

    /// Find a section by exact name within a `(class, department)` scope.
    pub async fn find_in_scope(
        &self,
        class_id: &str,
        department_id: Option<&str>,
        name: &str,
    ) -> AppResult<Option<section::Model>> {
        self.section_repo
            .find_by_name_in_scope(class_id, department_id, name)
            .await
    }

    /// Create a new section.
    pub async fn create(&self, input: CreateSectionInput) -> AppResult<SectionResponse> {
        input.validate()?;

        self.check_class_reference(&input.class_id).await?;
        self.check_department_reference(input.department_id.as_deref())
            .await?;

        let name = clean_name(&input.name)?;
        if self
            .section_repo
            .find_by_name_in_scope(&input.class_id, input.department_id.as_deref(), &name)
            .await?
            .is_some()
        {
            return Err(Self::duplicate(&name));
        }

        let model = section::ActiveModel {
            id: Set(self.id_gen.generate()),
            name: Set(name),
            class_id: Set(input.class_id),
            department_id: Set(input.department_id),
            capacity: Set(input.capacity.unwrap_or(section::DEFAULT_CAPACITY)),
            is_active: Set(true),
            created_at: Set(Utc::now().into()),
            updated_at: Set(None),
        };

        let created = self.section_repo.create(model).await?;
        info!(section_id = %created.id, class_id = %created.class_id, name = %created.name, "Created section");

        Ok(SectionResponse::new(created, 0))
    }

    /// List one page of sections across every class.
    pub async fn list(
        &self,
        request: PageRequest,
        include_inactive: bool,
    ) -> AppResult<Page<SectionResponse>> {
        let filter = SectionFilter {
            include_inactive,
            ..SectionFilter::default()
        };
        self.page(&filter, request).await
    }

    /// List one page of the sections of a class, optionally narrowed to a department.
    pub async fn list_by_class(
        &self,
        class_id: &str,
        department_id: Option<&str>,
        request: PageRequest,
        include_inactive: bool,
    ) -> AppResult<Page<SectionResponse>> {
        self.class_repo.get_by_id(class_id).await?;

        let filter = SectionFilter {
            class_id: Some(class_id),
            department: DepartmentFilter::optional(department_id),
            include_inactive,
        };
        self.page(&filter, request).await
    }

    async fn page(
        &self,
        filter: &SectionFilter<'_>,
        request: PageRequest,
    ) -> AppResult<Page<SectionResponse>> {
        let request = request.normalized();
        let total = self.section_repo.count(filter).await?;
        let sections = self
            .section_repo
            .find_page(filter, request.offset(), request.limit)
            .await?;

        Ok(Page::new(self.with_counts(sections).await?, request, total))
    }

    /// Every section of one exact `(class, department)` scope, inactive included.
    pub async fn list_scope(
        &self,
        class_id: &str,
        department_id: Option<&str>,
    ) -> AppResult<Vec<SectionResponse>> {
        self.class_repo.get_by_id(class_id).await?;

        let sections = self
            .section_repo
            .find_all(&SectionFilter {
                class_id: Some(class_id),
                department: DepartmentFilter::exact(department_id),
                include_inactive: true,
            })
            .await?;
        self.with_counts(sections).await
    }

    /// Get a section.
    pub async fn get(&self, id: &str) -> AppResult<SectionResponse> {
        let section = self.section_repo.get_by_id(id).await?;
        self.with_count(section).await
    }

    /// Update a section, re-checking references and scope uniqueness.
    pub async fn update(&self, id: &str, input: UpdateSectionInput) -> AppResult<SectionResponse> {
        input.validate()?;

        let section = self.section_repo.get_by_id(id).await?;

        let class_id = input.class_id.unwrap_or_else(|| section.class_id.clone());
        let department_id = input
            .department_id
            .unwrap_or_else(|| section.department_id.clone());
        let name = match &input.name {
            Some(name) => clean_name(name)?,
            None => section.name.clone(),
        };

        if class_id != section.class_id {
            self.check_class_reference(&class_id).await?;
        }
        if department_id != section.department_id {
            self.check_department_reference(department_id.as_deref())
                .await?;
        }

        let taken = self
            .section_repo
            .find_by_name_in_scope(&class_id, department_id.as_deref(), &name)
            .await?;
        if taken.is_some_and(|existing| existing.id != id) {
            return Err(Self::duplicate(&name));
        }

        let mut active: section::ActiveModel = section.into();
        active.name = Set(name);
        active.class_id = Set(class_id);
        active.department_id = Set(department_id);
        if let Some(capacity) = input.capacity {
            active.capacity = Set(capacity);
        }
        if let Some(is_active) = input.is_active {
            active.is_active = Set(is_active);
        }
        active.updated_at = Set(Some(Utc::now().into()));

        let updated = self.section_repo.update(active).await?;
        self.with_count(updated).await
    }

    /// Delete a section without enrolled students.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        self.section_repo.get_by_id(id).await?;

        let students = self.student_repo.count_in_section(id).await?;
        if students > 0 {
            return Err(AppError::HasDependents(format!(
                "Cannot delete section with {students} enrolled students"
            )));
        }

        self.section_repo.delete(id).await?;
        info!(section_id = %id, "Deleted section");
        Ok(())
    }

    /// Set one activation state on many sections.
    pub async fn bulk_set_active(&self, input: BulkUpdateInput) -> AppResult<Vec<SectionResponse>> {
        input.validate()?;

        let found = self.section_repo.find_by_ids(&input.ids).await?;
        let found_ids: Vec<String> = found.into_iter().map(|s| s.id).collect();
        ensure_all_found("Sections", &input.ids, &found_ids)?;

        let entries: Vec<(String, bool)> = found_ids
            .iter()
            .map(|id| (id.clone(), input.is_active))
            .collect();
        let affected = self.section_repo.set_active(&entries).await?;
        info!(affected, is_active = input.is_active, "Bulk updated sections");

        let refreshed = self.section_repo.find_by_ids(&found_ids).await?;
        self.with_counts(refreshed).await
    }

    /// Reconcile the sections of one `(class, department)` scope.
    ///
    /// Rows with an `id` toggle that section; rows without one create a
    /// section. New names must be unique in the scope and in the batch.
    /// Everything is validated first, then applied in one transaction.
    pub async fn setup(&self, input: SectionSetupInput) -> AppResult<Vec<SectionResponse>> {
        input.validate()?;

        let class_id = input.class_id.as_str();
        let department_id = input.department_id.as_deref();

        self.class_repo.get_by_id(class_id).await?;
        self.check_department_reference(department_id).await?;

        let existing = self
            .section_repo
            .find_all(&SectionFilter {
                class_id: Some(class_id),
                department: DepartmentFilter::exact(department_id),
                include_inactive: true,
            })
            .await?;

        let mut toggles = Vec::new();
        let mut new_names: Vec<(String, bool)> = Vec::new();
        for config in &input.section_configs {
            match &config.id {
                Some(id) => toggles.push((id.clone(), config.is_active)),
                None => new_names.push((clean_name(&config.name)?, config.is_active)),
            }
        }

        let unknown: Vec<String> = toggles
            .iter()
            .filter(|(id, _)| !existing.iter().any(|s| &s.id == id))
            .map(|(id, _)| id.clone())
            .collect();
        if !unknown.is_empty() {
            return Err(AppError::InvalidReference(format!(
                "Sections not found in this class and department: {}",
                unknown.join(", ")
            )));
        }

        let mut seen: HashSet<&str> = existing.iter().map(|s| s.name.as_str()).collect();
        for (name, _) in &new_names {
            if !seen.insert(name.as_str()) {
                return Err(Self::duplicate(name));
            }
        }

        let now: DateTimeWithTimeZone = Utc::now().into();
        let creates: Vec<section::ActiveModel> = new_names
            .into_iter()
            .map(|(name, is_active)| section::ActiveModel {
                id: Set(self.id_gen.generate()),
                name: Set(name),
                class_id: Set(class_id.to_string()),
                department_id: Set(department_id.map(ToString::to_string)),
                capacity: Set(section::DEFAULT_CAPACITY),
                is_active: Set(is_active),
                created_at: Set(now),
                updated_at: Set(None),
            })
            .collect();

        let toggles = dedupe_last_wins(toggles);
        debug!(toggles = toggles.len(), creates = creates.len(), "Applying section setup");
        let affected = self.section_repo.apply_setup(&toggles, creates).await?;
        info!(class_id = %class_id, ?department_id, affected, "Applied section setup");

        self.list_scope(class_id, department_id).await
    }

    /// Deactivate the sections of a class, optionally narrowed to one department.
    pub async fn reset(
        &self,
        class_id: &str,
        department_id: Option<&str>,
    ) -> AppResult<SetupSummary> {
        let class = self.class_repo.get_by_id(class_id).await?;

        let affected = self
            .section_repo
            .deactivate(class_id, DepartmentFilter::optional(department_id))
            .await?;
        info!(class_id = %class_id, ?department_id, affected, "Reset sections");

        Ok(SetupSummary::new(
            format!(
                "All sections for class {} have been reset to inactive",
                class.name
            ),
            affected,
        ))
    }
}
