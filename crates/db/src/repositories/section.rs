//! Section repository.

use std::collections::HashMap;
use std::sync::Arc;

use crate::entities::{Section, section};
use crate::repositories::{ActivationColumns, apply_activation, apply_activation_in};
use chrono::Utc;
use school_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Select, TransactionTrait, prelude::DateTimeWithTimeZone,
    sea_query::Expr,
};

const ACTIVATION: ActivationColumns<section::Column> = ActivationColumns {
    id: section::Column::Id,
    is_active: section::Column::IsActive,
    updated_at: section::Column::UpdatedAt,
};

/// How a section query treats the department column.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DepartmentFilter<'a> {
    /// Any department, including none.
    #[default]
    Any,
    /// Only sections without a department.
    Unassigned,
    /// Only sections of this department.
    Only(&'a str),
}

impl<'a> DepartmentFilter<'a> {
    /// Exact scope: a missing department selects the unassigned sections.
    #[must_use]
    pub const fn exact(department_id: Option<&'a str>) -> Self {
        match department_id {
            Some(id) => Self::Only(id),
            None => Self::Unassigned,
        }
    }

    /// Optional narrowing: a missing department means no restriction.
    #[must_use]
    pub const fn optional(department_id: Option<&'a str>) -> Self {
        match department_id {
            Some(id) => Self::Only(id),
            None => Self::Any,
        }
    }

    fn condition(self) -> Condition {
        match self {
            Self::Any => Condition::all(),
            Self::Unassigned => Condition::all().add(section::Column::DepartmentId.is_null()),
            Self::Only(id) => Condition::all().add(section::Column::DepartmentId.eq(id)),
        }
    }
}

/// Filter for section listings.
#[derive(Debug, Clone, Copy, Default)]
pub struct SectionFilter<'a> {
    pub class_id: Option<&'a str>,
    pub department: DepartmentFilter<'a>,
    pub include_inactive: bool,
}

/// Section repository for database operations.
#[derive(Clone)]
pub struct SectionRepository {
    db: Arc<DatabaseConnection>,
}

impl SectionRepository {
    /// Create a new section repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a section by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<section::Model>> {
        Section::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(AppError::from_db)
    }

    /// Get a section by ID, returning `NotFound` if missing.
    pub async fn get_by_id(&self, id: &str) -> AppResult<section::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Section with ID {id} not found")))
    }

    /// Find sections by IDs.
    pub async fn find_by_ids(&self, ids: &[String]) -> AppResult<Vec<section::Model>> {
        if ids.is_empty() {
            return Ok(vec![]);
        }

        Section::find()
            .filter(section::Column::Id.is_in(ids.to_vec()))
            .order_by_asc(section::Column::Name)
            .all(self.db.as_ref())
            .await
            .map_err(AppError::from_db)
    }

    /// Find the section named `name` in the exact `(class, department)` scope.
    pub async fn find_by_name_in_scope(
        &self,
        class_id: &str,
        department_id: Option<&str>,
        name: &str,
    ) -> AppResult<Option<section::Model>> {
        Section::find()
            .filter(section::Column::ClassId.eq(class_id))
            .filter(DepartmentFilter::exact(department_id).condition())
            .filter(section::Column::Name.eq(name))
            .one(self.db.as_ref())
            .await
            .map_err(AppError::from_db)
    }

    fn listing(filter: &SectionFilter<'_>) -> Select<Section> {
        let mut query = Section::find().filter(filter.department.condition());
        if let Some(class_id) = filter.class_id {
            query = query.filter(section::Column::ClassId.eq(class_id));
        }
        if !filter.include_inactive {
            query = query.filter(section::Column::IsActive.eq(true));
        }
        query
    }

    /// List one page of sections ordered by name.
    pub async fn find_page(
        &self,
        filter: &SectionFilter<'_>,
        offset: u64,
        limit: u64,
    ) -> AppResult<Vec<section::Model>> {
        Self::listing(filter)
            .order_by_asc(section::Column::Name)
            .offset(offset)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(AppError::from_db)
    }

    /// Count sections matching a filter.
    pub async fn count(&self, filter: &SectionFilter<'_>) -> AppResult<u64> {
        Self::listing(filter)
            .count(self.db.as_ref())
            .await
            .map_err(AppError::from_db)
    }

    /// List every section matching a filter, ordered by name.
    pub async fn find_all(&self, filter: &SectionFilter<'_>) -> AppResult<Vec<section::Model>> {
        Self::listing(filter)
            .order_by_asc(section::Column::Name)
            .all(self.db.as_ref())
            .await
            .map_err(AppError::from_db)
    }

    /// Create a new section.
    pub async fn create(&self, model: section::ActiveModel) -> AppResult<section::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(AppError::from_db)
    }

    /// Update a section.
    pub async fn update(&self, model: section::ActiveModel) -> AppResult<section::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(AppError::from_db)
    }

    /// Delete a section.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        Section::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .map_err(AppError::from_db)?;
        Ok(())
    }

    /// Set the activation flag of each listed section in one transaction.
    pub async fn set_active(&self, entries: &[(String, bool)]) -> AppResult<u64> {
        apply_activation::<Section>(self.db.as_ref(), ACTIVATION, entries).await
    }

    /// Toggle existing sections and insert new ones in one transaction.
    pub async fn apply_setup(
        &self,
        updates: &[(String, bool)],
        creates: Vec<section::ActiveModel>,
    ) -> AppResult<u64> {
        let txn = self.db.begin().await.map_err(AppError::from_db)?;

        let mut affected = apply_activation_in::<Section, _>(&txn, ACTIVATION, updates).await?;
        for model in creates {
            model.insert(&txn).await.map_err(AppError::from_db)?;
            affected += 1;
        }

        txn.commit().await.map_err(AppError::from_db)?;
        Ok(affected)
    }

    /// Deactivate the sections of a class, optionally narrowed to one department.
    pub async fn deactivate(
        &self,
        class_id: &str,
        department: DepartmentFilter<'_>,
    ) -> AppResult<u64> {
        let now: DateTimeWithTimeZone = Utc::now().into();
        let result = Section::update_many()
            .col_expr(section::Column::IsActive, Expr::value(false))
            .col_expr(section::Column::UpdatedAt, Expr::value(now))
            .filter(section::Column::ClassId.eq(class_id))
            .filter(department.condition())
            .exec(self.db.as_ref())
            .await
            .map_err(AppError::from_db)?;
        Ok(result.rows_affected)
    }

    /// Section counts keyed by class.
    pub async fn counts_by_class(&self, class_ids: &[String]) -> AppResult<HashMap<String, u64>> {
        if class_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows: Vec<(String, i64)> = Section::find()
            .select_only()
            .column(section::Column::ClassId)
            .column_as(Expr::col(section::Column::Id).count(), "count")
            .filter(section::Column::ClassId.is_in(class_ids.to_vec()))
            .group_by(section::Column::ClassId)
            .into_tuple()
            .all(self.db.as_ref())
            .await
            .map_err(AppError::from_db)?;

        Ok(rows.into_iter().map(|(id, n)| (id, n as u64)).collect())
    }

    /// Section counts keyed by department, across every class.
    pub async fn counts_by_department(
        &self,
        department_ids: &[String],
    ) -> AppResult<HashMap<String, u64>> {
        if department_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows: Vec<(Option<String>, i64)> = Section::find()
            .select_only()
            .column(section::Column::DepartmentId)
            .column_as(Expr::col(section::Column::Id).count(), "count")
            .filter(section::Column::DepartmentId.is_in(department_ids.to_vec()))
            .group_by(section::Column::DepartmentId)
            .into_tuple()
            .all(self.db.as_ref())
            .await
            .map_err(AppError::from_db)?;

        Ok(rows
            .into_iter()
            .filter_map(|(id, n)| id.map(|id| (id, n as u64)))
            .collect())
    }

    /// Section counts of one class keyed by department (`None` for unassigned sections).
    pub async fn counts_by_department_in_class(
        &self,
        class_id: &str,
    ) -> AppResult<HashMap<Option<String>, u64>> {
        let rows: Vec<(Option<String>, i64)> = Section::find()
            .select_only()
            .column(section::Column::DepartmentId)
            .column_as(Expr::col(section::Column::Id).count(), "count")
            .filter(section::Column::ClassId.eq(class_id))
            .group_by(section::Column::DepartmentId)
            .into_tuple()
            .all(self.db.as_ref())
            .await
            .map_err(AppError::from_db)?;

        Ok(rows.into_iter().map(|(id, n)| (id, n as u64)).collect())
    }
}
