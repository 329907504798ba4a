//! Department repository.

use std::sync::Arc;

use crate::entities::{Department, class_department, department};
use crate::repositories::{ActivationColumns, apply_activation};
use chrono::Utc;
use school_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, JoinType, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, RelationTrait, Select, prelude::DateTimeWithTimeZone,
    sea_query::Expr,
};

const ACTIVATION: ActivationColumns<department::Column> = ActivationColumns {
    id: department::Column::Id,
    is_active: department::Column::IsActive,
    updated_at: department::Column::UpdatedAt,
};

/// Department repository for database operations.
#[derive(Clone)]
pub struct DepartmentRepository {
    db: Arc<DatabaseConnection>,
}

impl DepartmentRepository {
    /// Create a new department repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a department by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<department::Model>> {
        Department::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(AppError::from_db)
    }

    /// Get a department by ID, returning `NotFound` if missing.
    pub async fn get_by_id(&self, id: &str) -> AppResult<department::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Department with ID {id} not found")))
    }

    /// Find a department by its exact name.
    pub async fn find_by_name(&self, name: &str) -> AppResult<Option<department::Model>> {
        Department::find()
            .filter(department::Column::Name.eq(name))
            .one(self.db.as_ref())
            .await
            .map_err(AppError::from_db)
    }

    /// Find departments by IDs.
    pub async fn find_by_ids(&self, ids: &[String]) -> AppResult<Vec<department::Model>> {
        if ids.is_empty() {
            return Ok(vec![]);
        }

        Department::find()
            .filter(department::Column::Id.is_in(ids.to_vec()))
            .order_by_asc(department::Column::Name)
            .all(self.db.as_ref())
            .await
            .map_err(AppError::from_db)
    }

    fn listing(include_inactive: bool) -> Select<Department> {
        let query = Department::find();
        if include_inactive {
            query
        } else {
            query.filter(department::Column::IsActive.eq(true))
        }
    }

    /// List one page of departments ordered by name.
    pub async fn find_page(
        &self,
        include_inactive: bool,
        offset: u64,
        limit: u64,
    ) -> AppResult<Vec<department::Model>> {
        Self::listing(include_inactive)
            .order_by_asc(department::Column::Name)
            .offset(offset)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(AppError::from_db)
    }

    /// Count departments.
    pub async fn count(&self, include_inactive: bool) -> AppResult<u64> {
        Self::listing(include_inactive)
            .count(self.db.as_ref())
            .await
            .map_err(AppError::from_db)
    }

    /// List every department, ordered by name.
    pub async fn find_all(&self, include_inactive: bool) -> AppResult<Vec<department::Model>> {
        Self::listing(include_inactive)
            .order_by_asc(department::Column::Name)
            .all(self.db.as_ref())
            .await
            .map_err(AppError::from_db)
    }

    /// Departments whose association with the class is active.
    pub async fn find_active_for_class(&self, class_id: &str) -> AppResult<Vec<department::Model>> {
        Department::find()
            .join(
                JoinType::InnerJoin,
                department::Relation::ClassDepartments.def(),
            )
            .filter(class_department::Column::ClassId.eq(class_id))
            .filter(class_department::Column::IsActive.eq(true))
            .order_by_asc(department::Column::Name)
            .all(self.db.as_ref())
            .await
            .map_err(AppError::from_db)
    }

    /// Create a new department.
    pub async fn create(&self, model: department::ActiveModel) -> AppResult<department::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(AppError::from_db)
    }

    /// Update a department.
    pub async fn update(&self, model: department::ActiveModel) -> AppResult<department::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(AppError::from_db)
    }

    /// Delete a department. Its sections and class associations go with it.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        Department::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .map_err(AppError::from_db)?;
        Ok(())
    }

    /// Set the global activation flag of each listed department in one transaction.
    pub async fn set_active(&self, entries: &[(String, bool)]) -> AppResult<u64> {
        apply_activation::<Department>(self.db.as_ref(), ACTIVATION, entries).await
    }

    /// Deactivate every department.
    pub async fn deactivate_all(&self) -> AppResult<u64> {
        let now: DateTimeWithTimeZone = Utc::now().into();
        let result = Department::update_many()
            .col_expr(department::Column::IsActive, Expr::value(false))
            .col_expr(department::Column::UpdatedAt, Expr::value(now))
            .exec(self.db.as_ref())
            .await
            .map_err(AppError::from_db)?;
        Ok(result.rows_affected)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn create_test_department(id: &str, name: &str) -> department::Model {
        department::Model {
            id: id.to_string(),
            name: name.to_string(),
            description: Some(format!("{name} group")),
            is_active: true,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    #[tokio::test]
    async fn test_find_by_name() {
        let science = create_test_department("d1", "Science");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[science.clone()]])
                .into_connection(),
        );

        let repo = DepartmentRepository::new(db);
        let result = repo.find_by_name("Science").await.unwrap();

        assert_eq!(result.map(|d| d.id), Some("d1".to_string()));
    }

    #[tokio::test]
    async fn test_find_active_for_class() {
        let science = create_test_department("d1", "Science");
        let humanities = create_test_department("d2", "Humanities");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[humanities, science]])
                .into_connection(),
        );

        let repo = DepartmentRepository::new(db);
        let result = repo.find_active_for_class("c9").await.unwrap();

        assert_eq!(result.len(), 2);
        assert_eq!(result[0].name, "Humanities");
    }

    #[tokio::test]
    async fn test_deactivate_all() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 7,
                }])
                .into_connection(),
        );

        let repo = DepartmentRepository::new(db);
        assert_eq!(repo.deactivate_all().await.unwrap(), 7);
    }
}
