//! Class-department association repository.

use std::sync::Arc;

use crate::entities::{ClassDepartment, Department, class_department, department};
use chrono::Utc;
use school_common::{AppError, AppResult};
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
    prelude::DateTimeWithTimeZone,
    sea_query::{Expr, OnConflict},
};

/// Repository for the per-class department switches.
#[derive(Clone)]
pub struct ClassDepartmentRepository {
    db: Arc<DatabaseConnection>,
}

impl ClassDepartmentRepository {
    /// Create a new class-department repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// All association rows of a class.
    pub async fn find_by_class(&self, class_id: &str) -> AppResult<Vec<class_department::Model>> {
        ClassDepartment::find()
            .filter(class_department::Column::ClassId.eq(class_id))
            .all(self.db.as_ref())
            .await
            .map_err(AppError::from_db)
    }

    /// Association rows of a class joined with their department, ordered by department name.
    pub async fn find_by_class_with_department(
        &self,
        class_id: &str,
    ) -> AppResult<Vec<(class_department::Model, department::Model)>> {
        let rows = ClassDepartment::find()
            .filter(class_department::Column::ClassId.eq(class_id))
            .find_also_related(Department)
            .order_by_asc(department::Column::Name)
            .all(self.db.as_ref())
            .await
            .map_err(AppError::from_db)?;

        // Rows whose department vanished mid-query are skipped.
        Ok(rows
            .into_iter()
            .filter_map(|(link, dept)| dept.map(|d| (link, d)))
            .collect())
    }

    /// Upsert every `(department_id, is_active)` switch for one class.
    ///
    /// Each row is a single `INSERT .. ON CONFLICT (class_id, department_id)
    /// DO UPDATE`, and the whole batch runs in one transaction. `ids`
    /// supplies a fresh primary key per entry; it is ignored when the pair
    /// already exists.
    pub async fn upsert_many(
        &self,
        class_id: &str,
        entries: &[(String, bool)],
        ids: Vec<String>,
    ) -> AppResult<u64> {
        let now: DateTimeWithTimeZone = Utc::now().into();
        let txn = self.db.begin().await.map_err(AppError::from_db)?;

        let mut affected = 0;
        for ((department_id, is_active), id) in entries.iter().zip(ids) {
            let model = class_department::ActiveModel {
                id: Set(id),
                class_id: Set(class_id.to_string()),
                department_id: Set(department_id.clone()),
                is_active: Set(*is_active),
                created_at: Set(now),
                updated_at: Set(Some(now)),
            };

            affected += ClassDepartment::insert(model)
                .on_conflict(
                    OnConflict::columns([
                        class_department::Column::ClassId,
                        class_department::Column::DepartmentId,
                    ])
                    .update_columns([
                        class_department::Column::IsActive,
                        class_department::Column::UpdatedAt,
                    ])
                    .to_owned(),
                )
                .exec_without_returning(&txn)
                .await
                .map_err(AppError::from_db)?;
        }

        txn.commit().await.map_err(AppError::from_db)?;
        Ok(affected)
    }

    /// Deactivate every existing association row of a class.
    pub async fn deactivate_for_class(&self, class_id: &str) -> AppResult<u64> {
        let now: DateTimeWithTimeZone = Utc::now().into();
        let result = ClassDepartment::update_many()
            .col_expr(class_department::Column::IsActive, Expr::value(false))
            .col_expr(class_department::Column::UpdatedAt, Expr::value(now))
            .filter(class_department::Column::ClassId.eq(class_id))
            .exec(self.db.as_ref())
            .await
            .map_err(AppError::from_db)?;
        Ok(result.rows_affected)
    }
}
