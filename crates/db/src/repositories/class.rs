//! Class repository.

use std::sync::Arc;

use crate::entities::{Class, class, class::Medium};
use crate::repositories::{ActivationColumns, apply_activation};
use chrono::Utc;
use school_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Select, prelude::DateTimeWithTimeZone, sea_query::Expr,
};

const ACTIVATION: ActivationColumns<class::Column> = ActivationColumns {
    id: class::Column::Id,
    is_active: class::Column::IsActive,
    updated_at: class::Column::UpdatedAt,
};

/// Class repository for database operations.
#[derive(Clone)]
pub struct ClassRepository {
    db: Arc<DatabaseConnection>,
}

impl ClassRepository {
    /// Create a new class repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a class by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<class::Model>> {
        Class::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(AppError::from_db)
    }

    /// Get a class by ID, returning `NotFound` if missing.
    pub async fn get_by_id(&self, id: &str) -> AppResult<class::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Class with ID {id} not found")))
    }

    /// Find a class by its exact name.
    pub async fn find_by_name(&self, name: &str) -> AppResult<Option<class::Model>> {
        Class::find()
            .filter(class::Column::Name.eq(name))
            .one(self.db.as_ref())
            .await
            .map_err(AppError::from_db)
    }

    /// Find classes by IDs.
    pub async fn find_by_ids(&self, ids: &[String]) -> AppResult<Vec<class::Model>> {
        if ids.is_empty() {
            return Ok(vec![]);
        }

        Class::find()
            .filter(class::Column::Id.is_in(ids.to_vec()))
            .order_by_asc(class::Column::Name)
            .all(self.db.as_ref())
            .await
            .map_err(AppError::from_db)
    }

    fn listing(include_inactive: bool) -> Select<Class> {
        let query = Class::find();
        if include_inactive {
            query
        } else {
            query.filter(class::Column::IsActive.eq(true))
        }
    }

    /// List one page of classes ordered by name.
    pub async fn find_page(
        &self,
        include_inactive: bool,
        offset: u64,
        limit: u64,
    ) -> AppResult<Vec<class::Model>> {
        Self::listing(include_inactive)
            .order_by_asc(class::Column::Name)
            .offset(offset)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(AppError::from_db)
    }

    /// Count classes.
    pub async fn count(&self, include_inactive: bool) -> AppResult<u64> {
        Self::listing(include_inactive)
            .count(self.db.as_ref())
            .await
            .map_err(AppError::from_db)
    }

    /// List classes of one medium (or all media), ordered by name.
    pub async fn find_by_medium(
        &self,
        medium: Option<Medium>,
        include_inactive: bool,
    ) -> AppResult<Vec<class::Model>> {
        let mut query = Self::listing(include_inactive);
        if let Some(medium) = medium {
            query = query.filter(class::Column::Medium.eq(medium));
        }

        query
            .order_by_asc(class::Column::Name)
            .all(self.db.as_ref())
            .await
            .map_err(AppError::from_db)
    }

    /// Create a new class.
    pub async fn create(&self, model: class::ActiveModel) -> AppResult<class::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(AppError::from_db)
    }

    /// Update a class.
    pub async fn update(&self, model: class::ActiveModel) -> AppResult<class::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(AppError::from_db)
    }

    /// Delete a class. Its sections and department associations go with it.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        Class::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .map_err(AppError::from_db)?;
        Ok(())
    }

    /// Set the activation flag of each listed class in one transaction.
    pub async fn set_active(&self, entries: &[(String, bool)]) -> AppResult<u64> {
        apply_activation::<Class>(self.db.as_ref(), ACTIVATION, entries).await
    }

    /// Deactivate every class, or every class of one medium.
    pub async fn deactivate_all(&self, medium: Option<Medium>) -> AppResult<u64> {
        let now: DateTimeWithTimeZone = Utc::now().into();
        let mut update = Class::update_many()
            .col_expr(class::Column::IsActive, Expr::value(false))
            .col_expr(class::Column::UpdatedAt, Expr::value(now));
        if let Some(medium) = medium {
            update = update.filter(class::Column::Medium.eq(medium));
        }

        let result = update
            .exec(self.db.as_ref())
            .await
            .map_err(AppError::from_db)?;
        Ok(result.rows_affected)
    }
}
