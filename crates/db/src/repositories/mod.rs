//! Database repositories.
//!
//! Each repository owns an `Arc<DatabaseConnection>` and maps database
//! errors into [`AppError`]. Multi-row writes run inside a single
//! transaction opened here, never in the services.

pub mod class;
pub mod class_department;
pub mod department;
pub mod section;
pub mod student;

pub use class::ClassRepository;
pub use class_department::ClassDepartmentRepository;
pub use department::DepartmentRepository;
pub use section::{DepartmentFilter, SectionFilter, SectionRepository};
pub use student::{StudentFilter, StudentRepository};

use chrono::Utc;
use school_common::{AppError, AppResult};
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter, TransactionTrait,
    prelude::DateTimeWithTimeZone, sea_query::Expr,
};

/// Activation columns of an entity that carries an `is_active` flag.
#[derive(Clone, Copy)]
pub(crate) struct ActivationColumns<C> {
    pub id: C,
    pub is_active: C,
    pub updated_at: C,
}

/// Set `is_active` per id, all in one transaction.
///
/// Returns the number of rows touched.
pub(crate) async fn apply_activation<E>(
    db: &DatabaseConnection,
    cols: ActivationColumns<E::Column>,
    entries: &[(String, bool)],
) -> AppResult<u64>
where
    E: EntityTrait,
{
    let txn = db.begin().await.map_err(AppError::from_db)?;
    let affected = apply_activation_in::<E, _>(&txn, cols, entries).await?;
    txn.commit().await.map_err(AppError::from_db)?;
    Ok(affected)
}

/// Same as [`apply_activation`] against an already open connection or transaction.
pub(crate) async fn apply_activation_in<E, C>(
    conn: &C,
    cols: ActivationColumns<E::Column>,
    entries: &[(String, bool)],
) -> AppResult<u64>
where
    E: EntityTrait,
    C: ConnectionTrait,
{
    let now: DateTimeWithTimeZone = Utc::now().into();
    let mut affected = 0;

    for value in [true, false] {
        let ids: Vec<String> = entries
            .iter()
            .filter(|(_, active)| *active == value)
            .map(|(id, _)| id.clone())
            .collect();
        if ids.is_empty() {
            continue;
        }

        let result = E::update_many()
            .col_expr(cols.is_active, Expr::value(value))
            .col_expr(cols.updated_at, Expr::value(now))
            .filter(cols.id.is_in(ids))
            .exec(conn)
            .await
            .map_err(AppError::from_db)?;
        affected += result.rows_affected;
    }

    Ok(affected)
}

/// Return the ids in `requested` that are absent from `found`, keeping
/// request order and dropping repeats.
#[must_use]
pub fn missing_ids(requested: &[String], found: &[String]) -> Vec<String> {
    let mut missing: Vec<String> = Vec::new();
    for id in requested {
        if !found.contains(id) && !missing.contains(id) {
            missing.push(id.clone());
        }
    }
    missing
}
