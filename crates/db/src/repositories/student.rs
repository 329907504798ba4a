//! Student repository.

use std::collections::HashMap;
use std::sync::Arc;

use crate::entities::{Student, section, student};
use school_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, JoinType, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, RelationTrait, Select, sea_query::Expr,
};

/// Filter for student listings.
#[derive(Debug, Clone, Copy, Default)]
pub struct StudentFilter<'a> {
    pub section_id: Option<&'a str>,
    pub class_id: Option<&'a str>,
    pub include_inactive: bool,
}

/// Student repository for database operations.
#[derive(Clone)]
pub struct StudentRepository {
    db: Arc<DatabaseConnection>,
}

impl StudentRepository {
    /// Create a new student repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a student by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<student::Model>> {
        Student::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(AppError::from_db)
    }

    /// Get a student by ID, returning `NotFound` if missing.
    pub async fn get_by_id(&self, id: &str) -> AppResult<student::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Student with ID {id} not found")))
    }

    /// Find a student by roll number.
    pub async fn find_by_roll_number(&self, roll_number: &str) -> AppResult<Option<student::Model>> {
        Student::find()
            .filter(student::Column::RollNumber.eq(roll_number))
            .one(self.db.as_ref())
            .await
            .map_err(AppError::from_db)
    }

    fn listing(filter: &StudentFilter<'_>) -> Select<Student> {
        let mut query = Student::find();
        if let Some(section_id) = filter.section_id {
            query = query.filter(student::Column::SectionId.eq(section_id));
        }
        if let Some(class_id) = filter.class_id {
            query = query
                .join(JoinType::InnerJoin, student::Relation::Section.def())
                .filter(section::Column::ClassId.eq(class_id));
        }
        if !filter.include_inactive {
            query = query.filter(student::Column::IsActive.eq(true));
        }
        query
    }

    /// List one page of students ordered by roll number, then first name.
    pub async fn find_page(
        &self,
        filter: &StudentFilter<'_>,
        offset: u64,
        limit: u64,
    ) -> AppResult<Vec<student::Model>> {
        Self::listing(filter)
            .order_by_asc(student::Column::RollNumber)
            .order_by_asc(student::Column::FirstName)
            .offset(offset)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(AppError::from_db)
    }

    /// Count students matching a filter.
    pub async fn count(&self, filter: &StudentFilter<'_>) -> AppResult<u64> {
        Self::listing(filter)
            .count(self.db.as_ref())
            .await
            .map_err(AppError::from_db)
    }

    /// Create a new student.
    pub async fn create(&self, model: student::ActiveModel) -> AppResult<student::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(AppError::from_db)
    }

    /// Delete a student.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        Student::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .map_err(AppError::from_db)?;
        Ok(())
    }

    // === Dependent counts used by delete guards ===

    /// Students enrolled in one section.
    pub async fn count_in_section(&self, section_id: &str) -> AppResult<u64> {
        Student::find()
            .filter(student::Column::SectionId.eq(section_id))
            .count(self.db.as_ref())
            .await
            .map_err(AppError::from_db)
    }

    /// Students enrolled in any section of a class.
    pub async fn count_in_class(&self, class_id: &str) -> AppResult<u64> {
        Student::find()
            .join(JoinType::InnerJoin, student::Relation::Section.def())
            .filter(section::Column::ClassId.eq(class_id))
            .count(self.db.as_ref())
            .await
            .map_err(AppError::from_db)
    }

    /// Students enrolled in any section of a department, across classes.
    pub async fn count_in_department(&self, department_id: &str) -> AppResult<u64> {
        Student::find()
            .join(JoinType::InnerJoin, student::Relation::Section.def())
            .filter(section::Column::DepartmentId.eq(department_id))
            .count(self.db.as_ref())
            .await
            .map_err(AppError::from_db)
    }

    /// Student counts keyed by section.
    pub async fn counts_by_section(
        &self,
        section_ids: &[String],
    ) -> AppResult<HashMap<String, u64>> {
        if section_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows: Vec<(String, i64)> = Student::find()
            .select_only()
            .column(student::Column::SectionId)
            .column_as(Expr::col(student::Column::Id).count(), "count")
            .filter(student::Column::SectionId.is_in(section_ids.to_vec()))
            .group_by(student::Column::SectionId)
            .into_tuple()
            .all(self.db.as_ref())
            .await
            .map_err(AppError::from_db)?;

        Ok(rows.into_iter().map(|(id, n)| (id, n as u64)).collect())
    }
}
