//! Department entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Department model - a globally named subject track (Science, Humanities, ...).
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "department")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// Department name (unique).
    #[sea_orm(unique)]
    pub name: String,

    pub description: Option<String>,

    #[sea_orm(default_value = true)]
    pub is_active: bool,

    pub created_at: DateTimeWithTimeZone,

    pub updated_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::section::Entity")]
    Sections,
    #[sea_orm(has_many = "super::class_department::Entity")]
    ClassDepartments,
}

impl Related<super::section::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Sections.def()
    }
}

impl Related<super::class_department::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ClassDepartments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
