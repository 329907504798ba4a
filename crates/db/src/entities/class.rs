//! Class entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Language track of instruction.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter, DeriveActiveEnum,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "UPPERCASE")]
pub enum Medium {
    #[sea_orm(string_value = "BANGLA")]
    #[default]
    Bangla,
    #[sea_orm(string_value = "ENGLISH")]
    English,
}

/// Class model - a top-level academic grade.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "class")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// Class name (unique).
    #[sea_orm(unique)]
    pub name: String,

    /// Medium of instruction.
    pub medium: Medium,

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
