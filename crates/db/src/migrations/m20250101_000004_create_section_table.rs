//! Create section table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Section::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Section::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Section::Name).string_len(64).not_null())
                    .col(ColumnDef::new(Section::ClassId).string_len(32).not_null())
                    .col(ColumnDef::new(Section::DepartmentId).string_len(32))
                    .col(
                        ColumnDef::new(Section::Capacity)
                            .integer()
                            .not_null()
                            .default(30),
                    )
                    .col(
                        ColumnDef::new(Section::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Section::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(Section::UpdatedAt).timestamp_with_time_zone())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_section_class")
                            .from(Section::Table, Section::ClassId)
                            .to(Class::Table, Class::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_section_department")
                            .from(Section::Table, Section::DepartmentId)
                            .to(Department::Table, Department::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Unique index: (class_id, department_id, name)
        // NULL department rows are not covered; see the partial index below.
        manager
            .create_index(
                Index::create()
                    .name("idx_section_class_department_name")
                    .table(Section::Table)
                    .col(Section::ClassId)
                    .col(Section::DepartmentId)
                    .col(Section::Name)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Unique index: (class_id, name) among sections without a department
        manager
            .get_connection()
            .execute_unprepared(
                r"
                CREATE UNIQUE INDEX IF NOT EXISTS idx_section_class_unassigned_name
                ON section (class_id, name)
                WHERE department_id IS NULL;
                ",
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_section_department_id")
                    .table(Section::Table)
                    .col(Section::DepartmentId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Section::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Section {
    Table,
    Id,
    Name,
    ClassId,
    DepartmentId,
    Capacity,
    IsActive,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Class {
    Table,
    Id,
}

#[derive(Iden)]
enum Department {
    Table,
    Id,
}
