//! Create class_department table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ClassDepartment::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ClassDepartment::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ClassDepartment::ClassId)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ClassDepartment::DepartmentId)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ClassDepartment::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(ClassDepartment::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(ClassDepartment::UpdatedAt).timestamp_with_time_zone())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_class_department_class")
                            .from(ClassDepartment::Table, ClassDepartment::ClassId)
                            .to(Class::Table, Class::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_class_department_department")
                            .from(ClassDepartment::Table, ClassDepartment::DepartmentId)
                            .to(Department::Table, Department::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Unique index: (class_id, department_id) - the upsert conflict target
        manager
            .create_index(
                Index::create()
                    .name("idx_class_department_pair")
                    .table(ClassDepartment::Table)
                    .col(ClassDepartment::ClassId)
                    .col(ClassDepartment::DepartmentId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_class_department_department_id")
                    .table(ClassDepartment::Table)
                    .col(ClassDepartment::DepartmentId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ClassDepartment::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum ClassDepartment {
    Table,
    Id,
    ClassId,
    DepartmentId,
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
