//! Create student table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Student::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Student::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Student::FirstName).string_len(128).not_null())
                    .col(ColumnDef::new(Student::LastName).string_len(128))
                    .col(ColumnDef::new(Student::RollNumber).string_len(32))
                    .col(ColumnDef::new(Student::SectionId).string_len(32).not_null())
                    .col(
                        ColumnDef::new(Student::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Student::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(Student::UpdatedAt).timestamp_with_time_zone())
                    // Sections with enrolled students cannot be dropped
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_student_section")
                            .from(Student::Table, Student::SectionId)
                            .to(Section::Table, Section::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_student_roll_number")
                    .table(Student::Table)
                    .col(Student::RollNumber)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_student_section_id")
                    .table(Student::Table)
                    .col(Student::SectionId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Student::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Student {
    Table,
    Id,
    FirstName,
    LastName,
    RollNumber,
    SectionId,
    IsActive,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Section {
    Table,
    Id,
}
