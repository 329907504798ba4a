//! Create class table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Class::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Class::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Class::Name).string_len(64).not_null())
                    .col(
                        ColumnDef::new(Class::Medium)
                            .string_len(16)
                            .not_null()
                            .default("BANGLA"),
                    )
                    .col(
                        ColumnDef::new(Class::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Class::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(Class::UpdatedAt).timestamp_with_time_zone())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_class_name")
                    .table(Class::Table)
                    .col(Class::Name)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Index: medium (setup listings filter by it)
        manager
            .create_index(
                Index::create()
                    .name("idx_class_medium")
                    .table(Class::Table)
                    .col(Class::Medium)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Class::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Class {
    Table,
    Id,
    Name,
    Medium,
    IsActive,
    CreatedAt,
    UpdatedAt,
}
