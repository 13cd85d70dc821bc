//! Create `convenio` table.
//!
//! Root entity: accredited providers. Addresses and specialties reference it.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Convenio::Table)
                    .if_not_exists()
                    .col(uuid(Convenio::Id).primary_key())
                    .col(string_len(Convenio::Name, 100).not_null())
                    .col(string_len(Convenio::Document, 14).unique_key().not_null())
                    .col(string_len(Convenio::Email, 254).not_null())
                    .col(string_len_null(Convenio::Phone, 20))
                    .col(boolean(Convenio::Active).not_null())
                    .col(timestamp_with_time_zone(Convenio::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(Convenio::UpdatedAt).not_null())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Convenio::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Convenio { Table, Id, Name, Document, Email, Phone, Active, CreatedAt, UpdatedAt }
