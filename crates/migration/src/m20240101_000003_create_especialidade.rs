//! Create `especialidade` table.
//! `image` holds the generated file name only; bytes live in the image directory.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Especialidade::Table)
                    .if_not_exists()
                    .col(uuid(Especialidade::Id).primary_key())
                    .col(uuid(Especialidade::ConvenioId).not_null())
                    .col(string_len(Especialidade::Name, 200).not_null())
                    .col(string_len(Especialidade::Description, 1000).not_null())
                    .col(double(Especialidade::Value).not_null())
                    .col(boolean(Especialidade::Active).not_null())
                    .col(string_len_null(Especialidade::Image, 300))
                    .col(timestamp_with_time_zone(Especialidade::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(Especialidade::UpdatedAt).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_especialidade_convenio")
                            .from(Especialidade::Table, Especialidade::ConvenioId)
                            .to(Convenio::Table, Convenio::Id)
                            .on_delete(ForeignKeyAction::Restrict)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Especialidade::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Especialidade { Table, Id, ConvenioId, Name, Description, Value, Active, Image, CreatedAt, UpdatedAt }

#[derive(DeriveIden)]
enum Convenio { Table, Id }
