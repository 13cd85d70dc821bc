//! Lookup indexes for foreign keys and image-name checks.
use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_especialidade_convenio_id")
                    .table(Especialidade::Table)
                    .col(Especialidade::ConvenioId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_especialidade_image")
                    .table(Especialidade::Table)
                    .col(Especialidade::Image)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_especialidade_image").table(Especialidade::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_especialidade_convenio_id").table(Especialidade::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Especialidade { Table, ConvenioId, Image }
