//! Create `endereco` table.
//! One address per provider; removed together with its provider.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Endereco::Table)
                    .if_not_exists()
                    .col(uuid(Endereco::Id).primary_key())
                    .col(uuid(Endereco::ConvenioId).unique_key().not_null())
                    .col(string_len(Endereco::Street, 200).not_null())
                    .col(string_len(Endereco::Number, 50).not_null())
                    .col(string_len_null(Endereco::Complement, 250))
                    .col(string_len(Endereco::District, 100).not_null())
                    .col(string_len(Endereco::PostalCode, 8).not_null())
                    .col(string_len(Endereco::City, 100).not_null())
                    .col(string_len(Endereco::State, 2).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_endereco_convenio")
                            .from(Endereco::Table, Endereco::ConvenioId)
                            .to(Convenio::Table, Convenio::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Endereco::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Endereco { Table, Id, ConvenioId, Street, Number, Complement, District, PostalCode, City, State }

#[derive(DeriveIden)]
enum Convenio { Table, Id }
