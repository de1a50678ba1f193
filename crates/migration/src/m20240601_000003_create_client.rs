//! Create `client` table with FK to `provider`.
//!
//! `date` is the business date of the engagement, distinct from the
//! record-creation timestamp. Deleting a provider that still has clients
//! is restricted at the storage layer.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Client::Table)
                    .if_not_exists()
                    .col(uuid(Client::Id).primary_key())
                    .col(string_len(Client::Name, 255).not_null())
                    .col(string_len(Client::Email, 255).unique_key().not_null())
                    .col(ColumnDef::new(Client::Phone).string_len(64).null())
                    .col(ColumnDef::new(Client::Company).string_len(255).null())
                    .col(string_len(Client::Status, 16).not_null())
                    .col(double(Client::Price).not_null())
                    .col(timestamp_with_time_zone(Client::Date).not_null())
                    .col(ColumnDef::new(Client::Address).string_len(255).null())
                    .col(ColumnDef::new(Client::City).string_len(128).null())
                    .col(ColumnDef::new(Client::Country).string_len(128).null())
                    .col(ColumnDef::new(Client::Notes).text().null())
                    .col(uuid(Client::ProviderId).not_null())
                    .col(timestamp_with_time_zone(Client::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(Client::UpdatedAt).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_client_provider")
                            .from(Client::Table, Client::ProviderId)
                            .to(Provider::Table, Provider::Id)
                            .on_delete(ForeignKeyAction::Restrict)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Client::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Client {
    Table,
    Id,
    Name,
    Email,
    Phone,
    Company,
    Status,
    Price,
    Date,
    Address,
    City,
    Country,
    Notes,
    ProviderId,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Provider { Table, Id }
