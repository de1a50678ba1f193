use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Client: FK lookups during filtering and provider deletion checks
        manager
            .create_index(
                Index::create()
                    .name("idx_client_provider")
                    .table(Client::Table)
                    .col(Client::ProviderId)
                    .to_owned(),
            )
            .await?;

        // Client: list ordering (created_at DESC, id tie-break)
        manager
            .create_index(
                Index::create()
                    .name("idx_client_created_at")
                    .table(Client::Table)
                    .col(Client::CreatedAt)
                    .to_owned(),
            )
            .await?;

        // Client: common filter columns
        manager
            .create_index(
                Index::create()
                    .name("idx_client_status")
                    .table(Client::Table)
                    .col(Client::Status)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .name("idx_client_date")
                    .table(Client::Table)
                    .col(Client::Date)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for name in ["idx_client_provider", "idx_client_created_at", "idx_client_status", "idx_client_date"] {
            manager
                .drop_index(Index::drop().name(name).table(Client::Table).to_owned())
                .await?;
        }
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Client { Table, ProviderId, CreatedAt, Status, Date }
