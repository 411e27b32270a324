use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(DeriveIden)]
enum Contracts {
    Table,
    OwnerId,
    ClientId,
    Status,
    UpdatedAt,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Owner-side listings, newest first
        manager
            .create_index(
                Index::create()
                    .name("idx_contracts_owner_updated")
                    .table(Contracts::Table)
                    .col(Contracts::OwnerId)
                    .col(Contracts::UpdatedAt)
                    .to_owned(),
            )
            .await?;

        // Client-side listings, newest first
        manager
            .create_index(
                Index::create()
                    .name("idx_contracts_client_updated")
                    .table(Contracts::Table)
                    .col(Contracts::ClientId)
                    .col(Contracts::UpdatedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_contracts_status")
                    .table(Contracts::Table)
                    .col(Contracts::Status)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_contracts_owner_updated").to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_contracts_client_updated").to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_contracts_status").to_owned())
            .await?;

        Ok(())
    }
}
