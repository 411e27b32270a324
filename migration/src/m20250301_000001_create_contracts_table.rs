use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::ConnectionTrait;

#[derive(DeriveMigrationName)]
pub struct Migration;

/// Identifiers for the `contracts` table and its columns.
#[derive(DeriveIden)]
enum Contracts {
    Table,
    Id,
    OwnerId,
    ClientId,
    Status,
    Title,
    Content,
    Terms,
    Deliverables,
    Amount,
    Currency,
    Timeline,
    SignedBy,
    SignedAt,
    Version,
    CreatedAt,
    UpdatedAt,
}

/// Row-level invariants the lifecycle engine also enforces.
const CHECK_CONSTRAINTS: &str = r#"
ALTER TABLE contracts
    ADD CONSTRAINT ck_contracts_status
        CHECK (status IN ('draft', 'sent', 'signed', 'cancelled')),
    ADD CONSTRAINT ck_contracts_amount_positive
        CHECK (amount > 0),
    ADD CONSTRAINT ck_contracts_parties_differ
        CHECK (owner_id <> client_id),
    ADD CONSTRAINT ck_contracts_signature_iff_signed
        CHECK (
            (status = 'signed' AND signed_by IS NOT NULL AND signed_at IS NOT NULL)
            OR (status <> 'signed' AND signed_by IS NULL AND signed_at IS NULL)
        )
"#;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Contracts::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Contracts::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Contracts::OwnerId).uuid().not_null())
                    .col(ColumnDef::new(Contracts::ClientId).uuid().not_null())
                    .col(
                        ColumnDef::new(Contracts::Status)
                            .string()
                            .not_null()
                            .default("draft"),
                    )
                    .col(ColumnDef::new(Contracts::Title).string().not_null())
                    .col(
                        ColumnDef::new(Contracts::Content)
                            .text()
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(Contracts::Terms)
                            .text()
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(Contracts::Deliverables)
                            .json_binary()
                            .not_null()
                            .default(Expr::cust("'[]'::jsonb")),
                    )
                    .col(ColumnDef::new(Contracts::Amount).double().not_null())
                    .col(
                        ColumnDef::new(Contracts::Currency)
                            .string_len(3)
                            .not_null()
                            .default("USD"),
                    )
                    .col(ColumnDef::new(Contracts::Timeline).string().null())
                    .col(ColumnDef::new(Contracts::SignedBy).uuid().null())
                    .col(
                        ColumnDef::new(Contracts::SignedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Contracts::Version)
                            .big_integer()
                            .not_null()
                            .default(1),
                    )
                    .col(
                        ColumnDef::new(Contracts::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Contracts::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .get_connection()
            .execute_unprepared(CHECK_CONSTRAINTS)
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Contracts::Table).to_owned())
            .await
    }
}
