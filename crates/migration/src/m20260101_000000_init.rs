//! Initial schema of the ledger.
//!
//! - `organizations`: personal and shared workspaces
//! - `groups`: trip/project buckets of transactions
//! - `transactions`: incomes and expenses
//! - `obligations`: give/take records, settled over time
//!
//! Money columns are `*_minor` integers. Enum columns store snake_case
//! strings.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

// ─────────────────────────────────────────────────────────────────────────────
// Table identifiers
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Iden)]
enum Organizations {
    Table,
    Id,
    Name,
    Currency,
    OwnerId,
    IsPersonal,
    CreatedAt,
}

#[derive(Iden)]
enum Groups {
    Table,
    Id,
    OrganizationId,
    Title,
    Description,
    StartDate,
    EndDate,
    TotalAmountMinor,
}

#[derive(Iden)]
enum Transactions {
    Table,
    Id,
    OrganizationId,
    Kind,
    AmountMinor,
    Category,
    Date,
    Notes,
    GroupId,
}

#[derive(Iden)]
enum Obligations {
    Table,
    Id,
    OrganizationId,
    PersonName,
    AmountMinor,
    Kind,
    DueDate,
    Status,
    Notes,
    CreatedAt,
    SettledAmountMinor,
    Version,
}

/// At most one personal organization per owner. `sea-query` has no builder
/// for partial indexes, hence the raw statement.
const PERSONAL_ORGANIZATION_INDEX: &str = "CREATE UNIQUE INDEX IF NOT EXISTS \
     idx_organizations_owner_id_personal \
     ON organizations (owner_id) WHERE is_personal = 1";

// ─────────────────────────────────────────────────────────────────────────────
// Migration implementation
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ───────────────────────────────────────────────────────────────────
        // 1. Organizations
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Organizations::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Organizations::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Organizations::Name).string().not_null())
                    .col(
                        ColumnDef::new(Organizations::Currency)
                            .string()
                            .not_null()
                            .default("BDT"),
                    )
                    .col(ColumnDef::new(Organizations::OwnerId).string().not_null())
                    .col(
                        ColumnDef::new(Organizations::IsPersonal)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Organizations::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-organizations-owner_id")
                    .table(Organizations::Table)
                    .col(Organizations::OwnerId)
                    .to_owned(),
            )
            .await?;

        manager
            .get_connection()
            .execute_unprepared(PERSONAL_ORGANIZATION_INDEX)
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 2. Groups
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Groups::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Groups::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Groups::OrganizationId).string().not_null())
                    .col(ColumnDef::new(Groups::Title).string().not_null())
                    .col(ColumnDef::new(Groups::Description).string())
                    .col(
                        ColumnDef::new(Groups::StartDate)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Groups::EndDate).timestamp_with_time_zone())
                    .col(
                        ColumnDef::new(Groups::TotalAmountMinor)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-groups-organization_id")
                            .from(Groups::Table, Groups::OrganizationId)
                            .to(Organizations::Table, Organizations::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-groups-organization_id")
                    .table(Groups::Table)
                    .col(Groups::OrganizationId)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 3. Transactions
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Transactions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Transactions::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Transactions::OrganizationId)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Transactions::Kind).string().not_null())
                    .col(
                        ColumnDef::new(Transactions::AmountMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Transactions::Category).string().not_null())
                    .col(
                        ColumnDef::new(Transactions::Date)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Transactions::Notes).string())
                    .col(ColumnDef::new(Transactions::GroupId).string())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-transactions-organization_id")
                            .from(Transactions::Table, Transactions::OrganizationId)
                            .to(Organizations::Table, Organizations::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-transactions-group_id")
                            .from(Transactions::Table, Transactions::GroupId)
                            .to(Groups::Table, Groups::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-transactions-organization_id-date")
                    .table(Transactions::Table)
                    .col(Transactions::OrganizationId)
                    .col(Transactions::Date)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-transactions-group_id")
                    .table(Transactions::Table)
                    .col(Transactions::GroupId)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 4. Obligations
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Obligations::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Obligations::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Obligations::OrganizationId)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Obligations::PersonName).string().not_null())
                    .col(
                        ColumnDef::new(Obligations::AmountMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Obligations::Kind).string().not_null())
                    .col(ColumnDef::new(Obligations::DueDate).timestamp_with_time_zone())
                    .col(
                        ColumnDef::new(Obligations::Status)
                            .string()
                            .not_null()
                            .default("pending"),
                    )
                    .col(ColumnDef::new(Obligations::Notes).string())
                    .col(
                        ColumnDef::new(Obligations::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Obligations::SettledAmountMinor)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Obligations::Version)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-obligations-organization_id")
                            .from(Obligations::Table, Obligations::OrganizationId)
                            .to(Organizations::Table, Organizations::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-obligations-organization_id")
                    .table(Obligations::Table)
                    .col(Obligations::OrganizationId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Obligations::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Transactions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Groups::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Organizations::Table).to_owned())
            .await?;
        Ok(())
    }
}
