//! Initial schema migration - creates all tables from scratch.
//!
//! The complete schema for pacco:
//!
//! - `accounts`: authentication and roles
//! - `shipping_methods`: rate tiers used to price packages
//! - `packages`: shipment records owned by accounts

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

// ─────────────────────────────────────────────────────────────────────────────
// Table identifiers
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Iden)]
enum Accounts {
    Table,
    Id,
    Name,
    Email,
    Address,
    Password,
    Role,
    CreatedAt,
}

#[derive(Iden)]
enum ShippingMethods {
    Table,
    Id,
    Label,
    RatePerKg,
}

#[derive(Iden)]
enum Packages {
    Table,
    Id,
    OwnerId,
    RecipientName,
    RecipientAddress,
    Weight,
    MethodId,
    Cost,
    Status,
    CreatedAt,
}

// ─────────────────────────────────────────────────────────────────────────────
// Migration implementation
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ───────────────────────────────────────────────────────────────────
        // 1. Accounts
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Accounts::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Accounts::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Accounts::Name).string().not_null())
                    .col(ColumnDef::new(Accounts::Email).string().not_null())
                    .col(ColumnDef::new(Accounts::Address).string().not_null())
                    .col(ColumnDef::new(Accounts::Password).string().not_null())
                    .col(
                        ColumnDef::new(Accounts::Role)
                            .string()
                            .not_null()
                            .default("customer"),
                    )
                    .col(
                        ColumnDef::new(Accounts::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-accounts-email-unique")
                    .table(Accounts::Table)
                    .col(Accounts::Email)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 2. Shipping methods
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(ShippingMethods::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ShippingMethods::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ShippingMethods::Label).string().not_null())
                    .col(
                        ColumnDef::new(ShippingMethods::RatePerKg)
                            .decimal()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-shipping_methods-label-unique")
                    .table(ShippingMethods::Table)
                    .col(ShippingMethods::Label)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 3. Packages
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Packages::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Packages::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Packages::OwnerId).string().not_null())
                    .col(ColumnDef::new(Packages::RecipientName).string().not_null())
                    .col(
                        ColumnDef::new(Packages::RecipientAddress)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Packages::Weight).decimal().not_null())
                    .col(ColumnDef::new(Packages::MethodId).string().not_null())
                    .col(ColumnDef::new(Packages::Cost).decimal().not_null())
                    .col(
                        ColumnDef::new(Packages::Status)
                            .string()
                            .not_null()
                            .default("pending"),
                    )
                    .col(
                        ColumnDef::new(Packages::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-packages-owner_id")
                            .from(Packages::Table, Packages::OwnerId)
                            .to(Accounts::Table, Accounts::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-packages-method_id")
                            .from(Packages::Table, Packages::MethodId)
                            .to(ShippingMethods::Table, ShippingMethods::Id),
                    )
                    .to_owned(),
            )
            .await?;

        // Listing is owner-scoped and ordered by creation time.
        manager
            .create_index(
                Index::create()
                    .name("idx-packages-owner_id")
                    .table(Packages::Table)
                    .col(Packages::OwnerId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-packages-created_at")
                    .table(Packages::Table)
                    .col(Packages::CreatedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-packages-status")
                    .table(Packages::Table)
                    .col(Packages::Status)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Drop in reverse order of creation (respecting FK dependencies)
        manager
            .drop_table(Table::drop().table(Packages::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ShippingMethods::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Accounts::Table).to_owned())
            .await?;
        Ok(())
    }
}
