//! Initial schema migration - creates all tables from scratch.
//!
//! Complete schema for Bilancio:
//!
//! - `currencies`: ISO currency reference data, seeded here
//! - `users`: API callers, keyed by verified email
//! - `budgets`: top-level tenants owned by a user
//! - `budget_members`: shared-budget access
//! - `accounts`: money locations (checking, cash, credit card)
//! - `categories`: spending buckets, at most one level of nesting
//! - `payees`, `tags`: free-form labels scoped to a budget
//! - `transactions`: headers with status and import provenance
//! - `transaction_lines`: individual amount movements per transaction
//! - `line_tags`: line-to-tag links

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

// ─────────────────────────────────────────────────────────────────────────────
// Table identifiers
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Iden)]
enum Currencies {
    Table,
    Code,
    Name,
    Symbol,
    MinorUnit,
}

#[derive(Iden)]
enum Users {
    Table,
    Id,
    Email,
    CreatedAt,
    LastSeenAt,
}

#[derive(Iden)]
enum Budgets {
    Table,
    Id,
    Name,
    BaseCurrencyCode,
    OwnerUserId,
    CreatedAt,
}

#[derive(Iden)]
enum BudgetMembers {
    Table,
    BudgetId,
    UserId,
    CreatedAt,
}

#[derive(Iden)]
enum Accounts {
    Table,
    Id,
    BudgetId,
    Name,
    AccountType,
    CurrencyCode,
    IsActive,
    CreatedAt,
}

#[derive(Iden)]
enum Categories {
    Table,
    Id,
    BudgetId,
    Name,
    ParentId,
    IsArchived,
    SortOrder,
}

#[derive(Iden)]
enum Payees {
    Table,
    Id,
    BudgetId,
    Name,
}

#[derive(Iden)]
enum Tags {
    Table,
    Id,
    BudgetId,
    Name,
}

#[derive(Iden)]
enum Transactions {
    Table,
    Id,
    BudgetId,
    PostedAt,
    Status,
    Notes,
    ImportId,
    CreatedAt,
}

#[derive(Iden)]
enum TransactionLines {
    Table,
    Id,
    TransactionId,
    AccountId,
    CategoryId,
    PayeeId,
    AmountMinor,
    Memo,
}

#[derive(Iden)]
enum LineTags {
    Table,
    LineId,
    TagId,
    CreatedAt,
}

// ─────────────────────────────────────────────────────────────────────────────
// Migration implementation
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ───────────────────────────────────────────────────────────────────
        // 1. Currencies
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Currencies::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Currencies::Code)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Currencies::Name).string().not_null())
                    .col(ColumnDef::new(Currencies::Symbol).string())
                    .col(
                        ColumnDef::new(Currencies::MinorUnit)
                            .integer()
                            .not_null()
                            .default(2),
                    )
                    .to_owned(),
            )
            .await?;

        for (code, name, symbol, minor_unit) in [
            ("EUR", "Euro", Some("€"), 2),
            ("USD", "US Dollar", Some("$"), 2),
            ("GBP", "Pound Sterling", Some("£"), 2),
            ("CHF", "Swiss Franc", None, 2),
            ("JPY", "Japanese Yen", Some("¥"), 0),
        ] {
            let insert = Query::insert()
                .into_table(Currencies::Table)
                .columns([
                    Currencies::Code,
                    Currencies::Name,
                    Currencies::Symbol,
                    Currencies::MinorUnit,
                ])
                .values_panic([
                    code.into(),
                    name.into(),
                    symbol.into(),
                    minor_unit.into(),
                ])
                .to_owned();
            manager.exec_stmt(insert).await?;
        }

        // ───────────────────────────────────────────────────────────────────
        // 2. Users
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Users::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Users::Email).string().not_null())
                    .col(ColumnDef::new(Users::CreatedAt).timestamp().not_null())
                    .col(ColumnDef::new(Users::LastSeenAt).timestamp().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-users-email-unique")
                    .table(Users::Table)
                    .col(Users::Email)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 3. Budgets
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Budgets::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Budgets::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Budgets::Name).string().not_null())
                    .col(
                        ColumnDef::new(Budgets::BaseCurrencyCode)
                            .string()
                            .not_null()
                            .default("EUR"),
                    )
                    .col(ColumnDef::new(Budgets::OwnerUserId).string().not_null())
                    .col(ColumnDef::new(Budgets::CreatedAt).timestamp().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-budgets-base_currency_code")
                            .from(Budgets::Table, Budgets::BaseCurrencyCode)
                            .to(Currencies::Table, Currencies::Code),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-budgets-owner_user_id")
                            .from(Budgets::Table, Budgets::OwnerUserId)
                            .to(Users::Table, Users::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-budgets-owner_user_id")
                    .table(Budgets::Table)
                    .col(Budgets::OwnerUserId)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 4. Budget Members
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(BudgetMembers::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(BudgetMembers::BudgetId).string().not_null())
                    .col(ColumnDef::new(BudgetMembers::UserId).string().not_null())
                    .col(
                        ColumnDef::new(BudgetMembers::CreatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .primary_key(
                        Index::create()
                            .col(BudgetMembers::BudgetId)
                            .col(BudgetMembers::UserId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-budget_members-budget_id")
                            .from(BudgetMembers::Table, BudgetMembers::BudgetId)
                            .to(Budgets::Table, Budgets::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-budget_members-user_id")
                            .from(BudgetMembers::Table, BudgetMembers::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-budget_members-user_id")
                    .table(BudgetMembers::Table)
                    .col(BudgetMembers::UserId)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 5. Accounts
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
                    .col(ColumnDef::new(Accounts::BudgetId).string().not_null())
                    .col(ColumnDef::new(Accounts::Name).string().not_null())
                    .col(ColumnDef::new(Accounts::AccountType).string().not_null())
                    .col(ColumnDef::new(Accounts::CurrencyCode).string().not_null())
                    .col(ColumnDef::new(Accounts::IsActive).boolean().not_null())
                    .col(ColumnDef::new(Accounts::CreatedAt).timestamp().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-accounts-budget_id")
                            .from(Accounts::Table, Accounts::BudgetId)
                            .to(Budgets::Table, Budgets::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-accounts-currency_code")
                            .from(Accounts::Table, Accounts::CurrencyCode)
                            .to(Currencies::Table, Currencies::Code),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-accounts-budget_id-name-unique")
                    .table(Accounts::Table)
                    .col(Accounts::BudgetId)
                    .col(Accounts::Name)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 6. Categories
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Categories::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Categories::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Categories::BudgetId).string().not_null())
                    .col(ColumnDef::new(Categories::Name).string().not_null())
                    .col(ColumnDef::new(Categories::ParentId).string())
                    .col(ColumnDef::new(Categories::IsArchived).boolean().not_null())
                    .col(
                        ColumnDef::new(Categories::SortOrder)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-categories-budget_id")
                            .from(Categories::Table, Categories::BudgetId)
                            .to(Budgets::Table, Budgets::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-categories-parent_id")
                            .from(Categories::Table, Categories::ParentId)
                            .to(Categories::Table, Categories::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-categories-budget_id-name-unique")
                    .table(Categories::Table)
                    .col(Categories::BudgetId)
                    .col(Categories::Name)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 7. Payees
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Payees::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Payees::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Payees::BudgetId).string().not_null())
                    .col(ColumnDef::new(Payees::Name).string().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-payees-budget_id")
                            .from(Payees::Table, Payees::BudgetId)
                            .to(Budgets::Table, Budgets::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-payees-budget_id-name-unique")
                    .table(Payees::Table)
                    .col(Payees::BudgetId)
                    .col(Payees::Name)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 8. Tags
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Tags::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Tags::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Tags::BudgetId).string().not_null())
                    .col(ColumnDef::new(Tags::Name).string().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-tags-budget_id")
                            .from(Tags::Table, Tags::BudgetId)
                            .to(Budgets::Table, Budgets::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-tags-budget_id-name-unique")
                    .table(Tags::Table)
                    .col(Tags::BudgetId)
                    .col(Tags::Name)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 9. Transactions
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
                    .col(ColumnDef::new(Transactions::BudgetId).string().not_null())
                    .col(
                        ColumnDef::new(Transactions::PostedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Transactions::Status).string().not_null())
                    .col(ColumnDef::new(Transactions::Notes).string())
                    .col(ColumnDef::new(Transactions::ImportId).string())
                    .col(
                        ColumnDef::new(Transactions::CreatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-transactions-budget_id")
                            .from(Transactions::Table, Transactions::BudgetId)
                            .to(Budgets::Table, Budgets::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-transactions-budget_id-posted_at")
                    .table(Transactions::Table)
                    .col(Transactions::BudgetId)
                    .col(Transactions::PostedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-transactions-import_id-unique")
                    .table(Transactions::Table)
                    .col(Transactions::BudgetId)
                    .col(Transactions::ImportId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 10. Transaction Lines
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(TransactionLines::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(TransactionLines::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(TransactionLines::TransactionId)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(TransactionLines::AccountId)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(TransactionLines::CategoryId).string())
                    .col(ColumnDef::new(TransactionLines::PayeeId).string())
                    .col(
                        ColumnDef::new(TransactionLines::AmountMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(TransactionLines::Memo).string())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-transaction_lines-transaction_id")
                            .from(TransactionLines::Table, TransactionLines::TransactionId)
                            .to(Transactions::Table, Transactions::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-transaction_lines-account_id")
                            .from(TransactionLines::Table, TransactionLines::AccountId)
                            .to(Accounts::Table, Accounts::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-transaction_lines-category_id")
                            .from(TransactionLines::Table, TransactionLines::CategoryId)
                            .to(Categories::Table, Categories::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-transaction_lines-payee_id")
                            .from(TransactionLines::Table, TransactionLines::PayeeId)
                            .to(Payees::Table, Payees::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-transaction_lines-transaction_id")
                    .table(TransactionLines::Table)
                    .col(TransactionLines::TransactionId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-transaction_lines-account_id")
                    .table(TransactionLines::Table)
                    .col(TransactionLines::AccountId)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 11. Line Tags
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(LineTags::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(LineTags::LineId).string().not_null())
                    .col(ColumnDef::new(LineTags::TagId).string().not_null())
                    .col(ColumnDef::new(LineTags::CreatedAt).timestamp().not_null())
                    .primary_key(Index::create().col(LineTags::LineId).col(LineTags::TagId))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-line_tags-line_id")
                            .from(LineTags::Table, LineTags::LineId)
                            .to(TransactionLines::Table, TransactionLines::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-line_tags-tag_id")
                            .from(LineTags::Table, LineTags::TagId)
                            .to(Tags::Table, Tags::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-line_tags-tag_id")
                    .table(LineTags::Table)
                    .col(LineTags::TagId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Drop in reverse order of creation (respecting FK dependencies)
        manager
            .drop_table(Table::drop().table(LineTags::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(TransactionLines::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Transactions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Tags::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Payees::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Categories::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Accounts::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(BudgetMembers::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Budgets::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Currencies::Table).to_owned())
            .await?;
        Ok(())
    }
}
