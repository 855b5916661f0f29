//! Initial schema: owners, restaurants, transactions and the sent-email audit log.
//!
//! Everything goes through the schema builder so the same migration runs on
//! Postgres in production and on in-memory SQLite in the test suite.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Owners::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Owners::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Owners::FirstName).string().not_null())
                    .col(ColumnDef::new(Owners::LastName).string().not_null())
                    .col(
                        ColumnDef::new(Owners::Email)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(Owners::EmailVerified)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Owners::PasswordHash).string().not_null())
                    .col(ColumnDef::new(Owners::CreatedAt).date_time().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Restaurants::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Restaurants::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Restaurants::OwnerId).integer().not_null())
                    .col(ColumnDef::new(Restaurants::Name).string().not_null())
                    .col(ColumnDef::new(Restaurants::Street).string())
                    .col(ColumnDef::new(Restaurants::Unit).string())
                    .col(ColumnDef::new(Restaurants::City).string())
                    .col(ColumnDef::new(Restaurants::State).string())
                    .col(ColumnDef::new(Restaurants::Zip).string())
                    .col(ColumnDef::new(Restaurants::Phone).string())
                    .col(ColumnDef::new(Restaurants::Email).string())
                    .col(
                        ColumnDef::new(Restaurants::IsActive)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Restaurants::CreatedAt)
                            .date_time()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_restaurants_owner_id")
                            .from(Restaurants::Table, Restaurants::OwnerId)
                            .to(Owners::Table, Owners::Id)
                            .on_update(ForeignKeyAction::Cascade)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Transactions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Transactions::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Transactions::RestaurantId)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Transactions::CreatedAt)
                            .date_time()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Transactions::SubscriptionEndDate).date())
                    .col(ColumnDef::new(Transactions::SessionId).string())
                    .col(ColumnDef::new(Transactions::SessionStatus).string())
                    .col(ColumnDef::new(Transactions::PaymentStatus).string())
                    .col(ColumnDef::new(Transactions::AmountTotal).big_integer())
                    .col(ColumnDef::new(Transactions::PaymentIntent).string())
                    .col(ColumnDef::new(Transactions::PayerEmail).string())
                    .col(ColumnDef::new(Transactions::PayerName).string())
                    .col(ColumnDef::new(Transactions::PayerPostalCode).string())
                    .col(ColumnDef::new(Transactions::CardBrand).string())
                    .col(ColumnDef::new(Transactions::CardExpMonth).integer())
                    .col(ColumnDef::new(Transactions::CardExpYear).integer())
                    .col(ColumnDef::new(Transactions::CardLastFour).string())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_transactions_restaurant_id")
                            .from(Transactions::Table, Transactions::RestaurantId)
                            .to(Restaurants::Table, Restaurants::Id)
                            .on_update(ForeignKeyAction::Cascade)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // The ledger query filters by restaurant and orders by end date.
        manager
            .create_index(
                Index::create()
                    .name("idx_transactions_restaurant_end_date")
                    .table(Transactions::Table)
                    .col(Transactions::RestaurantId)
                    .col(Transactions::SubscriptionEndDate)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(SentEmails::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SentEmails::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(SentEmails::SentTo).string().not_null())
                    .col(ColumnDef::new(SentEmails::Note).string().not_null())
                    .col(ColumnDef::new(SentEmails::Successful).boolean().not_null())
                    .col(ColumnDef::new(SentEmails::Response).string())
                    .col(ColumnDef::new(SentEmails::CreatedAt).date_time().not_null())
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(SentEmails::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Transactions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Restaurants::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Owners::Table).to_owned())
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Owners {
    Table,
    Id,
    FirstName,
    LastName,
    Email,
    EmailVerified,
    PasswordHash,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Restaurants {
    Table,
    Id,
    OwnerId,
    Name,
    Street,
    Unit,
    City,
    State,
    Zip,
    Phone,
    Email,
    IsActive,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Transactions {
    Table,
    Id,
    RestaurantId,
    CreatedAt,
    SubscriptionEndDate,
    SessionId,
    SessionStatus,
    PaymentStatus,
    AmountTotal,
    PaymentIntent,
    PayerEmail,
    PayerName,
    PayerPostalCode,
    CardBrand,
    CardExpMonth,
    CardExpYear,
    CardLastFour,
}

#[derive(DeriveIden)]
enum SentEmails {
    Table,
    Id,
    SentTo,
    Note,
    Successful,
    Response,
    CreatedAt,
}
