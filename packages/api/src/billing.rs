//! Core billing state transitions behind the subscription routes
//!
//! Every operation here is a single-statement write (plus reads); the dependent
//! settle-then-activate pairs are deliberately not wrapped in a database
//! transaction. Restaurant activation is an idempotent flag write, so a retried
//! confirmation converges after a crash between the two statements.

use chrono::{Days, NaiveDate, Utc};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, sea_query::Expr,
};
use thiserror::Error;

use crate::{
    entity::{prelude::*, restaurant, transaction},
    ledger::{self, SUBSCRIPTION_PERIOD_DAYS},
};

#[derive(Debug, Error)]
pub enum BillingError {
    #[error("restaurant already has transactions, trial is no longer available")]
    NotEligible,
    #[error("no matching transaction for this restaurant")]
    NotFound,
    #[error("transaction has already been reconciled")]
    AlreadyReconciled,
    #[error("no settled subscription to extend")]
    NoPriorSubscription,
    #[error("{0} did not affect exactly one row")]
    UpdateFailed(&'static str),
    #[error(transparent)]
    Db(#[from] DbErr),
}

/// What a successful trial start hands back to the caller.
#[derive(Debug)]
pub struct TrialOutcome {
    pub transaction: transaction::Model,
    pub restaurant: restaurant::Model,
}

/// Settlement facts pulled from the gateway for one checkout session.
#[derive(Debug, Clone)]
pub struct Settlement {
    pub session_id: String,
    pub session_status: Option<String>,
    pub payment_status: String,
    pub amount_total: Option<i64>,
    pub payment_intent: Option<String>,
    pub payer_email: Option<String>,
    pub payer_name: Option<String>,
    pub payer_postal_code: Option<String>,
    pub card: Option<CardFacts>,
}

#[derive(Debug, Clone)]
pub struct CardFacts {
    pub brand: String,
    pub exp_month: i32,
    pub exp_year: i32,
    pub last_four: String,
}

/// Grant a 30-day trial to a restaurant with no billing history.
///
/// First action wins: any existing transaction, settled or pending, makes the
/// restaurant permanently ineligible.
pub async fn start_trial(
    db: &DatabaseConnection,
    restaurant_id: i32,
    owner_id: i32,
    today: NaiveDate,
) -> Result<TrialOutcome, BillingError> {
    let prior = Transaction::find()
        .filter(transaction::Column::RestaurantId.eq(restaurant_id))
        .count(db)
        .await?;
    if prior > 0 {
        return Err(BillingError::NotEligible);
    }

    let end_date = today + Days::new(SUBSCRIPTION_PERIOD_DAYS);
    let transaction = transaction::ActiveModel {
        restaurant_id: Set(restaurant_id),
        created_at: Set(Utc::now().naive_utc()),
        subscription_end_date: Set(Some(end_date)),
        ..Default::default()
    }
    .insert(db)
    .await?;

    activate_restaurant(db, restaurant_id, owner_id).await?;
    let restaurant = Restaurant::find_by_id(restaurant_id)
        .one(db)
        .await?
        .ok_or(BillingError::NotFound)?;

    tracing::info!(
        restaurant_id,
        transaction_id = transaction.id,
        %end_date,
        "trial started"
    );

    Ok(TrialOutcome {
        transaction,
        restaurant,
    })
}

/// Open a pending transaction for a checkout about to be handed to the gateway.
///
/// The row stays behind if the gateway call fails; abandoned checkouts are never
/// cleaned up.
pub async fn open_pending_transaction(
    db: &DatabaseConnection,
    restaurant_id: i32,
) -> Result<transaction::Model, DbErr> {
    transaction::ActiveModel {
        restaurant_id: Set(restaurant_id),
        created_at: Set(Utc::now().naive_utc()),
        ..Default::default()
    }
    .insert(db)
    .await
}

/// Redirect target for a completed checkout. The gateway substitutes its session id
/// into the literal `{CHECKOUT_SESSION_ID}` placeholder; transaction and restaurant
/// ids ride along so confirmation needs no server-side session state.
pub fn build_success_url(front_domain: &str, transaction_id: i32, restaurant_id: i32) -> String {
    format!(
        "{front_domain}/payment-result?session_id={{CHECKOUT_SESSION_ID}}&transaction_id={transaction_id}&restaurant_id={restaurant_id}"
    )
}

pub fn build_cancel_url(front_domain: &str) -> String {
    format!("{front_domain}/dashboard")
}

/// Settle a pending transaction with gateway facts and extend the ledger.
///
/// The update is conditioned on `session_id IS NULL`, which makes it the
/// idempotency gate: of N concurrent confirmations for the same row, exactly one
/// matches. Zero affected rows gets classified by a follow-up read.
pub async fn apply_settlement(
    db: &DatabaseConnection,
    transaction_id: i32,
    restaurant_id: i32,
    settlement: &Settlement,
    today: NaiveDate,
) -> Result<NaiveDate, BillingError> {
    let previous = ledger::current_end_date(db, restaurant_id)
        .await?
        .ok_or(BillingError::NoPriorSubscription)?;
    let end_date = ledger::rollover(previous, today);

    let card = settlement.card.as_ref();
    let result = Transaction::update_many()
        .col_expr(
            transaction::Column::SubscriptionEndDate,
            Expr::value(Some(end_date)),
        )
        .col_expr(
            transaction::Column::SessionId,
            Expr::value(Some(settlement.session_id.clone())),
        )
        .col_expr(
            transaction::Column::SessionStatus,
            Expr::value(settlement.session_status.clone()),
        )
        .col_expr(
            transaction::Column::PaymentStatus,
            Expr::value(Some(settlement.payment_status.clone())),
        )
        .col_expr(
            transaction::Column::AmountTotal,
            Expr::value(settlement.amount_total),
        )
        .col_expr(
            transaction::Column::PaymentIntent,
            Expr::value(settlement.payment_intent.clone()),
        )
        .col_expr(
            transaction::Column::PayerEmail,
            Expr::value(settlement.payer_email.clone()),
        )
        .col_expr(
            transaction::Column::PayerName,
            Expr::value(settlement.payer_name.clone()),
        )
        .col_expr(
            transaction::Column::PayerPostalCode,
            Expr::value(settlement.payer_postal_code.clone()),
        )
        .col_expr(
            transaction::Column::CardBrand,
            Expr::value(card.map(|c| c.brand.clone())),
        )
        .col_expr(
            transaction::Column::CardExpMonth,
            Expr::value(card.map(|c| c.exp_month)),
        )
        .col_expr(
            transaction::Column::CardExpYear,
            Expr::value(card.map(|c| c.exp_year)),
        )
        .col_expr(
            transaction::Column::CardLastFour,
            Expr::value(card.map(|c| c.last_four.clone())),
        )
        .filter(transaction::Column::Id.eq(transaction_id))
        .filter(transaction::Column::RestaurantId.eq(restaurant_id))
        .filter(transaction::Column::SessionId.is_null())
        .exec(db)
        .await?;

    match result.rows_affected {
        1 => {
            tracing::info!(
                transaction_id,
                restaurant_id,
                session_id = %settlement.session_id,
                amount_total = settlement.amount_total,
                %end_date,
                "transaction settled"
            );
            Ok(end_date)
        }
        0 => {
            let row = Transaction::find_by_id(transaction_id)
                .filter(transaction::Column::RestaurantId.eq(restaurant_id))
                .one(db)
                .await?;
            match row {
                Some(row) if row.session_id.is_some() => Err(BillingError::AlreadyReconciled),
                Some(_) => Err(BillingError::UpdateFailed("transaction settlement")),
                None => Err(BillingError::NotFound),
            }
        }
        _ => Err(BillingError::UpdateFailed("transaction settlement")),
    }
}

/// Flip `is_active`, scoped by owner as well as id so one tenant cannot activate
/// another's restaurant. Safe to repeat.
pub async fn activate_restaurant(
    db: &DatabaseConnection,
    restaurant_id: i32,
    owner_id: i32,
) -> Result<(), BillingError> {
    let result = Restaurant::update_many()
        .col_expr(restaurant::Column::IsActive, Expr::value(true))
        .filter(restaurant::Column::Id.eq(restaurant_id))
        .filter(restaurant::Column::OwnerId.eq(owner_id))
        .exec(db)
        .await?;

    if result.rows_affected != 1 {
        tracing::warn!(
            restaurant_id,
            owner_id,
            rows = result.rows_affected,
            "restaurant activation matched an unexpected row count"
        );
        return Err(BillingError::UpdateFailed("restaurant activation"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_url_keeps_the_gateway_placeholder_literal() {
        let url = build_success_url("https://app.restomate.io", 42, 7);
        assert_eq!(
            url,
            "https://app.restomate.io/payment-result?session_id={CHECKOUT_SESSION_ID}&transaction_id=42&restaurant_id=7"
        );
    }

    #[test]
    fn cancel_url_points_at_the_dashboard() {
        assert_eq!(
            build_cancel_url("https://app.restomate.io"),
            "https://app.restomate.io/dashboard"
        );
    }
}
