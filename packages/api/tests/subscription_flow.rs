//! End-to-end coverage of the subscription lifecycle against a real schema:
//! trial eligibility, ledger selection, settlement idempotency and activation
//! scoping, all on in-memory SQLite with the production migrations.

use chrono::{Days, NaiveDate, Utc};
use restomate_api::billing::{self, BillingError};
use restomate_api::entity::{prelude::*, transaction};
use restomate_api::ledger;
use restomate_api::sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter};

mod support;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

#[tokio::test]
async fn trial_grants_thirty_days_and_activates_the_restaurant() {
    let db = support::init_test_db().await;
    let owner = support::seed_owner(&db, "trial@example.com").await;
    let restaurant = support::seed_restaurant(&db, owner.id, "Baia").await;
    let today = Utc::now().date_naive();

    let outcome = billing::start_trial(&db, restaurant.id, owner.id, today)
        .await
        .expect("trial starts");

    assert_eq!(
        outcome.transaction.subscription_end_date,
        Some(today + Days::new(30))
    );
    assert!(outcome.restaurant.is_active);
    assert_eq!(
        ledger::current_end_date(&db, restaurant.id)
            .await
            .expect("ledger read"),
        Some(today + Days::new(30))
    );
}

#[tokio::test]
async fn trial_is_one_shot() {
    let db = support::init_test_db().await;
    let owner = support::seed_owner(&db, "oneshot@example.com").await;
    let restaurant = support::seed_restaurant(&db, owner.id, "Baia").await;
    let today = Utc::now().date_naive();

    billing::start_trial(&db, restaurant.id, owner.id, today)
        .await
        .expect("first trial starts");
    let err = billing::start_trial(&db, restaurant.id, owner.id, today)
        .await
        .expect_err("second trial must fail");

    assert!(matches!(err, BillingError::NotEligible));
    let count = Transaction::find()
        .filter(transaction::Column::RestaurantId.eq(restaurant.id))
        .count(&db)
        .await
        .expect("count");
    assert_eq!(count, 1);
}

#[tokio::test]
async fn any_prior_transaction_blocks_the_trial() {
    let db = support::init_test_db().await;
    let owner = support::seed_owner(&db, "blocked@example.com").await;
    let restaurant = support::seed_restaurant(&db, owner.id, "Baia").await;

    // An abandoned checkout row is enough to burn eligibility.
    support::pending_transaction(&db, restaurant.id).await;

    let err = billing::start_trial(&db, restaurant.id, owner.id, Utc::now().date_naive())
        .await
        .expect_err("trial must fail");
    assert!(matches!(err, BillingError::NotEligible));
}

#[tokio::test]
async fn ledger_picks_the_latest_end_date() {
    let db = support::init_test_db().await;
    let owner = support::seed_owner(&db, "ledger@example.com").await;
    let restaurant = support::seed_restaurant(&db, owner.id, "Baia").await;

    support::settled_transaction(&db, restaurant.id, date(2026, 1, 10)).await;
    let newer = support::settled_transaction(&db, restaurant.id, date(2026, 3, 1)).await;
    support::pending_transaction(&db, restaurant.id).await;

    let settled = ledger::latest_settled(&db, restaurant.id)
        .await
        .expect("ledger read")
        .expect("a settled row exists");
    assert_eq!(settled.id, newer.id);
    assert_eq!(settled.subscription_end_date, Some(date(2026, 3, 1)));
}

#[tokio::test]
async fn ledger_breaks_date_ties_by_newest_row() {
    let db = support::init_test_db().await;
    let owner = support::seed_owner(&db, "ties@example.com").await;
    let restaurant = support::seed_restaurant(&db, owner.id, "Baia").await;

    support::settled_transaction(&db, restaurant.id, date(2026, 5, 1)).await;
    let second = support::settled_transaction(&db, restaurant.id, date(2026, 5, 1)).await;

    let settled = ledger::latest_settled(&db, restaurant.id)
        .await
        .expect("ledger read")
        .expect("a settled row exists");
    assert_eq!(settled.id, second.id);
}

#[tokio::test]
async fn settlement_extends_an_active_subscription() {
    let db = support::init_test_db().await;
    let owner = support::seed_owner(&db, "renewal@example.com").await;
    let restaurant = support::seed_restaurant(&db, owner.id, "Baia").await;
    let today = Utc::now().date_naive();

    // Day 0: trial. Same day: the owner pays through checkout.
    billing::start_trial(&db, restaurant.id, owner.id, today)
        .await
        .expect("trial starts");
    let pending = billing::open_pending_transaction(&db, restaurant.id)
        .await
        .expect("pending row");

    let settlement = support::sample_settlement("cs_test_renewal");
    let end_date = billing::apply_settlement(&db, pending.id, restaurant.id, &settlement, today)
        .await
        .expect("settlement applies");

    // Unused trial days are kept: 30 remaining + 30 purchased.
    assert_eq!(end_date, today + Days::new(60));

    let row = Transaction::find_by_id(pending.id)
        .one(&db)
        .await
        .expect("read back")
        .expect("row exists");
    assert_eq!(row.session_id.as_deref(), Some("cs_test_renewal"));
    assert_eq!(row.payment_status.as_deref(), Some("paid"));
    assert_eq!(row.amount_total, Some(2000));
    assert_eq!(row.card_brand.as_deref(), Some("visa"));
    assert_eq!(row.card_last_four.as_deref(), Some("4242"));
    assert_eq!(row.payer_postal_code.as_deref(), Some("10115"));
    assert_eq!(row.subscription_end_date, Some(today + Days::new(60)));
}

#[tokio::test]
async fn settlement_restarts_an_expired_subscription_from_today() {
    let db = support::init_test_db().await;
    let owner = support::seed_owner(&db, "expired@example.com").await;
    let restaurant = support::seed_restaurant(&db, owner.id, "Baia").await;
    let today = Utc::now().date_naive();

    support::settled_transaction(&db, restaurant.id, today - Days::new(90)).await;
    let pending = support::pending_transaction(&db, restaurant.id).await;

    let settlement = support::sample_settlement("cs_test_lapsed");
    let end_date = billing::apply_settlement(&db, pending.id, restaurant.id, &settlement, today)
        .await
        .expect("settlement applies");

    // The lapsed period is gone; the new period starts counting now.
    assert_eq!(end_date, today + Days::new(30));
}

#[tokio::test]
async fn settled_payments_cannot_be_replayed() {
    let db = support::init_test_db().await;
    let owner = support::seed_owner(&db, "replay@example.com").await;
    let restaurant = support::seed_restaurant(&db, owner.id, "Baia").await;
    let today = Utc::now().date_naive();

    support::settled_transaction(&db, restaurant.id, today + Days::new(10)).await;
    let pending = support::pending_transaction(&db, restaurant.id).await;

    let first = support::sample_settlement("cs_test_first");
    let end_date = billing::apply_settlement(&db, pending.id, restaurant.id, &first, today)
        .await
        .expect("first settlement applies");

    let replay = support::sample_settlement("cs_test_second");
    let err = billing::apply_settlement(&db, pending.id, restaurant.id, &replay, today)
        .await
        .expect_err("replay must fail");
    assert!(matches!(err, BillingError::AlreadyReconciled));

    // The row and the ledger still carry the first settlement.
    let row = Transaction::find_by_id(pending.id)
        .one(&db)
        .await
        .expect("read back")
        .expect("row exists");
    assert_eq!(row.session_id.as_deref(), Some("cs_test_first"));
    assert_eq!(
        ledger::current_end_date(&db, restaurant.id)
            .await
            .expect("ledger read"),
        Some(end_date)
    );
}

#[tokio::test]
async fn settlement_requires_a_prior_subscription() {
    let db = support::init_test_db().await;
    let owner = support::seed_owner(&db, "noprior@example.com").await;
    let restaurant = support::seed_restaurant(&db, owner.id, "Baia").await;

    let pending = support::pending_transaction(&db, restaurant.id).await;
    let settlement = support::sample_settlement("cs_test_noprior");

    let err = billing::apply_settlement(
        &db,
        pending.id,
        restaurant.id,
        &settlement,
        Utc::now().date_naive(),
    )
    .await
    .expect_err("no ledger to extend");
    assert!(matches!(err, BillingError::NoPriorSubscription));

    let row = Transaction::find_by_id(pending.id)
        .one(&db)
        .await
        .expect("read back")
        .expect("row exists");
    assert!(row.session_id.is_none());
}

#[tokio::test]
async fn settlement_for_a_missing_transaction_is_not_found() {
    let db = support::init_test_db().await;
    let owner = support::seed_owner(&db, "missing@example.com").await;
    let restaurant = support::seed_restaurant(&db, owner.id, "Baia").await;
    let today = Utc::now().date_naive();

    support::settled_transaction(&db, restaurant.id, today + Days::new(5)).await;

    let settlement = support::sample_settlement("cs_test_missing");
    let err = billing::apply_settlement(&db, 9999, restaurant.id, &settlement, today)
        .await
        .expect_err("unknown transaction");
    assert!(matches!(err, BillingError::NotFound));
}

#[tokio::test]
async fn settlement_is_scoped_to_the_restaurant() {
    let db = support::init_test_db().await;
    let owner = support::seed_owner(&db, "scoped@example.com").await;
    let mine = support::seed_restaurant(&db, owner.id, "Baia").await;
    let other = support::seed_restaurant(&db, owner.id, "Solara").await;
    let today = Utc::now().date_naive();

    support::settled_transaction(&db, mine.id, today + Days::new(5)).await;
    let foreign_pending = support::pending_transaction(&db, other.id).await;

    let settlement = support::sample_settlement("cs_test_scoped");
    let err = billing::apply_settlement(&db, foreign_pending.id, mine.id, &settlement, today)
        .await
        .expect_err("transaction belongs to another restaurant");
    assert!(matches!(err, BillingError::NotFound));
}

#[tokio::test]
async fn restaurant_activation_is_owner_scoped() {
    let db = support::init_test_db().await;
    let owner = support::seed_owner(&db, "owner@example.com").await;
    let other = support::seed_owner(&db, "other@example.com").await;
    let restaurant = support::seed_restaurant(&db, owner.id, "Baia").await;

    let err = billing::activate_restaurant(&db, restaurant.id, other.id)
        .await
        .expect_err("someone else's restaurant");
    assert!(matches!(err, BillingError::UpdateFailed(_)));

    let row = Restaurant::find_by_id(restaurant.id)
        .one(&db)
        .await
        .expect("read back")
        .expect("row exists");
    assert!(!row.is_active);

    billing::activate_restaurant(&db, restaurant.id, owner.id)
        .await
        .expect("the owner can activate");
    let row = Restaurant::find_by_id(restaurant.id)
        .one(&db)
        .await
        .expect("read back")
        .expect("row exists");
    assert!(row.is_active);
}

#[tokio::test]
async fn ledgers_are_independent_per_restaurant() {
    let db = support::init_test_db().await;
    let owner = support::seed_owner(&db, "multi@example.com").await;
    let first = support::seed_restaurant(&db, owner.id, "Baia").await;
    let second = support::seed_restaurant(&db, owner.id, "Solara").await;

    support::settled_transaction(&db, first.id, date(2026, 6, 1)).await;

    assert_eq!(
        ledger::current_end_date(&db, first.id)
            .await
            .expect("ledger read"),
        Some(date(2026, 6, 1))
    );
    assert_eq!(
        ledger::current_end_date(&db, second.id)
            .await
            .expect("ledger read"),
        None
    );
}

#[tokio::test]
async fn checkout_urls_carry_the_reconciliation_ids() {
    let db = support::init_test_db().await;
    let owner = support::seed_owner(&db, "urls@example.com").await;
    let restaurant = support::seed_restaurant(&db, owner.id, "Baia").await;
    let pending = billing::open_pending_transaction(&db, restaurant.id)
        .await
        .expect("pending row");

    let url = billing::build_success_url("https://app.example.com", pending.id, restaurant.id);
    assert!(url.contains("{CHECKOUT_SESSION_ID}"));
    assert!(url.contains(&format!("transaction_id={}", pending.id)));
    assert!(url.contains(&format!("restaurant_id={}", restaurant.id)));
}
