//! Subscription ledger: one authoritative end date per restaurant
//!
//! The ledger is a derived view over settled transactions (rows with a non-null
//! `subscription_end_date`). The row with the latest end date wins; ties go to the
//! highest transaction id so the result is deterministic.

use chrono::{Days, NaiveDate};
use sea_orm::{
    ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder, QuerySelect,
};

use crate::entity::{prelude::*, transaction};

/// Days granted by a trial and by every paid renewal.
pub const SUBSCRIPTION_PERIOD_DAYS: u64 = 30;

/// The settled transaction currently backing the ledger, if any.
pub async fn latest_settled(
    db: &DatabaseConnection,
    restaurant_id: i32,
) -> Result<Option<transaction::Model>, DbErr> {
    Transaction::find()
        .filter(transaction::Column::RestaurantId.eq(restaurant_id))
        .filter(transaction::Column::SubscriptionEndDate.is_not_null())
        .order_by_desc(transaction::Column::SubscriptionEndDate)
        .order_by_desc(transaction::Column::Id)
        .limit(1)
        .one(db)
        .await
}

/// Current subscription end date for the restaurant, `None` when nothing is settled.
pub async fn current_end_date(
    db: &DatabaseConnection,
    restaurant_id: i32,
) -> Result<Option<NaiveDate>, DbErr> {
    let settled = latest_settled(db, restaurant_id).await?;
    Ok(settled.and_then(|t| t.subscription_end_date))
}

/// Compute the end date a renewal settles to.
///
/// An expired subscription restarts from today; unused days are gone. An active
/// subscription stacks on top of its current expiry. `previous == today` counts as
/// active, both branches land on `today + 30` there anyway.
pub fn rollover(previous: NaiveDate, today: NaiveDate) -> NaiveDate {
    let base = if previous < today { today } else { previous };
    base + Days::new(SUBSCRIPTION_PERIOD_DAYS)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn expired_subscription_resets_from_today() {
        let today = day(2026, 3, 10);
        assert_eq!(rollover(day(2026, 3, 9), today), day(2026, 4, 9));
        assert_eq!(rollover(day(2024, 1, 1), today), day(2026, 4, 9));
    }

    #[test]
    fn active_subscription_stacks() {
        let today = day(2026, 3, 10);
        assert_eq!(rollover(day(2026, 3, 20), today), day(2026, 4, 19));
        assert_eq!(rollover(day(2026, 3, 11), today), day(2026, 4, 10));
    }

    #[test]
    fn expiring_today_still_stacks() {
        let today = day(2026, 3, 10);
        assert_eq!(rollover(today, today), day(2026, 4, 9));
    }

    #[test]
    fn stacking_crosses_month_and_year_boundaries() {
        let today = day(2026, 12, 15);
        assert_eq!(rollover(day(2026, 12, 20), today), day(2027, 1, 19));
    }
}
