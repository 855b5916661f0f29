#![allow(dead_code)]

use chrono::{NaiveDate, Utc};
use restomate_api::billing::{CardFacts, Settlement};
use restomate_api::entity::{owner, restaurant, transaction};
use restomate_api::sea_orm::{ActiveModelTrait, ActiveValue::Set, Database, DatabaseConnection};
use restomate_migration::{Migrator, MigratorTrait};

/// Fresh in-memory database with the full production schema applied.
pub async fn init_test_db() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:")
        .await
        .expect("connect to in-memory sqlite");
    Migrator::up(&db, None).await.expect("run migrations");
    db
}

pub async fn seed_owner(db: &DatabaseConnection, email: &str) -> owner::Model {
    owner::ActiveModel {
        first_name: Set("Alex".to_string()),
        last_name: Set("Moreau".to_string()),
        email: Set(email.to_string()),
        email_verified: Set(true),
        password_hash: Set("seeded-hash".to_string()),
        created_at: Set(Utc::now().naive_utc()),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("insert owner")
}

pub async fn seed_restaurant(
    db: &DatabaseConnection,
    owner_id: i32,
    name: &str,
) -> restaurant::Model {
    restaurant::ActiveModel {
        owner_id: Set(owner_id),
        name: Set(name.to_string()),
        is_active: Set(false),
        created_at: Set(Utc::now().naive_utc()),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("insert restaurant")
}

/// A transaction that already counts toward the ledger.
pub async fn settled_transaction(
    db: &DatabaseConnection,
    restaurant_id: i32,
    end_date: NaiveDate,
) -> transaction::Model {
    transaction::ActiveModel {
        restaurant_id: Set(restaurant_id),
        created_at: Set(Utc::now().naive_utc()),
        subscription_end_date: Set(Some(end_date)),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("insert settled transaction")
}

/// An open checkout row, not yet reconciled.
pub async fn pending_transaction(
    db: &DatabaseConnection,
    restaurant_id: i32,
) -> transaction::Model {
    transaction::ActiveModel {
        restaurant_id: Set(restaurant_id),
        created_at: Set(Utc::now().naive_utc()),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("insert pending transaction")
}

/// Settlement facts the way the gateway would report them.
pub fn sample_settlement(session_id: &str) -> Settlement {
    Settlement {
        session_id: session_id.to_string(),
        session_status: Some("complete".to_string()),
        payment_status: "paid".to_string(),
        amount_total: Some(2000),
        payment_intent: Some(format!("pi_{session_id}")),
        payer_email: Some("payer@example.com".to_string()),
        payer_name: Some("Alex Moreau".to_string()),
        payer_postal_code: Some("10115".to_string()),
        card: Some(CardFacts {
            brand: "visa".to_string(),
            exp_month: 4,
            exp_year: 2030,
            last_four: "4242".to_string(),
        }),
    }
}
