//! `SeaORM` Entity for subscription transactions, the append-only billing record
//!
//! A row with a non-null `subscription_end_date` is settled and contributes to the
//! subscription ledger. A row with a non-null `session_id` has been reconciled
//! against the payment gateway; that transition happens at most once per row.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub restaurant_id: i32,
    pub created_at: DateTime,
    /// Set on trial start or payment confirmation; null while a checkout is pending
    #[sea_orm(nullable)]
    pub subscription_end_date: Option<Date>,
    /// Gateway checkout session; non-null exactly when the row is reconciled
    #[sea_orm(nullable)]
    pub session_id: Option<String>,
    #[sea_orm(nullable)]
    pub session_status: Option<String>,
    #[sea_orm(nullable)]
    pub payment_status: Option<String>,
    /// Amount charged, in minor units of the checkout currency
    #[sea_orm(nullable)]
    pub amount_total: Option<i64>,
    #[sea_orm(nullable)]
    pub payment_intent: Option<String>,
    #[sea_orm(nullable)]
    pub payer_email: Option<String>,
    #[sea_orm(nullable)]
    pub payer_name: Option<String>,
    #[sea_orm(nullable)]
    pub payer_postal_code: Option<String>,
    #[sea_orm(nullable)]
    pub card_brand: Option<String>,
    #[sea_orm(nullable)]
    pub card_exp_month: Option<i32>,
    #[sea_orm(nullable)]
    pub card_exp_year: Option<i32>,
    #[sea_orm(nullable)]
    pub card_last_four: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::restaurant::Entity",
        from = "Column::RestaurantId",
        to = "super::restaurant::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    Restaurant,
}

impl Related<super::restaurant::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Restaurant.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
