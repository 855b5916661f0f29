//! `SeaORM` Entity auditing every outbound email attempt, delivered or not

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "sent_emails")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub sent_to: String,
    /// Why the email was sent, e.g. "trial started for restaurant 7"
    pub note: String,
    pub successful: bool,
    /// SMTP reply code on success, the transport error otherwise
    #[sea_orm(nullable)]
    pub response: Option<String>,
    pub created_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
