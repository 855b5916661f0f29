//! Outbound email: an object-safe transport trait plus the audited [`Mailer`]
//!
//! Delivery is best-effort everywhere in this service. Every attempt, delivered
//! or not, lands in the `sent_emails` audit table before the outcome is reported
//! to the caller, and a failed send never fails the operation that triggered it.

use std::sync::Arc;

use chrono::Utc;
use sea_orm::{ActiveModelTrait, ActiveValue::Set, DatabaseConnection};
use thiserror::Error;

use crate::entity::sent_email;

mod smtp;
pub mod templates;

pub use smtp::SmtpMailClient;

#[derive(Clone)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub body_html: Option<String>,
    pub body_text: Option<String>,
}

#[derive(Debug, Error)]
pub enum MailError {
    #[error("invalid address: {0}")]
    Address(#[from] lettre::address::AddressError),
    #[error("failed to build email: {0}")]
    Build(#[from] lettre::error::Error),
    #[error("smtp transport error: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),
    #[error("email must have an HTML or text body")]
    EmptyBody,
    #[error("mail transport is not configured")]
    NotConfigured,
}

#[async_trait::async_trait]
pub trait MailClient: Send + Sync {
    /// Returns the transport's acknowledgement (e.g. the SMTP reply code).
    async fn send(&self, message: EmailMessage) -> Result<String, MailError>;
    fn from_email(&self) -> &str;
    fn from_name(&self) -> &str;
}

pub type DynMailClient = Arc<dyn MailClient>;

/// Transport plus audit trail. Cheap to clone alongside the connection pool.
#[derive(Clone)]
pub struct Mailer {
    client: Option<DynMailClient>,
    db: DatabaseConnection,
}

impl Mailer {
    pub fn new(client: Option<DynMailClient>, db: DatabaseConnection) -> Self {
        Self { client, db }
    }

    /// Send `message`, audit the attempt, and report whether delivery worked.
    ///
    /// The audit row is written before this returns. `note` records why the
    /// email went out, e.g. "trial started for restaurant 7".
    pub async fn send_logged(&self, message: EmailMessage, note: &str) -> bool {
        let to = message.to.clone();
        let result = match &self.client {
            Some(client) => client.send(message).await,
            None => Err(MailError::NotConfigured),
        };

        let (successful, response) = match &result {
            Ok(reply) => (true, Some(reply.clone())),
            Err(e) => (false, Some(e.to_string())),
        };

        let audit = sent_email::ActiveModel {
            sent_to: Set(to.clone()),
            note: Set(note.to_string()),
            successful: Set(successful),
            response: Set(response),
            created_at: Set(Utc::now().naive_utc()),
            ..Default::default()
        };
        if let Err(e) = audit.insert(&self.db).await {
            tracing::error!("Failed to record email audit row: {:?}", e);
        }

        match result {
            Ok(_) => true,
            Err(e) => {
                tracing::warn!(to = %to, note, "Email delivery failed: {}", e);
                false
            }
        }
    }
}
