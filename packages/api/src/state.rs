use std::{sync::Arc, time::Duration};

use sea_orm::{ConnectOptions, Database, DatabaseConnection};

use crate::{
    config::AppConfig,
    mail::{DynMailClient, Mailer, SmtpMailClient},
};

pub type AppState = Arc<State>;

/// Everything a handler needs, built once at startup from [`AppConfig`].
pub struct State {
    pub config: AppConfig,
    pub db: DatabaseConnection,
    /// `None` when payments are disabled for this deployment
    pub stripe_client: Option<stripe::Client>,
    pub mailer: Mailer,
}

impl State {
    pub async fn new(config: AppConfig) -> Result<Self, sea_orm::DbErr> {
        let mut opt = ConnectOptions::new(config.database_url.clone());
        opt.max_connections(10)
            .min_connections(1)
            .connect_timeout(Duration::from_secs(8));

        let db = Database::connect(opt).await?;

        let stripe_client = config
            .stripe_secret_key
            .as_ref()
            .map(|key| stripe::Client::new(key.clone()));
        if stripe_client.is_none() {
            tracing::warn!("STRIPE_SECRET_KEY not set, payments are disabled");
        }

        let mail_client: Option<DynMailClient> = match &config.smtp {
            Some(smtp) => match SmtpMailClient::new(smtp) {
                Ok(client) => Some(Arc::new(client)),
                Err(e) => {
                    tracing::warn!("Failed to initialize mail client: {}", e);
                    None
                }
            },
            None => {
                tracing::warn!("SMTP not configured, outbound email is disabled");
                None
            }
        };
        let mailer = Mailer::new(mail_client, db.clone());

        Ok(Self {
            config,
            db,
            stripe_client,
            mailer,
        })
    }
}
