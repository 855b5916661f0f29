//! Process-wide configuration, read from the environment exactly once at startup
//! and handed into [`crate::state::State`]. Nothing below this layer touches env vars.

use std::env;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub port: u16,
    pub database_url: String,
    /// HS256 secret shared by session and email-verification tokens
    pub jwt_secret: String,
    /// Frontend origin, used for CORS and for checkout redirect URLs
    pub front_domain: String,
    /// Monthly subscription price in cents
    pub subscription_price_cents: i64,
    /// Payments are disabled when unset
    pub stripe_secret_key: Option<String>,
    /// Outbound email is disabled when unset
    pub smtp: Option<SmtpConfig>,
}

#[derive(Clone, Debug)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub from_address: String,
    pub from_name: String,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(AppConfig {
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("PORT".to_string()))?,
            database_url: required("DATABASE_URL")?,
            jwt_secret: required("JWT_SECRET")?,
            front_domain: required("FRONT_DOMAIN")?
                .trim_end_matches('/')
                .to_string(),
            subscription_price_cents: env::var("SUBSCRIPTION_PRICE_CENTS")
                .unwrap_or_else(|_| "2000".to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("SUBSCRIPTION_PRICE_CENTS".to_string()))?,
            stripe_secret_key: env::var("STRIPE_SECRET_KEY").ok(),
            smtp: SmtpConfig::from_env()?,
        })
    }
}

impl SmtpConfig {
    /// `SMTP_HOST` switches the whole block on; the rest is required once it is set.
    fn from_env() -> Result<Option<Self>, ConfigError> {
        let Ok(host) = env::var("SMTP_HOST") else {
            return Ok(None);
        };

        let username = required("SMTP_USERNAME")?;
        Ok(Some(SmtpConfig {
            host,
            port: env::var("SMTP_PORT")
                .unwrap_or_else(|_| "587".to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("SMTP_PORT".to_string()))?,
            password: required("SMTP_PASSWORD")?,
            from_address: env::var("SMTP_FROM_ADDRESS").unwrap_or_else(|_| username.clone()),
            from_name: env::var("SMTP_FROM_NAME").unwrap_or_else(|_| "Restomate".to_string()),
            username,
        }))
    }
}

fn required(name: &'static str) -> Result<String, ConfigError> {
    env::var(name).map_err(|_| ConfigError::MissingVar(name))
}

#[derive(Debug)]
pub enum ConfigError {
    MissingVar(&'static str),
    InvalidValue(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::MissingVar(var) => write!(f, "Missing environment variable: {}", var),
            ConfigError::InvalidValue(var) => write!(f, "Invalid value for: {}", var),
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_variable_names_the_culprit() {
        let err = ConfigError::MissingVar("JWT_SECRET");
        assert_eq!(err.to_string(), "Missing environment variable: JWT_SECRET");
    }

    #[test]
    fn invalid_value_names_the_variable() {
        let err = ConfigError::InvalidValue("PORT".to_string());
        assert_eq!(err.to_string(), "Invalid value for: PORT");
    }
}
