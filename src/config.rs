//! Application configuration
//!
//! Loaded from a TOML file (default `~/.config/hotel-booking/config.toml`).
//! Every section and field has a default, so a partial file or no file at
//! all yields a runnable configuration.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::application::{LedgerSettings, ReconcilerSettings};
use crate::domain::booking::ReferenceCodeGenerator;
use crate::infrastructure::crypto::jwt::JwtConfig;
use crate::infrastructure::DatabaseConfig;
use crate::shared::retry::RetryConfig;

/// Environment variable naming an alternative config file.
pub const CONFIG_ENV: &str = "BOOKING_CONFIG";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// `~/.config/hotel-booking/config.toml`, or `./config.toml` when the
/// platform has no config directory.
pub fn default_config_path() -> PathBuf {
    dirs_next::config_dir()
        .map(|dir| dir.join("hotel-booking").join("config.toml"))
        .unwrap_or_else(|| PathBuf::from("config.toml"))
}

/// Path from `BOOKING_CONFIG`, falling back to [`default_config_path`].
pub fn config_path_from_env() -> PathBuf {
    std::env::var(CONFIG_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|_| default_config_path())
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerSection,
    pub database: DatabaseSection,
    pub logging: LoggingSection,
    pub security: SecuritySection,
    pub payments: PaymentsSection,
    pub notifications: NotificationsSection,
    pub reservations: ReservationsSection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSection {
    pub api_host: String,
    pub api_port: u16,
    /// Seconds to wait for in-flight requests on shutdown
    pub shutdown_timeout: u64,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            api_host: "0.0.0.0".to_string(),
            api_port: 8080,
            shutdown_timeout: 30,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseSection {
    pub url: String,
    pub max_connections: u32,
    pub connect_timeout_secs: u64,
}

impl Default for DatabaseSection {
    fn default() -> Self {
        let db = DatabaseConfig::default();
        Self {
            url: db.url,
            max_connections: db.max_connections,
            connect_timeout_secs: db.connect_timeout_secs,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// EnvFilter directive, e.g. "info" or "hotel_booking=debug,info"
    pub level: String,
    /// "pretty" or "json"
    pub format: String,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SecuritySection {
    pub jwt_secret: String,
    pub jwt_issuer: String,
    pub jwt_expiration_hours: i64,
}

impl Default for SecuritySection {
    fn default() -> Self {
        let jwt = JwtConfig::default();
        Self {
            jwt_secret: jwt.secret,
            jwt_issuer: jwt.issuer,
            jwt_expiration_hours: jwt.expiration_hours,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentProvider {
    Stripe,
    Disabled,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PaymentsSection {
    pub provider: PaymentProvider,
    pub stripe_secret_key: String,
    pub stripe_api_base: String,
    pub currency: String,
    /// Shared secret for webhook signatures
    pub webhook_secret: String,
    pub timeout_secs: u64,
}

impl Default for PaymentsSection {
    fn default() -> Self {
        Self {
            provider: PaymentProvider::Disabled,
            stripe_secret_key: String::new(),
            stripe_api_base: crate::infrastructure::payments::STRIPE_API_BASE.to_string(),
            currency: "usd".to_string(),
            webhook_secret: String::new(),
            timeout_secs: 10,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationProvider {
    Log,
    Webhook,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationsSection {
    pub provider: NotificationProvider,
    pub webhook_url: String,
    pub timeout_secs: u64,
    /// Base URL of the payment page linked from confirmations
    pub payment_link_base: String,
}

impl Default for NotificationsSection {
    fn default() -> Self {
        Self {
            provider: NotificationProvider::Log,
            webhook_url: String::new(),
            timeout_secs: 5,
            payment_link_base: LedgerSettings::default().payment_link_base,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReservationsSection {
    pub reference_length: usize,
    pub reference_max_attempts: u32,
    /// Attempts for storage operations that fail with a busy database
    pub storage_retry_attempts: u32,
}

impl Default for ReservationsSection {
    fn default() -> Self {
        let references = ReferenceCodeGenerator::default();
        Self {
            reference_length: references.length(),
            reference_max_attempts: references.max_attempts(),
            storage_retry_attempts: RetryConfig::default().max_attempts,
        }
    }
}

impl AppConfig {
    /// Load from `path`. A missing file is not an error and yields defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.reservations.reference_length < 6 {
            return Err(ConfigError::Invalid(
                "reservations.reference_length must be at least 6".into(),
            ));
        }
        if self.payments.provider == PaymentProvider::Stripe
            && self.payments.stripe_secret_key.is_empty()
        {
            return Err(ConfigError::Invalid(
                "payments.stripe_secret_key is required for the stripe provider".into(),
            ));
        }
        if self.notifications.provider == NotificationProvider::Webhook
            && self.notifications.webhook_url.is_empty()
        {
            return Err(ConfigError::Invalid(
                "notifications.webhook_url is required for the webhook provider".into(),
            ));
        }
        Ok(())
    }

    pub fn database_config(&self) -> DatabaseConfig {
        DatabaseConfig {
            url: self.database.url.clone(),
            max_connections: self.database.max_connections,
            connect_timeout_secs: self.database.connect_timeout_secs,
        }
    }

    pub fn jwt_config(&self) -> JwtConfig {
        JwtConfig {
            secret: self.security.jwt_secret.clone(),
            expiration_hours: self.security.jwt_expiration_hours,
            issuer: self.security.jwt_issuer.clone(),
        }
    }

    fn storage_retry(&self) -> RetryConfig {
        RetryConfig::with_attempts(self.reservations.storage_retry_attempts)
    }

    pub fn ledger_settings(&self) -> LedgerSettings {
        LedgerSettings {
            references: ReferenceCodeGenerator::new(
                self.reservations.reference_length,
                self.reservations.reference_max_attempts,
            ),
            retry: self.storage_retry(),
            payment_link_base: self.notifications.payment_link_base.clone(),
        }
    }

    pub fn reconciler_settings(&self) -> ReconcilerSettings {
        ReconcilerSettings {
            currency: self.payments.currency.to_lowercase(),
            gateway_timeout: Duration::from_secs(self.payments.timeout_secs),
            retry: self.storage_retry(),
        }
    }
}
