//! Gateway configuration
//!
//! Loaded from `BAMBORA_*` environment variables, with a `.env` file picked
//! up for local development.
//!
//! * `BAMBORA_MERCHANT_ID` - merchant account id (required)
//! * `BAMBORA_PAYMENTS_API_KEY` - passcode for payment calls (required)
//! * `BAMBORA_PROFILES_API_KEY` - passcode for profile calls (on-site checkout)
//! * `BAMBORA_HASH_KEY` - redirect signing key (off-site checkout)
//! * `BAMBORA_API_BASE_URL` - default `https://api.na.bambora.com/v1`
//! * `BAMBORA_REDIRECT_URL` - hosted payment page
//! * `BAMBORA_TIMEOUT_SECS` - per-request timeout (default: 30)
//! * `BAMBORA_LOG_LEVEL` - trace, debug, info, warn, error (default: info)

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Deserializer};
use thiserror::Error;
use validator::Validate;

use gateway_client::{BamboraGateway, MerchantCredentials, DEFAULT_API_BASE_URL};

use crate::redirect::{RedirectRequestBuilder, DEFAULT_REDIRECT_URL};

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("Invalid configuration: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Missing required setting: {0}")]
    Missing(&'static str),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Gateway configuration
#[derive(Debug, Deserialize, Validate)]
pub struct GatewayConfig {
    #[validate(length(min = 1))]
    pub merchant_id: String,
    #[serde(deserialize_with = "secret")]
    pub payments_api_key: SecretString,
    #[serde(default, deserialize_with = "optional_secret")]
    pub profiles_api_key: Option<SecretString>,
    #[serde(default, deserialize_with = "optional_secret")]
    pub hash_key: Option<SecretString>,
    #[serde(default = "default_api_base_url")]
    #[validate(url)]
    pub api_base_url: String,
    #[serde(default = "default_redirect_url")]
    #[validate(url)]
    pub redirect_url: String,
    #[serde(default = "default_timeout_secs")]
    #[validate(range(min = 1, max = 300))]
    pub timeout_secs: u64,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_api_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}

fn default_redirect_url() -> String {
    DEFAULT_REDIRECT_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_log_level() -> String {
    "info".to_string()
}

fn secret<'de, D: Deserializer<'de>>(deserializer: D) -> Result<SecretString, D::Error> {
    String::deserialize(deserializer).map(|value| SecretString::new(value.into()))
}

fn optional_secret<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<SecretString>, D::Error> {
    Option::<String>::deserialize(deserializer)
        .map(|value| value.map(|value| SecretString::new(value.into())))
}

fn is_blank(secret: Option<&SecretString>) -> bool {
    secret.map_or(true, |secret| secret.expose_secret().trim().is_empty())
}

impl GatewayConfig {
    /// Loads configuration from the environment
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::load(config::Environment::with_prefix("BAMBORA"))
    }

    /// Loads configuration from any `config` source
    pub fn load<S>(source: S) -> Result<Self, ConfigError>
    where
        S: config::Source + Send + Sync + 'static,
    {
        let config: Self = config::Config::builder()
            .add_source(source)
            .build()?
            .try_deserialize()?;
        config.validate()?;
        if config.payments_api_key.expose_secret().trim().is_empty() {
            return Err(ConfigError::Missing("payments_api_key"));
        }
        Ok(config)
    }

    /// Checks the settings the on-site (tokenized) checkout needs
    pub fn require_onsite(&self) -> Result<(), ConfigError> {
        if is_blank(self.profiles_api_key.as_ref()) {
            return Err(ConfigError::Missing("profiles_api_key"));
        }
        Ok(())
    }

    /// Checks the settings the off-site (redirect) checkout needs
    pub fn require_offsite(&self) -> Result<(), ConfigError> {
        if is_blank(self.hash_key.as_ref()) {
            return Err(ConfigError::Missing("hash_key"));
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Returns the merchant credentials for gateway construction
    pub fn credentials(&self) -> MerchantCredentials {
        MerchantCredentials::new(
            self.merchant_id.clone(),
            self.payments_api_key.expose_secret(),
            self.profiles_api_key
                .as_ref()
                .map(|key| key.expose_secret())
                .unwrap_or_default(),
        )
    }

    /// Builds the HTTP gateway client
    pub fn gateway(&self) -> Result<BamboraGateway, ConfigError> {
        BamboraGateway::new(self.credentials(), &self.api_base_url, self.timeout())
            .map_err(|e| ConfigError::Invalid(e.to_string()))
    }

    /// Builds the off-site redirect builder
    pub fn redirect_builder(&self) -> Result<RedirectRequestBuilder, ConfigError> {
        let hash_key = self
            .hash_key
            .as_ref()
            .filter(|key| !key.expose_secret().trim().is_empty())
            .ok_or(ConfigError::Missing("hash_key"))?;
        Ok(RedirectRequestBuilder::new(
            self.merchant_id.clone(),
            hash_key.expose_secret(),
            self.redirect_url.clone(),
        ))
    }
}
