// src/settings.rs
//! Runtime settings for the credential trust engine.
//!
//! Values come from, in increasing precedence:
//! 1. Built-in defaults
//! 2. An optional settings file (`metablox.toml`, `metablox.yaml`, ...)
//! 3. Environment variables prefixed `METABLOX_` (a `.env` file is honoured)
//!
//! ## Environment Variables
//! - `METABLOX_CREDENTIAL_ID_BASE`: prefix of issued credential ids
//! - `METABLOX_ISSUANCE_VALIDITY_YEARS`: validity of a fresh credential
//! - `METABLOX_RENEWAL_VALIDITY_MONTHS`: extension applied per renewal
//! - `METABLOX_ALLOW_EXPIRED_RENEWAL`: whether expired credentials may be renewed
//! - `METABLOX_NONCE_TTL_SECS`: lifetime of an unconsumed nonce

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Issued credential ids are this prefix followed by the allocated number
    pub credential_id_base: String,

    pub issuance_validity_years: u32,

    /// Renewal extends the current expiration by this many calendar months
    pub renewal_validity_months: u32,

    /// When false, renewing an already expired credential fails
    pub allow_expired_renewal: bool,

    pub nonce_ttl_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            credential_id_base: "http://metablox.com/credentials/".to_string(),
            issuance_validity_years: 10,
            renewal_validity_months: 12,
            allow_expired_renewal: true,
            nonce_ttl_secs: 300,
        }
    }
}

impl Settings {
    /// Loads settings from `metablox.*` and the environment.
    pub fn load() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Self::load_from(Some("metablox"))
    }

    /// Loads settings from an optional file (extension inferred) and the environment.
    pub fn load_from(file: Option<&str>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();
        if let Some(name) = file {
            builder = builder.add_source(File::with_name(name).required(false));
        }
        let settings: Settings = builder
            .add_source(Environment::with_prefix("METABLOX").try_parsing(true))
            .build()?
            .try_deserialize()?;
        log::debug!("loaded settings: {:?}", settings);
        Ok(settings)
    }

    pub fn nonce_ttl(&self) -> Duration {
        Duration::from_secs(self.nonce_ttl_secs)
    }
}
