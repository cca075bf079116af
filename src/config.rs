use crate::error::StoreError;
use figment::{
    Figment,
    providers::{Env, Serialized},
};
use serde::{Deserialize, Serialize};

/// Database file used when nothing else is configured, relative to the working directory.
pub const DEFAULT_DATABASE_URL: &str = "sqlite:database.sqlite";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreConfig {
    pub database_url: String,
    pub loglevel: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            loglevel: "info".to_string(),
        }
    }
}

impl StoreConfig {
    /// Defaults overlaid with `STORE_*` environment variables.
    pub fn figment() -> Figment {
        Figment::from(Serialized::defaults(StoreConfig::default())).merge(Env::prefixed("STORE_"))
    }

    /// Load `.env` (if any) and extract the config.
    pub fn from_env() -> Result<Self, StoreError> {
        dotenvy::dotenv().ok();
        Ok(Self::figment().extract()?)
    }

    pub fn with_database_url(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            ..Self::default()
        }
    }
}
