//! Layered configuration: defaults, then an optional `trivia.{toml,yaml,json}`
//! file, then `TRIVIA_*` environment variables (a `.env` file is loaded first).

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, Environment, File};
use serde::Deserialize;

use crate::pagination::DEFAULT_PAGE_SIZE;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub database_url: String,
    pub bind_address: String,
    pub page_size: u32,
}

impl Settings {
    pub fn builder() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        Config::builder()
            .set_default("database_url", "sqlite:trivia.db?mode=rwc")?
            .set_default("bind_address", "0.0.0.0:8080")?
            .set_default("page_size", i64::from(DEFAULT_PAGE_SIZE))
    }

    pub fn load() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Self::builder()?
            .add_source(File::with_name("trivia").required(false))
            .add_source(Environment::with_prefix("TRIVIA").try_parsing(true))
            .build()
            .and_then(Self::from_config)
    }

    pub fn from_config(config: Config) -> Result<Self, ConfigError> {
        let settings: Self = config.try_deserialize()?;
        if settings.page_size == 0 {
            return Err(ConfigError::Message("page_size must be positive".to_owned()));
        }
        Ok(settings)
    }
}
