//! Configuration model loaded from external sources.

use std::env;

use config::{Config, Environment, File};
use serde::Deserialize;
use thiserror::Error;

/// Minimum length of the cookie signing secret.
pub const MIN_SECRET_LEN: usize = 64;

#[derive(Clone, Debug, Deserialize)]
/// Basic configuration shared across handlers.
pub struct ServerConfig {
    pub address: String,
    pub port: u16,
    pub templates_dir: String,
    pub secret: String,
    pub api: ApiConfig,
}

#[derive(Clone, Debug, Deserialize)]
/// Remote REST API the console manages.
pub struct ApiConfig {
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_per_page")]
    pub per_page: usize,
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_per_page() -> usize {
    crate::domain::paginator::DEFAULT_ITEMS_PER_PAGE
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("secret must be at least {MIN_SECRET_LEN} bytes")]
    ShortSecret,

    #[error("api.base_url must be an http(s) URL")]
    BaseUrl,
}

impl ApiConfig {
    /// Base URL without a trailing slash.
    pub fn base(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }
}

impl ServerConfig {
    /// Layers `config/default.yaml`, `config/{APP_ENV}.yaml` and `APP__*`
    /// environment variables, in that order.
    pub fn load(config_dir: &str) -> Result<Self, ConfigError> {
        let app_env = env::var("APP_ENV").unwrap_or_else(|_| "local".to_string());

        let settings = Config::builder()
            .add_source(File::with_name(&format!("{config_dir}/default")))
            .add_source(File::with_name(&format!("{config_dir}/{app_env}")).required(false))
            .add_source(Environment::with_prefix("APP").separator("__"))
            .build()?;

        let server_config: ServerConfig = settings.try_deserialize()?;
        server_config.validate()?;
        Ok(server_config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.secret.len() < MIN_SECRET_LEN {
            return Err(ConfigError::ShortSecret);
        }
        let base = self.api.base_url.trim();
        if !(base.starts_with("http://") || base.starts_with("https://")) {
            return Err(ConfigError::BaseUrl);
        }
        Ok(())
    }
}
