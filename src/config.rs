use crate::error::ConfigError;
use crate::model::Account;
use anyhow::{anyhow, Context, Result};
use serde_derive::Deserialize;
use std::str::FromStr;
use std::time::Duration;

fn default_log_level() -> String {
    "info".to_string()
}

#[derive(Deserialize, Debug)]
pub struct AppConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl AppConfig {
    pub fn log_level(&self) -> tracing::Level {
        tracing::Level::from_str(self.log_level.as_str()).unwrap_or(tracing::Level::INFO)
    }
}

pub(crate) fn load_app_config() -> Result<AppConfig> {
    match envy::from_env::<AppConfig>() {
        Ok(config) => Ok(config),
        Err(err) => Err(anyhow!("Failed to load AppConfig: {}", err)),
    }
}

fn default_days() -> u32 {
    7
}

fn default_interval_sec() -> u64 {
    3 * 60 * 60
}

fn default_concurrency() -> usize {
    1
}

fn default_run_timeout_sec() -> u64 {
    300
}

#[derive(Deserialize, Debug)]
pub struct CollectorConfig {
    // how many past days to fetch per run, today excluded
    #[serde(default = "default_days")]
    pub days: u32,
    #[serde(default = "default_interval_sec")]
    pub interval_sec: u64,
    // per-day usage requests in flight at once
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    #[serde(default = "default_run_timeout_sec")]
    pub run_timeout_sec: u64,
    #[serde(default)]
    pub oneshot: bool,
}

impl CollectorConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.days == 0 {
            return Err(ConfigError::invalid("COLLECTOR_DAYS", "must be at least 1"));
        }
        if self.concurrency == 0 {
            return Err(ConfigError::invalid(
                "COLLECTOR_CONCURRENCY",
                "must be at least 1",
            ));
        }
        if self.run_timeout_sec == 0 {
            return Err(ConfigError::invalid(
                "COLLECTOR_RUN_TIMEOUT_SEC",
                "must be at least 1",
            ));
        }
        Ok(())
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_sec)
    }

    pub fn run_timeout(&self) -> Duration {
        Duration::from_secs(self.run_timeout_sec)
    }
}

pub fn load_collector_config() -> Result<CollectorConfig> {
    let config = envy::prefixed("COLLECTOR_")
        .from_env::<CollectorConfig>()
        .map_err(ConfigError::env_parse)
        .context("Failed to load CollectorConfig")?;
    config.validate().context("Failed to load CollectorConfig")?;
    Ok(config)
}

fn default_url() -> String {
    "https://portal.acwd.org/portal/".to_string()
}

fn default_request_timeout_sec() -> u64 {
    30
}

#[derive(Deserialize, Debug)]
pub struct AcwdConfig {
    #[serde(default = "default_url")]
    pub url: String,
    pub username: String,
    pub password: String,
    #[serde(default = "default_request_timeout_sec")]
    pub request_timeout_sec: u64,
}

impl AcwdConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.request_timeout_sec == 0 {
            return Err(ConfigError::invalid(
                "ACWD_REQUEST_TIMEOUT_SEC",
                "must be at least 1",
            ));
        }
        Ok(())
    }

    pub fn account(&self) -> Account {
        Account::new(self.username.clone(), self.password.clone())
    }
}

pub(crate) fn load_acwd_config() -> Result<AcwdConfig> {
    let config = envy::prefixed("ACWD_")
        .from_env::<AcwdConfig>()
        .map_err(ConfigError::env_parse)
        .context("Failed to load AcwdConfig")?;
    config.validate().context("Failed to load AcwdConfig")?;
    Ok(config)
}
