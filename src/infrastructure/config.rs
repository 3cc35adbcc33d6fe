use crate::application::polling_service::{PollingConfig, StaleResponsePolicy};
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, Environment, File, FileFormat};
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub prediction: PredictionSettings,
    pub polling: PollingSettings,
    pub storage: StorageSettings,
    pub notifications: NotificationSettings,
    pub server: ServerSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PredictionSettings {
    pub base_url: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PollingSettings {
    pub interval_secs: u64,
    pub discard_stale_responses: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageSettings {
    pub data_dir: PathBuf,
    pub settings_file: PathBuf,
}

#[derive(Debug, Deserialize, Clone)]
pub struct NotificationSettings {
    pub authorized: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    pub bind: SocketAddr,
}

impl PredictionSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl PollingSettings {
    pub fn to_polling_config(&self) -> PollingConfig {
        PollingConfig {
            interval: Duration::from_secs(self.interval_secs),
            stale_policy: if self.discard_stale_responses {
                StaleResponsePolicy::DiscardStale
            } else {
                StaleResponsePolicy::LastCompletedWins
            },
        }
    }
}

fn with_defaults() -> anyhow::Result<ConfigBuilder<DefaultState>> {
    Ok(Config::builder()
        .set_default("prediction.base_url", "http://localhost:5001")?
        .set_default("prediction.timeout_secs", 10)?
        .set_default("polling.interval_secs", 900)?
        .set_default("polling.discard_stale_responses", false)?
        .set_default("storage.data_dir", "data")?
        .set_default("storage.settings_file", "data/settings.toml")?
        .set_default("notifications.authorized", true)?
        .set_default("server.bind", "127.0.0.1:8080")?)
}

fn finish(builder: ConfigBuilder<DefaultState>) -> anyhow::Result<AppConfig> {
    let config: AppConfig = builder.build()?.try_deserialize()?;
    if config.polling.interval_secs == 0 {
        anyhow::bail!("polling.interval_secs must be greater than zero");
    }
    if config.prediction.timeout_secs == 0 {
        anyhow::bail!("prediction.timeout_secs must be greater than zero");
    }
    Ok(config)
}

/// Defaults, then `config/fatigue.toml` if present, then `FATIGUE__*` variables.
pub fn load_app_config() -> anyhow::Result<AppConfig> {
    finish(
        with_defaults()?
            .add_source(File::with_name("config/fatigue").required(false))
            .add_source(
                Environment::with_prefix("FATIGUE")
                    .separator("__")
                    .try_parsing(true),
            ),
    )
}

/// Defaults overlaid with a TOML document.
pub fn app_config_from_toml(toml: &str) -> anyhow::Result<AppConfig> {
    finish(with_defaults()?.add_source(File::from_str(toml, FileFormat::Toml)))
}
