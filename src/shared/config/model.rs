use config::builder::DefaultState;
use config::{ConfigBuilder, ConfigError};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub logging: LoggingConfig,
    pub merge: MergeConfig,
}

#[derive(Debug, Deserialize)]
pub struct LoggingConfig {
    pub log_dir: String,
    pub stdout_level: String,
    pub file_level: String,
}

#[derive(Debug, Deserialize)]
pub struct MergeConfig {
    /// Dialect assumed when a statement does not carry one
    pub default_dialect: String,
    /// Max rows the in-memory sort stage may buffer (unset = unbounded)
    #[serde(default)]
    pub sort_buffer_limit: Option<usize>,
}

use std::env;

/// Environment variable naming the config file (extension optional).
pub const CONFIG_PATH_ENV: &str = "SHARD_MERGE_CONFIG";

pub(crate) fn builder_with_defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    config::Config::builder()
        .set_default("logging.log_dir", "logs")?
        .set_default("logging.stdout_level", "info")?
        .set_default("logging.file_level", "debug")?
        .set_default("merge.default_dialect", "mysql")
}

pub fn load_settings() -> Result<Settings, ConfigError> {
    let config_path = env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| "config".to_string());

    let settings: Settings = builder_with_defaults()?
        .add_source(config::File::with_name(&config_path).required(false))
        .build()?
        .try_deserialize()?;

    Ok(settings)
}
