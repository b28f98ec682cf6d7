//! Application configuration.
//!
//! Aggregates configuration from all modules into a single Config struct
//! that can be loaded from YAML files or environment variables.

mod commands;
mod remote;

use std::collections::HashMap;

use serde::Deserialize;

pub use commands::{CommandsConfig, PoolOverride, RouterKind};
pub use remote::{RemoteConfig, DEFAULT_REGISTRY_PATH, DEFAULT_REMOTE_PORT, DEFAULT_SYSTEM_NAME};

/// Default configuration file name.
pub const DEFAULT_CONFIG_FILE: &str = "cmdhub.yaml";
/// Environment variable for configuration file path.
pub const CONFIG_ENV_VAR: &str = "CMDHUB_CONFIG";
/// Prefix for configuration environment variables.
pub const CONFIG_ENV_PREFIX: &str = "CMDHUB";
/// Environment variable for logging configuration.
pub const LOG_ENV_VAR: &str = "CMDHUB_LOG";

/// Namespace under which per-command deployment overrides live.
pub const COMMANDS_PATH: &str = "/commands";

/// Provider value for a process that only dispatches locally.
pub const LOCAL_PROVIDER: &str = "local";
/// Provider value that enables remote dispatch (see `RemoteConfig::enabled_provider`).
pub const REMOTE_PROVIDER: &str = "remote";

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] ::config::ConfigError),

    #[error("{key} must be a positive integer, got {value}")]
    NotPositive { key: String, value: usize },

    #[error("{key} must be an absolute path, got {value:?}")]
    InvalidPath { key: String, value: String },
}

/// Main application configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Actor provider; remote dispatch requires `remote.enabled_provider`.
    pub provider: String,
    /// Pool sizing defaults.
    pub commands: CommandsConfig,
    /// Per-command overrides keyed by deployment path (`/commands/<name>`).
    pub deployment: HashMap<String, PoolOverride>,
    /// Remote dispatch and registry server settings.
    pub remote: RemoteConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            provider: LOCAL_PROVIDER.to_string(),
            commands: CommandsConfig::default(),
            deployment: HashMap::new(),
            remote: RemoteConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from file and environment.
    ///
    /// Configuration sources (in order of priority, later overrides earlier):
    /// 1. `cmdhub.yaml` in current directory (if exists)
    /// 2. File specified by `path` argument (if provided)
    /// 3. File specified by `CONFIG_ENV_VAR` environment variable (if set)
    /// 4. Environment variables with `CONFIG_ENV_PREFIX` prefix
    ///
    /// The result is validated before it is returned.
    pub fn load(path: Option<&str>) -> Result<Self, ConfigError> {
        use ::config::{Config as ConfigLib, Environment, File, FileFormat};

        let mut builder = ConfigLib::builder()
            .add_source(File::new(DEFAULT_CONFIG_FILE, FileFormat::Yaml).required(false));

        if let Some(config_path) = path {
            builder = builder.add_source(File::new(config_path, FileFormat::Yaml).required(true));
        }

        if let Ok(config_path) = std::env::var(CONFIG_ENV_VAR) {
            builder = builder.add_source(File::new(&config_path, FileFormat::Yaml).required(true));
        }

        let config = builder
            .add_source(
                Environment::with_prefix(CONFIG_ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: Config = config.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Create config for testing.
    pub fn for_test() -> Self {
        Self::default()
    }

    /// Reject fan-out counts and paths the provisioner cannot honor.
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("commands.default_instances", self.commands.default_instances)?;
        positive("commands.mailbox_capacity", self.commands.mailbox_capacity)?;

        for (path, pool) in &self.deployment {
            positive(&format!("deployment.{path}.nr_of_instances"), pool.nr_of_instances)?;
        }

        if !self.remote.registry_path.starts_with('/') {
            return Err(ConfigError::InvalidPath {
                key: "remote.registry_path".to_string(),
                value: self.remote.registry_path.clone(),
            });
        }
        Ok(())
    }

    /// Whether this process may dispatch commands to remote peers.
    pub fn remote_enabled(&self) -> bool {
        self.provider == self.remote.enabled_provider
    }

    /// Deployment override for a command, if one is configured.
    ///
    /// Keys loaded from files arrive lowercased, so an exact match is tried
    /// first and then a case-insensitive one.
    pub fn deployment_override(&self, name: &str) -> Option<&PoolOverride> {
        let path = deployment_path(name);
        self.deployment.get(&path).or_else(|| {
            self.deployment
                .iter()
                .find(|(key, _)| key.eq_ignore_ascii_case(&path))
                .map(|(_, pool)| pool)
        })
    }
}

/// Deployment path for a command name (`/commands/<name>`).
pub fn deployment_path(name: &str) -> String {
    format!("{COMMANDS_PATH}/{name}")
}

fn positive(key: &str, value: usize) -> Result<(), ConfigError> {
    if value == 0 {
        return Err(ConfigError::NotPositive {
            key: key.to_string(),
            value,
        });
    }
    Ok(())
}
