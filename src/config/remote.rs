//! Remote dispatch and registry server configuration.

use std::time::Duration;

use serde::Deserialize;

/// Port peers listen on when none is given.
pub const DEFAULT_REMOTE_PORT: u16 = 2552;
/// System name used in registry addresses.
pub const DEFAULT_SYSTEM_NAME: &str = "registry";
/// Path of the command registry within a peer.
pub const DEFAULT_REGISTRY_PATH: &str = "/user/commands";

/// Remote dispatch configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    /// `Config::provider` must equal this for remote dispatch to be allowed.
    pub enabled_provider: String,
    /// System name in `tcp://{system}@{host}:{port}{registry_path}`.
    pub system: String,
    /// Registry path served by this process and expected on peers.
    pub registry_path: String,
    /// Host the registry server binds to.
    pub host: String,
    /// Port the registry server binds to.
    pub port: u16,
    /// Upper bound on connecting to and identifying a peer registry.
    pub resolve_timeout_ms: u64,
    /// Upper bound on a single remote execution.
    pub request_timeout_ms: u64,
    /// Extra resolution attempts after the first failure (0 = no retry).
    pub resolve_retries: usize,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            enabled_provider: super::REMOTE_PROVIDER.to_string(),
            system: DEFAULT_SYSTEM_NAME.to_string(),
            registry_path: DEFAULT_REGISTRY_PATH.to_string(),
            host: "0.0.0.0".to_string(),
            port: DEFAULT_REMOTE_PORT,
            resolve_timeout_ms: 5_000,
            request_timeout_ms: 30_000,
            resolve_retries: 0,
        }
    }
}

impl RemoteConfig {
    /// Get the socket address string the registry server binds to.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn resolve_timeout(&self) -> Duration {
        Duration::from_millis(self.resolve_timeout_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}
