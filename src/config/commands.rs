//! Worker pool sizing configuration.

use std::time::Duration;

use serde::Deserialize;

/// Defaults applied to commands without a deployment override.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CommandsConfig {
    /// Fan-out for commands without an override (round-robin pool of this size).
    pub default_instances: usize,
    /// Bounded mailbox size of each worker.
    pub mailbox_capacity: usize,
    /// How long a dispatcher waits for a worker reply.
    pub ask_timeout_ms: u64,
}

impl Default for CommandsConfig {
    fn default() -> Self {
        Self {
            default_instances: 5,
            mailbox_capacity: 64,
            ask_timeout_ms: 30_000,
        }
    }
}

impl CommandsConfig {
    pub fn ask_timeout(&self) -> Duration {
        Duration::from_millis(self.ask_timeout_ms)
    }
}

/// Distribution policy of a worker pool.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RouterKind {
    /// Rotate through workers in order.
    #[default]
    RoundRobin,
    /// Pick a worker uniformly at random.
    Random,
    /// Pick the worker with the fewest queued requests.
    SmallestMailbox,
}

/// Deployment override for a single command.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PoolOverride {
    #[serde(default)]
    pub router: RouterKind,
    #[serde(default = "default_nr_of_instances")]
    pub nr_of_instances: usize,
}

fn default_nr_of_instances() -> usize {
    1
}
