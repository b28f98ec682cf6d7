//! Command registry - thread-safe mapping from command name to worker pool.

use std::collections::HashMap;

use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::pool::PoolHandle;

/// Name-to-pool mapping for one process.
///
/// Registration overwrites (last write wins). A completed write is visible to
/// every lookup issued after it.
#[derive(Default)]
pub struct CommandRegistry {
    pools: RwLock<HashMap<String, PoolHandle>>,
}

impl CommandRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the pool registered under `name`.
    pub async fn register(&self, name: impl Into<String>, handle: PoolHandle) {
        let name = name.into();
        info!(
            command = %name,
            pool = %handle.id(),
            workers = handle.size(),
            router = ?handle.router_kind(),
            "Registering command"
        );

        let previous = self.pools.write().await.insert(name.clone(), handle);
        if let Some(previous) = previous {
            debug!(command = %name, replaced = %previous.id(), "Replaced existing pool");
        }
    }

    /// Get the pool registered under `name`.
    pub async fn lookup(&self, name: &str) -> Option<PoolHandle> {
        self.pools.read().await.get(name).cloned()
    }

    /// Remove the pool registered under `name`. Returns whether one existed.
    pub async fn remove(&self, name: &str) -> bool {
        let removed = self.pools.write().await.remove(name);
        match removed {
            Some(handle) => {
                info!(command = %name, pool = %handle.id(), "Removed command");
                true
            }
            None => false,
        }
    }

    /// Check if a command is registered.
    pub async fn contains(&self, name: &str) -> bool {
        self.pools.read().await.contains_key(name)
    }

    /// Get all registered command names, sorted.
    pub async fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.pools.read().await.keys().cloned().collect();
        names.sort();
        names
    }

    /// Get the number of registered commands.
    pub async fn len(&self) -> usize {
        self.pools.read().await.len()
    }

    /// Check if the registry is empty.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
