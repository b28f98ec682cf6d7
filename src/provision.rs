//! Pool provisioning: decides fan-out for a new command, spawns its workers,
//! and records the pool in the registry.

use std::sync::Arc;

use tracing::debug;

use crate::config::{deployment_path, Config};
use crate::pool::{router_for, PoolHandle, PoolSettings, RoundRobin, WorkerPool};
use crate::registry::CommandRegistry;
use crate::worker::{Worker, WorkerSpec};

/// Creates worker pools and registers them.
#[derive(Clone)]
pub struct PoolProvisioner {
    registry: Arc<CommandRegistry>,
    config: Arc<Config>,
}

impl PoolProvisioner {
    pub fn new(registry: Arc<CommandRegistry>, config: Arc<Config>) -> Self {
        Self { registry, config }
    }

    /// Provision a pool for `name` from an explicit worker spec.
    ///
    /// A deployment override at `/commands/<name>` decides size and routing;
    /// otherwise the pool is a round-robin pool of `commands.default_instances`.
    /// The pool is registered before this returns.
    pub async fn provision(&self, name: &str, spec: WorkerSpec) -> PoolHandle {
        let settings = PoolSettings {
            mailbox_capacity: self.config.commands.mailbox_capacity,
            ask_timeout: self.config.commands.ask_timeout(),
        };

        let pool = match self.config.deployment_override(name) {
            Some(deployment) => {
                debug!(
                    command = %name,
                    path = %deployment_path(name),
                    router = ?deployment.router,
                    instances = deployment.nr_of_instances,
                    "Provisioning from deployment override"
                );
                WorkerPool::spawn(
                    name,
                    &spec,
                    deployment.nr_of_instances,
                    router_for(deployment.router),
                    settings,
                )
            }
            None => {
                let instances = self.config.commands.default_instances;
                debug!(
                    command = %name,
                    worker = %spec.kind(),
                    instances,
                    "Provisioning default round-robin pool"
                );
                WorkerPool::spawn(
                    name,
                    &spec,
                    instances,
                    Box::new(RoundRobin::default()),
                    settings,
                )
            }
        };

        let handle = Arc::new(pool);
        self.registry.register(name, Arc::clone(&handle)).await;
        handle
    }

    /// Provision a pool whose workers are built with `W::default()`.
    pub async fn provision_type<W: Worker + Default>(&self, name: &str) -> PoolHandle {
        self.provision(name, WorkerSpec::of::<W>()).await
    }
}
