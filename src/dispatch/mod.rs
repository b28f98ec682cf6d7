//! Command dispatch.
//!
//! [`CommandManager`] is the public entry point: it provisions pools, runs
//! commands locally through the registry, and forwards commands to peers.
//!
//! - `local`: registry lookup plus pool ask
//! - `remote`: provider gating, address resolution, peer execution

mod local;
mod remote;

use std::sync::Arc;

use serde::de::DeserializeOwned;

use crate::command::{CommandPayload, CommandResponse};
use crate::config::Config;
use crate::error::CommandError;
use crate::pool::PoolHandle;
use crate::provision::PoolProvisioner;
use crate::registry::CommandRegistry;
use crate::remote::{GrpcConnector, RegistryService, RemoteConnector, RemoteEndpoint};
use crate::worker::{Worker, WorkerSpec};

pub use local::LocalDispatcher;
pub use remote::RemoteDispatcher;

/// Registry, provisioner and both dispatchers behind one cloneable handle.
#[derive(Clone)]
pub struct CommandManager {
    registry: Arc<CommandRegistry>,
    provisioner: PoolProvisioner,
    local: LocalDispatcher,
    remote: Arc<RemoteDispatcher>,
    config: Arc<Config>,
}

impl CommandManager {
    /// Manager that reaches peers over gRPC.
    pub fn new(config: Config) -> Self {
        let connector = Arc::new(GrpcConnector::from_config(&config.remote));
        Self::with_connector(config, connector)
    }

    /// Manager with a custom remote transport.
    pub fn with_connector(config: Config, connector: Arc<dyn RemoteConnector>) -> Self {
        let config = Arc::new(config);
        let registry = Arc::new(CommandRegistry::new());

        Self {
            provisioner: PoolProvisioner::new(Arc::clone(&registry), Arc::clone(&config)),
            local: LocalDispatcher::new(Arc::clone(&registry)),
            remote: Arc::new(RemoteDispatcher::new(&config, connector)),
            registry,
            config,
        }
    }

    pub fn registry(&self) -> &Arc<CommandRegistry> {
        &self.registry
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Provision `name` from an explicit worker spec, replacing any pool
    /// already registered under it.
    pub async fn add_command_with_spec(&self, name: &str, spec: WorkerSpec) -> PoolHandle {
        self.provisioner.provision(name, spec).await
    }

    /// Provision `name` with workers built by `W::default()`.
    pub async fn add_command<W: Worker + Default>(&self, name: &str) -> PoolHandle {
        self.provisioner.provision_type::<W>(name).await
    }

    /// Drop the pool registered under `name`. Returns whether one existed.
    pub async fn remove_command(&self, name: &str) -> bool {
        self.registry.remove(name).await
    }

    /// Run `name` in this process.
    pub async fn execute<T: DeserializeOwned>(
        &self,
        name: &str,
        payload: Option<CommandPayload>,
    ) -> Result<CommandResponse<T>, CommandError> {
        self.local.execute(name, payload).await
    }

    /// Run `name` on the peer at `endpoint`. The local registry is not consulted.
    pub async fn execute_remote<T: DeserializeOwned>(
        &self,
        name: &str,
        endpoint: &RemoteEndpoint,
        payload: Option<CommandPayload>,
    ) -> Result<CommandResponse<T>, CommandError> {
        self.remote.execute(name, endpoint, payload).await
    }

    /// gRPC service exposing this manager's registry to peers.
    pub fn registry_service(&self) -> RegistryService {
        RegistryService::new(
            self.local.clone(),
            &self.config.remote.system,
            &self.config.remote.registry_path,
        )
    }
}
