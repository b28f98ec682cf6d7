//! Remote dispatch: resolve a peer's registry, then execute there.

use std::sync::Arc;
use std::time::Duration;

use backon::Retryable;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::command::{CommandPayload, CommandResponse, ExecuteCommand};
use crate::config::{Config, RemoteConfig};
use crate::error::{CommandError, ResolveError};
use crate::remote::{RegistryAddress, RemoteConnector, RemoteEndpoint, RemoteRegistry};
use crate::utils::retry::resolve_backoff;
use crate::worker::WorkerReply;

/// Sends commands to the registry of another process.
///
/// Only available when the configured provider matches
/// `remote.enabled_provider`; otherwise every call fails with
/// [`CommandError::RemoteDisabled`] before any resolution is attempted.
pub struct RemoteDispatcher {
    remote: RemoteConfig,
    enabled: bool,
    connector: Arc<dyn RemoteConnector>,
}

impl RemoteDispatcher {
    pub fn new(config: &Config, connector: Arc<dyn RemoteConnector>) -> Self {
        Self {
            remote: config.remote.clone(),
            enabled: config.remote_enabled(),
            connector,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Execute on the peer at `endpoint` and return the untyped reply.
    ///
    /// Failures reported by the peer are returned as the peer produced them.
    pub async fn execute_raw(&self, command: ExecuteCommand, endpoint: &RemoteEndpoint) -> WorkerReply {
        if !self.enabled {
            return Err(CommandError::RemoteDisabled {
                provider: self.remote.enabled_provider.clone(),
            });
        }

        let address = RegistryAddress::for_endpoint(&self.remote, endpoint);
        let registry = match self.resolve(&address).await {
            Ok(registry) => registry,
            Err(cause) => {
                warn!(address = %address, error = %cause, "Remote registry unresolvable");
                return Err(CommandError::RemoteUnresolvable {
                    server: endpoint.server.clone(),
                    port: endpoint.port,
                    cause,
                });
            }
        };

        debug!(address = %address, command = %command.name, "Dispatching to remote registry");
        registry.execute(command).await
    }

    /// Execute `name` on the peer at `endpoint` and decode the reply into `T`.
    pub async fn execute<T: DeserializeOwned>(
        &self,
        name: &str,
        endpoint: &RemoteEndpoint,
        payload: Option<CommandPayload>,
    ) -> Result<CommandResponse<T>, CommandError> {
        self.execute_raw(ExecuteCommand::new(name, payload), endpoint)
            .await?
            .decode(name)
    }

    async fn resolve(
        &self,
        address: &RegistryAddress,
    ) -> Result<Arc<dyn RemoteRegistry>, ResolveError> {
        if self.remote.resolve_retries == 0 {
            return self.connector.resolve(address).await;
        }

        (|| self.connector.resolve(address))
            .retry(resolve_backoff(self.remote.resolve_retries))
            .notify(|err: &ResolveError, dur: Duration| {
                warn!(address = %address, error = %err, delay = ?dur, "Resolution failed, retrying");
            })
            .await
    }
}
