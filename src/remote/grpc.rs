//! gRPC transport for remote registries.
//!
//! Resolution connects to the peer (reusing a cached channel when one exists)
//! and performs an `Identify` handshake against the configured registry path.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;
use tonic::transport::{Channel, Endpoint};
use tracing::{debug, info, warn};

use super::{status, RegistryAddress, RemoteConnector, RemoteRegistry};
use crate::command::{CommandResponse, ExecuteCommand};
use crate::config::RemoteConfig;
use crate::error::{CommandError, ResolveError};
use crate::proto::registry_client::RegistryClient;
use crate::proto::{ExecuteRequest, ExecuteResponse, IdentifyRequest};
use crate::worker::WorkerReply;

/// Resolves registry addresses over gRPC, caching one channel per peer.
pub struct GrpcConnector {
    channels: RwLock<HashMap<String, Channel>>,
    resolve_timeout: Duration,
    request_timeout: Duration,
}

impl GrpcConnector {
    pub fn new(resolve_timeout: Duration, request_timeout: Duration) -> Self {
        Self {
            channels: RwLock::new(HashMap::new()),
            resolve_timeout,
            request_timeout,
        }
    }

    pub fn from_config(config: &RemoteConfig) -> Self {
        Self::new(config.resolve_timeout(), config.request_timeout())
    }

    /// Get or create the channel to the peer behind `address`.
    async fn channel(&self, address: &RegistryAddress) -> Result<Channel, ResolveError> {
        let uri = address.grpc_uri();

        {
            let channels = self.channels.read().await;
            if let Some(channel) = channels.get(&uri) {
                debug!(address = %address, "Using cached connection");
                return Ok(channel.clone());
            }
        }

        let endpoint = Endpoint::from_shared(uri.clone())
            .map_err(|e| ResolveError::InvalidAddress {
                address: address.to_string(),
                message: e.to_string(),
            })?
            .connect_timeout(self.resolve_timeout);

        info!(address = %address, uri = %uri, "Creating new connection");

        let channel = tokio::time::timeout(self.resolve_timeout, endpoint.connect())
            .await
            .map_err(|_| ResolveError::Timeout {
                address: address.to_string(),
                timeout: self.resolve_timeout,
            })?
            .map_err(|e| ResolveError::ConnectionFailed {
                address: address.to_string(),
                message: connection_error_message(&e),
            })?;

        self.channels.write().await.insert(uri, channel.clone());
        Ok(channel)
    }

    async fn evict(&self, address: &RegistryAddress) {
        if self
            .channels
            .write()
            .await
            .remove(&address.grpc_uri())
            .is_some()
        {
            debug!(address = %address, "Removed stale connection");
        }
    }

    async fn identify(
        &self,
        client: &mut RegistryClient<Channel>,
        address: &RegistryAddress,
    ) -> Result<(), ResolveError> {
        let request = IdentifyRequest {
            path: address.path().to_string(),
        };

        let response = tokio::time::timeout(self.resolve_timeout, client.identify(request))
            .await
            .map_err(|_| ResolveError::Timeout {
                address: address.to_string(),
                timeout: self.resolve_timeout,
            })?
            .map_err(|status| ResolveError::Handshake {
                address: address.to_string(),
                message: status.message().to_string(),
            })?
            .into_inner();

        if !response.found {
            return Err(ResolveError::NotFound {
                address: address.to_string(),
            });
        }
        if response.system != address.system() {
            debug!(
                address = %address,
                peer_system = %response.system,
                "Peer registry reports a different system name"
            );
        }
        Ok(())
    }
}

#[async_trait]
impl RemoteConnector for GrpcConnector {
    async fn resolve(
        &self,
        address: &RegistryAddress,
    ) -> Result<Arc<dyn RemoteRegistry>, ResolveError> {
        let channel = self.channel(address).await?;
        let mut client = RegistryClient::new(channel);

        if let Err(e) = self.identify(&mut client, address).await {
            warn!(address = %address, error = %e, "Registry resolution failed");
            self.evict(address).await;
            return Err(e);
        }

        debug!(address = %address, "Resolved remote registry");
        Ok(Arc::new(GrpcRemoteRegistry {
            client,
            request_timeout: self.request_timeout,
        }))
    }
}

/// Live reference to a peer registry reached over gRPC.
pub struct GrpcRemoteRegistry {
    client: RegistryClient<Channel>,
    request_timeout: Duration,
}

#[async_trait]
impl RemoteRegistry for GrpcRemoteRegistry {
    async fn execute(&self, command: ExecuteCommand) -> WorkerReply {
        let name = command.name.clone();
        let payload_json = command
            .payload
            .map(|payload| serde_json::to_string(&payload))
            .transpose()
            .map_err(|e| CommandError::execution(&name, format!("Failed to encode payload: {e}")))?;

        let mut request = tonic::Request::new(ExecuteRequest {
            name: command.name,
            payload_json,
        });
        request.set_timeout(self.request_timeout);

        let mut client = self.client.clone();
        match tokio::time::timeout(self.request_timeout, client.execute(request)).await {
            Ok(Ok(response)) => response_from_proto(response.into_inner(), &name),
            Ok(Err(status)) => Err(status::from_status(&status, &name)),
            Err(_) => Err(CommandError::execution(
                &name,
                format!("Remote request timed out after {:?}", self.request_timeout),
            )),
        }
    }
}

/// Convert a wire response back into the untyped worker reply.
pub fn response_from_proto(response: ExecuteResponse, name: &str) -> WorkerReply {
    let data = response
        .data_json
        .map(|json| serde_json::from_str::<Value>(&json))
        .transpose()
        .map_err(|e| CommandError::execution(name, format!("Failed to decode response: {e}")))?;

    Ok(CommandResponse {
        data,
        response_type: response.response_type,
    })
}

/// Convert a worker reply into its wire form.
pub fn response_to_proto(response: CommandResponse<Value>) -> ExecuteResponse {
    ExecuteResponse {
        data_json: response.data.map(|data| data.to_string()),
        response_type: response.response_type,
    }
}

/// Include the underlying cause; tonic's top-level message alone is just
/// "transport error".
fn connection_error_message(err: &tonic::transport::Error) -> String {
    use std::error::Error;

    match err.source() {
        Some(source) => format!("{err}: {source}"),
        None => err.to_string(),
    }
}
