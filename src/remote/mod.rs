//! Remote registries: addressing and the transport collaborator seam.
//!
//! - `grpc`: client stub reaching a peer registry over gRPC
//! - `server`: exposes the local registry to peers over gRPC
//! - `status`: translation between `CommandError` and `tonic::Status`

pub mod grpc;
pub mod server;
pub mod status;

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

use crate::command::ExecuteCommand;
use crate::config::{RemoteConfig, DEFAULT_REMOTE_PORT};
use crate::error::ResolveError;
use crate::worker::WorkerReply;

pub use grpc::GrpcConnector;
pub use server::{serve, spawn_server, RegistryService, ServerInfo};

/// Host and port of a peer process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteEndpoint {
    pub server: String,
    pub port: u16,
}

impl RemoteEndpoint {
    /// Endpoint on the default remote port.
    pub fn new(server: impl Into<String>) -> Self {
        Self {
            server: server.into(),
            port: DEFAULT_REMOTE_PORT,
        }
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }
}

/// Canonical address of a peer's command registry.
///
/// Displays as `tcp://{system}@{server}:{port}{path}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RegistryAddress {
    system: String,
    server: String,
    port: u16,
    path: String,
}

impl RegistryAddress {
    pub fn new(
        system: impl Into<String>,
        endpoint: &RemoteEndpoint,
        path: impl Into<String>,
    ) -> Self {
        Self {
            system: system.into(),
            server: endpoint.server.clone(),
            port: endpoint.port,
            path: path.into(),
        }
    }

    /// Address of the registry at `endpoint` as configured in `remote`.
    pub fn for_endpoint(remote: &RemoteConfig, endpoint: &RemoteEndpoint) -> Self {
        Self::new(&remote.system, endpoint, &remote.registry_path)
    }

    pub fn system(&self) -> &str {
        &self.system
    }

    pub fn server(&self) -> &str {
        &self.server
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// URI the gRPC transport connects to.
    pub fn grpc_uri(&self) -> String {
        format!("http://{}:{}", self.server, self.port)
    }
}

impl fmt::Display for RegistryAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "tcp://{}@{}:{}{}",
            self.system, self.server, self.port, self.path
        )
    }
}

/// Resolves registry addresses to live references.
#[async_trait]
pub trait RemoteConnector: Send + Sync {
    /// Resolve exactly one live reference to the registry at `address`.
    async fn resolve(
        &self,
        address: &RegistryAddress,
    ) -> Result<Arc<dyn RemoteRegistry>, ResolveError>;
}

/// Live reference to a peer's registry.
#[async_trait]
pub trait RemoteRegistry: Send + Sync {
    /// Execute a command on the peer with the peer's local dispatch semantics.
    async fn execute(&self, command: ExecuteCommand) -> WorkerReply;
}
