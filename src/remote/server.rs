//! Registry server: exposes the local registry to peers over gRPC.

use std::net::SocketAddr;

use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio_stream::wrappers::TcpListenerStream;
use tonic::transport::Server;
use tonic::{Request, Response, Status};
use tracing::{debug, error, info};

use super::grpc::response_to_proto;
use super::status::to_status;
use crate::command::{CommandPayload, ExecuteCommand};
use crate::dispatch::LocalDispatcher;
use crate::proto::registry_server::{Registry, RegistryServer};
use crate::proto::{ExecuteRequest, ExecuteResponse, IdentifyRequest, IdentifyResponse};

/// gRPC `Registry` implementation backed by local dispatch.
pub struct RegistryService {
    dispatcher: LocalDispatcher,
    system: String,
    registry_path: String,
}

impl RegistryService {
    pub fn new(
        dispatcher: LocalDispatcher,
        system: impl Into<String>,
        registry_path: impl Into<String>,
    ) -> Self {
        Self {
            dispatcher,
            system: system.into(),
            registry_path: registry_path.into(),
        }
    }

    /// Wrap into the tonic service for `Server::add_service`.
    pub fn into_server(self) -> RegistryServer<Self> {
        RegistryServer::new(self)
    }
}

#[tonic::async_trait]
impl Registry for RegistryService {
    async fn identify(
        &self,
        request: Request<IdentifyRequest>,
    ) -> Result<Response<IdentifyResponse>, Status> {
        let path = request.into_inner().path;
        let found = path == self.registry_path;
        debug!(path = %path, found, "Identify");

        Ok(Response::new(IdentifyResponse {
            found,
            system: self.system.clone(),
        }))
    }

    async fn execute(
        &self,
        request: Request<ExecuteRequest>,
    ) -> Result<Response<ExecuteResponse>, Status> {
        let request = request.into_inner();
        let payload = request
            .payload_json
            .map(|json| serde_json::from_str::<CommandPayload>(&json))
            .transpose()
            .map_err(|e| Status::invalid_argument(format!("Invalid payload: {e}")))?;

        debug!(command = %request.name, "Executing command for remote caller");

        self.dispatcher
            .execute_raw(ExecuteCommand::new(request.name, payload))
            .await
            .map(|response| Response::new(response_to_proto(response)))
            .map_err(|e| to_status(&e))
    }
}

/// Serve `service` on `addr` until the server fails.
pub async fn serve(addr: SocketAddr, service: RegistryService) -> Result<(), tonic::transport::Error> {
    info!(addr = %addr, path = %service.registry_path, "Registry listening on TCP");
    Server::builder()
        .add_service(service.into_server())
        .serve(addr)
        .await
}

/// Handle to a server started by [`spawn_server`].
pub struct ServerInfo {
    /// The address the server is listening on.
    pub addr: SocketAddr,
    /// Shutdown signal sender.
    shutdown_tx: oneshot::Sender<()>,
}

impl ServerInfo {
    /// Signal the server to shut down.
    pub fn shutdown(self) {
        let _ = self.shutdown_tx.send(());
    }
}

/// Serve `service` on an already-bound listener in the background.
pub fn spawn_server(listener: TcpListener, service: RegistryService) -> std::io::Result<ServerInfo> {
    let addr = listener.local_addr()?;
    let (shutdown_tx, shutdown_rx) = oneshot::channel();
    let incoming = TcpListenerStream::new(listener);

    info!(addr = %addr, path = %service.registry_path, "Registry listening on TCP");

    let router = Server::builder().add_service(service.into_server());
    tokio::spawn(async move {
        let server = router.serve_with_incoming_shutdown(incoming, async {
            let _ = shutdown_rx.await;
        });
        if let Err(e) = server.await {
            error!(error = %e, "Registry server error");
        }
    });

    Ok(ServerInfo { addr, shutdown_tx })
}
