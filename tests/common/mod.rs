//! Shared utilities for integration tests.
//!
//! Provides workers with observable behavior and helpers that start a peer
//! registry on an ephemeral localhost port.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use tokio::net::TcpListener;

use cmdhub::config::{Config, REMOTE_PROVIDER};
use cmdhub::remote::{spawn_server, ServerInfo};
use cmdhub::worker::WorkerReply;
use cmdhub::{CommandError, CommandManager, CommandResponse, ExecuteCommand, RemoteEndpoint, Worker, WorkerSpec};

/// Worker that always fails with a fixed source and message.
pub struct Failing;

#[async_trait]
impl Worker for Failing {
    async fn execute(&mut self, command: ExecuteCommand) -> WorkerReply {
        Err(CommandError::execution(
            format!("{}-worker", command.name),
            "disk full",
        ))
    }
}

/// Spec whose workers reply with their construction index.
pub fn numbered_spec() -> WorkerSpec {
    let next = Arc::new(AtomicUsize::new(0));
    WorkerSpec::new("numbered", move || Numbered(next.fetch_add(1, Ordering::SeqCst)))
}

pub struct Numbered(usize);

#[async_trait]
impl Worker for Numbered {
    async fn execute(&mut self, _command: ExecuteCommand) -> WorkerReply {
        Ok(CommandResponse::with_data(json!(self.0)))
    }
}

/// Config for a process allowed to dispatch remotely.
pub fn remote_client_config() -> Config {
    let mut config = Config::for_test();
    config.provider = REMOTE_PROVIDER.to_string();
    config.remote.resolve_timeout_ms = 2_000;
    config.remote.request_timeout_ms = 5_000;
    config
}

/// A peer process: its manager plus the registry server exposing it.
pub struct Peer {
    pub manager: CommandManager,
    pub server: ServerInfo,
}

impl Peer {
    pub fn endpoint(&self) -> RemoteEndpoint {
        RemoteEndpoint::new("127.0.0.1").with_port(self.server.addr.port())
    }
}

/// Start a peer registry on an ephemeral port.
pub async fn spawn_peer(config: Config) -> Peer {
    let manager = CommandManager::new(config);
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let server = spawn_server(listener, manager.registry_service()).unwrap();
    Peer { manager, server }
}

/// A localhost port with nothing listening on it.
pub fn unused_port() -> u16 {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap().port()
}
