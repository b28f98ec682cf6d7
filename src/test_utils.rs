//! Test utilities and mock implementations.
//!
//! Workers and connectors that record what happened to them, for tests that
//! need to observe routing or resolution without a real peer.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;

use crate::command::{CommandResponse, ExecuteCommand};
use crate::error::{CommandError, ResolveError};
use crate::remote::{RegistryAddress, RemoteConnector, RemoteRegistry};
use crate::worker::{Worker, WorkerReply, WorkerSpec};

/// Worker that replies with its own id and logs every call.
pub struct RecordingWorker {
    id: usize,
    calls: Arc<Mutex<Vec<usize>>>,
}

#[async_trait]
impl Worker for RecordingWorker {
    async fn execute(&mut self, _command: ExecuteCommand) -> WorkerReply {
        self.calls.lock().unwrap().push(self.id);
        Ok(CommandResponse::with_data(json!({ "worker": self.id })))
    }
}

/// Spec for recording workers, numbered in construction order, plus the
/// shared log of which worker served each call.
pub fn recording_spec() -> (WorkerSpec, Arc<Mutex<Vec<usize>>>) {
    let calls = Arc::new(Mutex::new(Vec::new()));
    let next_id = Arc::new(AtomicUsize::new(0));
    let log = Arc::clone(&calls);
    let spec = WorkerSpec::new("recording", move || RecordingWorker {
        id: next_id.fetch_add(1, Ordering::SeqCst),
        calls: Arc::clone(&log),
    });
    (spec, calls)
}

/// Worker that takes longer than any sane ask timeout.
pub struct Sleeper(pub Duration);

#[async_trait]
impl Worker for Sleeper {
    async fn execute(&mut self, _command: ExecuteCommand) -> WorkerReply {
        tokio::time::sleep(self.0).await;
        Ok(CommandResponse::empty())
    }
}

/// Worker that always rejects with a fixed source and message.
pub struct Rejecting {
    pub source: &'static str,
    pub message: &'static str,
}

#[async_trait]
impl Worker for Rejecting {
    async fn execute(&mut self, _command: ExecuteCommand) -> WorkerReply {
        Err(CommandError::execution(self.source, self.message))
    }
}

/// Worker that panics when the payload carries a `crash` key.
#[derive(Default)]
pub struct Crashing;

#[async_trait]
impl Worker for Crashing {
    async fn execute(&mut self, command: ExecuteCommand) -> WorkerReply {
        if command.payload.as_ref().is_some_and(|p| p.get("crash").is_some()) {
            panic!("crash requested");
        }
        Ok(CommandResponse::empty())
    }
}

/// Connector that counts resolution attempts and never finds a peer.
#[derive(Default)]
pub struct CountingConnector {
    attempts: AtomicUsize,
}

impl CountingConnector {
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RemoteConnector for CountingConnector {
    async fn resolve(
        &self,
        address: &RegistryAddress,
    ) -> Result<Arc<dyn RemoteRegistry>, ResolveError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(ResolveError::NotFound {
            address: address.to_string(),
        })
    }
}

/// Connector that resolves every address to an in-memory peer which echoes
/// the command name back.
#[derive(Default)]
pub struct LoopbackConnector {
    pub resolved: Mutex<Vec<String>>,
}

struct LoopbackRegistry;

#[async_trait]
impl RemoteRegistry for LoopbackRegistry {
    async fn execute(&self, command: ExecuteCommand) -> WorkerReply {
        if command.name == "missing" {
            return Err(CommandError::NotFound { name: command.name });
        }
        Ok(CommandResponse::with_data(json!({ "ran": command.name })))
    }
}

#[async_trait]
impl RemoteConnector for LoopbackConnector {
    async fn resolve(
        &self,
        address: &RegistryAddress,
    ) -> Result<Arc<dyn RemoteRegistry>, ResolveError> {
        self.resolved.lock().unwrap().push(address.to_string());
        Ok(Arc::new(LoopbackRegistry))
    }
}
