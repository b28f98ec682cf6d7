//! Worker pools: a set of workers behind one command name plus the policy
//! that picks which worker serves each request.

pub mod routing;

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tracing::debug;
use uuid::Uuid;

use crate::command::ExecuteCommand;
use crate::config::RouterKind;
use crate::error::CommandError;
use crate::worker::{WorkerHandle, WorkerReply, WorkerSpec};

pub use routing::{router_for, RandomRouter, RoundRobin, SmallestMailbox};

/// Prefix of the failure message for replies that miss the ask timeout.
pub const ASK_TIMEOUT_MESSAGE: &str = "Ask timed out";

/// Shared reference to a provisioned pool.
pub type PoolHandle = Arc<WorkerPool>;

/// Load-distribution policy of a pool.
pub trait Router: Send + Sync + fmt::Debug {
    /// Choose the worker for the next request. `workers` is never empty.
    fn next_worker<'a>(&self, workers: &'a [WorkerHandle]) -> &'a WorkerHandle;

    fn kind(&self) -> RouterKind;
}

/// Per-pool settings that are not part of the routing decision.
#[derive(Debug, Clone, Copy)]
pub struct PoolSettings {
    pub mailbox_capacity: usize,
    pub ask_timeout: Duration,
}

/// A running pool of workers for one command.
pub struct WorkerPool {
    id: Uuid,
    command: String,
    workers: Vec<WorkerHandle>,
    router: Box<dyn Router>,
    ask_timeout: Duration,
}

impl WorkerPool {
    /// Spawn `instances` workers from `spec` (at least one).
    pub fn spawn(
        command: &str,
        spec: &WorkerSpec,
        instances: usize,
        router: Box<dyn Router>,
        settings: PoolSettings,
    ) -> Self {
        let workers = (0..instances.max(1))
            .map(|index| WorkerHandle::spawn(command, index, spec, settings.mailbox_capacity))
            .collect();

        Self {
            id: Uuid::new_v4(),
            command: command.to_string(),
            workers,
            router,
            ask_timeout: settings.ask_timeout,
        }
    }

    /// Identity of this pool, stable for its lifetime.
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    pub fn size(&self) -> usize {
        self.workers.len()
    }

    pub fn router_kind(&self) -> RouterKind {
        self.router.kind()
    }

    pub fn workers(&self) -> &[WorkerHandle] {
        &self.workers
    }

    pub fn next_worker(&self) -> &WorkerHandle {
        self.router.next_worker(&self.workers)
    }

    /// Route one request to a worker and await its reply.
    ///
    /// A reply that does not arrive within the ask timeout is an execution
    /// failure; the worker still finishes the request and the reply is dropped.
    pub async fn ask(&self, command: ExecuteCommand) -> WorkerReply {
        let worker = self.next_worker();
        let name = command.name.clone();

        debug!(
            command = %name,
            pool = %self.id,
            worker = worker.index(),
            "Forwarding command to worker"
        );

        match tokio::time::timeout(self.ask_timeout, worker.ask(command)).await {
            Ok(reply) => reply,
            Err(_) => Err(CommandError::execution(
                name,
                format!("{ASK_TIMEOUT_MESSAGE} after {:?}", self.ask_timeout),
            )),
        }
    }
}

impl fmt::Debug for WorkerPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorkerPool")
            .field("id", &self.id)
            .field("command", &self.command)
            .field("size", &self.workers.len())
            .field("router", &self.router)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::CommandResponse;
    use crate::command::CommandPayload;
    use crate::test_utils::{recording_spec, Crashing, Sleeper};
    use serde_json::json;

    fn settings(ask_timeout: Duration) -> PoolSettings {
        PoolSettings {
            mailbox_capacity: 16,
            ask_timeout,
        }
    }

    #[tokio::test]
    async fn test_pool_spawns_requested_instances() {
        let (spec, _) = recording_spec();
        let pool = WorkerPool::spawn(
            "report",
            &spec,
            4,
            Box::new(RoundRobin::default()),
            settings(Duration::from_secs(5)),
        );

        assert_eq!(pool.size(), 4);
        assert_eq!(pool.command(), "report");
        assert_eq!(pool.router_kind(), RouterKind::RoundRobin);
    }

    #[tokio::test]
    async fn test_pool_never_empty() {
        let (spec, _) = recording_spec();
        let pool = WorkerPool::spawn(
            "report",
            &spec,
            0,
            Box::new(RoundRobin::default()),
            settings(Duration::from_secs(5)),
        );
        assert_eq!(pool.size(), 1);
    }

    #[tokio::test]
    async fn test_ask_returns_worker_reply() {
        let (spec, _) = recording_spec();
        let pool = WorkerPool::spawn(
            "report",
            &spec,
            1,
            Box::new(RoundRobin::default()),
            settings(Duration::from_secs(5)),
        );

        let reply = pool
            .ask(ExecuteCommand::new("report", None))
            .await
            .unwrap();
        assert_eq!(reply, CommandResponse::with_data(json!({"worker": 0})));
    }

    #[tokio::test]
    async fn test_ask_times_out_as_execution_failure() {
        let spec = WorkerSpec::new("sleeper", || Sleeper(Duration::from_secs(5)));
        let pool = WorkerPool::spawn(
            "slow",
            &spec,
            1,
            Box::new(RoundRobin::default()),
            settings(Duration::from_millis(50)),
        );

        let err = pool.ask(ExecuteCommand::new("slow", None)).await.unwrap_err();
        assert_eq!(err.source_name(), "slow");
        assert!(err.message().contains("timed out"));
    }

    #[tokio::test]
    async fn test_panic_does_not_disable_pool() {
        let pool = WorkerPool::spawn(
            "fragile",
            &WorkerSpec::of::<Crashing>(),
            3,
            Box::new(SmallestMailbox),
            settings(Duration::from_secs(5)),
        );

        let crash = CommandPayload::new().with("crash", true);
        let err = pool
            .ask(ExecuteCommand::new("fragile", Some(crash)))
            .await
            .unwrap_err();
        assert!(err.message().starts_with("Worker panicked"));

        for _ in 0..10 {
            pool.ask(ExecuteCommand::new("fragile", None)).await.unwrap();
        }
    }
}
