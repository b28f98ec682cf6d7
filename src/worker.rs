//! Workers: the concrete executors behind a command name.
//!
//! Each worker runs on its own tokio task and owns a bounded mailbox.
//! Requests are processed one at a time; the reply travels back over a
//! oneshot channel so the dispatcher can correlate it with the request.

use std::any::Any;
use std::fmt;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use futures::FutureExt;
use serde_json::Value;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, warn};

use crate::command::{CommandResponse, ExecuteCommand};
use crate::error::CommandError;

/// Outcome of one command execution as produced by a worker.
pub type WorkerReply = Result<CommandResponse<Value>, CommandError>;

/// Command logic. Opaque to the registry and dispatchers.
#[async_trait]
pub trait Worker: Send + 'static {
    /// Execute a single request. Failures are forwarded to the caller unmodified.
    async fn execute(&mut self, command: ExecuteCommand) -> WorkerReply;
}

type WorkerFactory = dyn Fn() -> Box<dyn Worker> + Send + Sync;

/// Construction specification for the workers of one pool.
#[derive(Clone)]
pub struct WorkerSpec {
    kind: String,
    factory: Arc<WorkerFactory>,
}

impl WorkerSpec {
    /// Build workers with an explicit factory.
    pub fn new<F, W>(kind: impl Into<String>, factory: F) -> Self
    where
        F: Fn() -> W + Send + Sync + 'static,
        W: Worker,
    {
        Self {
            kind: kind.into(),
            factory: Arc::new(move || Box::new(factory()) as Box<dyn Worker>),
        }
    }

    /// Build workers from a type's default construction.
    pub fn of<W: Worker + Default>() -> Self {
        Self::new(std::any::type_name::<W>(), W::default)
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    fn build(&self) -> Box<dyn Worker> {
        (self.factory)()
    }
}

impl fmt::Debug for WorkerSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorkerSpec")
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}

struct Envelope {
    command: ExecuteCommand,
    reply: oneshot::Sender<WorkerReply>,
}

/// Mailbox address of one running worker.
#[derive(Clone)]
pub struct WorkerHandle {
    index: usize,
    mailbox: mpsc::Sender<Envelope>,
    in_flight: Arc<AtomicUsize>,
}

impl WorkerHandle {
    /// Spawn a worker from `spec` onto the current tokio runtime.
    ///
    /// The worker stops once every handle to its mailbox is dropped.
    pub fn spawn(command: &str, index: usize, spec: &WorkerSpec, mailbox_capacity: usize) -> Self {
        let (tx, rx) = mpsc::channel(mailbox_capacity.max(1));
        let in_flight = Arc::new(AtomicUsize::new(0));
        tokio::spawn(run_worker(
            spec.clone(),
            rx,
            Arc::clone(&in_flight),
            command.to_string(),
            index,
        ));
        Self {
            index,
            mailbox: tx,
            in_flight,
        }
    }

    /// Position of this worker within its pool.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Requests sent to this worker that it has not finished, including the
    /// one it is currently executing.
    pub fn pending(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Send one request and wait for the matching reply.
    pub async fn ask(&self, command: ExecuteCommand) -> WorkerReply {
        let name = command.name.clone();
        let (reply, response) = oneshot::channel();

        // Counted only once the slot is held; no await between here and send.
        let permit = self
            .mailbox
            .reserve()
            .await
            .map_err(|_| CommandError::execution(&name, "Worker mailbox closed"))?;
        self.in_flight.fetch_add(1, Ordering::SeqCst);
        permit.send(Envelope { command, reply });

        response
            .await
            .map_err(|_| CommandError::execution(&name, "Worker terminated before replying"))?
    }
}

impl fmt::Debug for WorkerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorkerHandle")
            .field("index", &self.index)
            .field("pending", &self.pending())
            .finish()
    }
}

/// Mailbox loop. A panicking request is answered with an execution failure
/// and the worker is rebuilt from its spec before the next request.
async fn run_worker(
    spec: WorkerSpec,
    mut mailbox: mpsc::Receiver<Envelope>,
    in_flight: Arc<AtomicUsize>,
    command: String,
    index: usize,
) {
    let mut worker = spec.build();

    while let Some(Envelope {
        command: request,
        reply,
    }) = mailbox.recv().await
    {
        let outcome = AssertUnwindSafe(worker.execute(request)).catch_unwind().await;
        let result = match outcome {
            Ok(result) => result,
            Err(panic) => {
                let reason = panic_message(panic.as_ref());
                warn!(command = %command, worker = index, reason = %reason, "Worker panicked, restarting");
                worker = spec.build();
                Err(CommandError::execution(
                    &command,
                    format!("Worker panicked: {reason}"),
                ))
            }
        };

        in_flight.fetch_sub(1, Ordering::SeqCst);
        if reply.send(result).is_err() {
            debug!(command = %command, worker = index, "Caller went away before reply");
        }
    }
    debug!(command = %command, worker = index, "Worker stopped");
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
