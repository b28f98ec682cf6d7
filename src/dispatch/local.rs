//! Local (in-process) dispatch through the command registry.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use tracing::debug;

use crate::command::{CommandPayload, CommandResponse, ExecuteCommand};
use crate::error::CommandError;
use crate::registry::CommandRegistry;
use crate::worker::WorkerReply;

/// Resolves a name in the registry and forwards the request to its pool.
///
/// One attempt per call; failures are never retried here.
#[derive(Clone)]
pub struct LocalDispatcher {
    registry: Arc<CommandRegistry>,
}

impl LocalDispatcher {
    pub fn new(registry: Arc<CommandRegistry>) -> Self {
        Self { registry }
    }

    /// Execute and return the untyped worker reply.
    ///
    /// Exposed for callers that forward replies without decoding them.
    pub async fn execute_raw(&self, command: ExecuteCommand) -> WorkerReply {
        let Some(pool) = self.registry.lookup(&command.name).await else {
            debug!(command = %command.name, "Command not found");
            return Err(CommandError::NotFound { name: command.name });
        };
        pool.ask(command).await
    }

    /// Execute `name` and decode the reply into `T`.
    pub async fn execute<T: DeserializeOwned>(
        &self,
        name: &str,
        payload: Option<CommandPayload>,
    ) -> Result<CommandResponse<T>, CommandError> {
        self.execute_raw(ExecuteCommand::new(name, payload))
            .await?
            .decode(name)
    }
}
