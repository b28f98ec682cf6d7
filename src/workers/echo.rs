//! Echo command: replies with the payload it was given.

use async_trait::async_trait;

use crate::command::{CommandPayload, CommandResponse, ExecuteCommand};
use crate::worker::{Worker, WorkerReply};

/// Replies with the request payload as a JSON object, or no data when the
/// request carried no payload.
#[derive(Debug, Default)]
pub struct EchoWorker;

#[async_trait]
impl Worker for EchoWorker {
    async fn execute(&mut self, command: ExecuteCommand) -> WorkerReply {
        Ok(CommandResponse::new(
            command.payload.map(CommandPayload::into_value),
        ))
    }
}
