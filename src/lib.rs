//! cmdhub - named command registry and dispatch
//!
//! Commands are registered under unique names, each backed by a pool of
//! concurrent workers. Requests run locally through the registry or are
//! forwarded to the registry of a peer process over gRPC.

pub mod command;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod pool;
pub mod proto;
pub mod provision;
pub mod registry;
pub mod remote;
pub mod utils;
pub mod worker;
pub mod workers;

#[cfg(test)]
mod test_utils;

pub use command::{CommandPayload, CommandResponse, ExecuteCommand};
pub use config::Config;
pub use dispatch::CommandManager;
pub use error::{CommandError, ResolveError};
pub use remote::RemoteEndpoint;
pub use worker::{Worker, WorkerSpec};
