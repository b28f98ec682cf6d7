//! Error taxonomy for command dispatch.
//!
//! Every dispatch failure surfaces as a [`CommandError`]. Each variant answers
//! the same three questions: which command or subsystem failed (`source_name`),
//! what went wrong (`message`), and what underlying error caused it (`cause`).

use std::time::Duration;

/// Source name used for failures raised by the dispatcher itself rather
/// than by a command.
pub const MANAGER_SOURCE: &str = "CommandManager";

/// Message attached to lookups of unregistered commands.
pub const NOT_FOUND_MESSAGE: &str = "Command not found";

/// Failure of a single command dispatch.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CommandError {
    /// No pool is registered under the requested name.
    #[error("{name}: Command not found")]
    NotFound { name: String },

    /// Remote dispatch attempted while the process is not remote-enabled.
    #[error("CommandManager: Remote provider {provider} is not enabled")]
    RemoteDisabled { provider: String },

    /// The peer registry could not be resolved.
    #[error("CommandManager: Failed to find remote system [{server}:{port}]")]
    RemoteUnresolvable {
        server: String,
        port: u16,
        #[source]
        cause: ResolveError,
    },

    /// The worker reported a failure, or its reply never arrived.
    #[error("{source_name}: {message}")]
    Execution {
        source_name: String,
        message: String,
    },
}

impl CommandError {
    /// Failure reported while executing a command.
    pub fn execution(source_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Execution {
            source_name: source_name.into(),
            message: message.into(),
        }
    }

    /// Name of the failing command or subsystem.
    pub fn source_name(&self) -> &str {
        match self {
            Self::NotFound { name } => name,
            Self::RemoteDisabled { .. } | Self::RemoteUnresolvable { .. } => MANAGER_SOURCE,
            Self::Execution { source_name, .. } => source_name,
        }
    }

    /// Human-readable failure description, without the source prefix.
    pub fn message(&self) -> String {
        match self {
            Self::NotFound { .. } => NOT_FOUND_MESSAGE.to_string(),
            Self::RemoteDisabled { provider } => {
                format!("Remote provider {provider} is not enabled")
            }
            Self::RemoteUnresolvable { server, port, .. } => {
                format!("Failed to find remote system [{server}:{port}]")
            }
            Self::Execution { message, .. } => message.clone(),
        }
    }

    /// Underlying resolution error, if any.
    pub fn cause(&self) -> Option<&ResolveError> {
        match self {
            Self::RemoteUnresolvable { cause, .. } => Some(cause),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Failure to resolve a live reference to a peer's registry.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ResolveError {
    #[error("invalid registry address {address}: {message}")]
    InvalidAddress { address: String, message: String },

    #[error("connection to {address} failed: {message}")]
    ConnectionFailed { address: String, message: String },

    #[error("timed out resolving {address} after {timeout:?}")]
    Timeout { address: String, timeout: Duration },

    #[error("identify handshake with {address} failed: {message}")]
    Handshake { address: String, message: String },

    #[error("no registry found at {address}")]
    NotFound { address: String },
}
