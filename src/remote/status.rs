//! Translation between `CommandError` and `tonic::Status`.
//!
//! The failing source name travels as UTF-8 in the binary `x-command-source-bin`
//! metadata entry so a peer's failure reaches the caller with its source intact.

use tonic::metadata::MetadataValue;
use tonic::{Code, Status};

use crate::error::CommandError;
use crate::pool::ASK_TIMEOUT_MESSAGE;

/// Binary metadata key carrying `CommandError::source_name`.
pub const SOURCE_METADATA_KEY: &str = "x-command-source-bin";

/// Encode a dispatch failure for the wire.
pub fn to_status(err: &CommandError) -> Status {
    let code = match err {
        CommandError::NotFound { .. } => Code::NotFound,
        CommandError::RemoteDisabled { .. } => Code::FailedPrecondition,
        CommandError::RemoteUnresolvable { .. } => Code::Unavailable,
        CommandError::Execution { message, .. } if message.starts_with(ASK_TIMEOUT_MESSAGE) => {
            Code::DeadlineExceeded
        }
        CommandError::Execution { .. } => Code::Internal,
    };

    let mut status = Status::new(code, err.message());
    status.metadata_mut().insert_bin(
        SOURCE_METADATA_KEY,
        MetadataValue::from_bytes(err.source_name().as_bytes()),
    );
    status
}

/// Decode a failure returned by a peer while executing `name`.
///
/// `NotFound` keeps its kind; every other status is an execution failure,
/// including transport statuses raised before the peer answered.
pub fn from_status(status: &Status, name: &str) -> CommandError {
    let source = status
        .metadata()
        .get_bin(SOURCE_METADATA_KEY)
        .and_then(|value| value.to_bytes().ok())
        .and_then(|bytes| String::from_utf8(bytes.to_vec()).ok())
        .unwrap_or_else(|| name.to_string());

    match status.code() {
        Code::NotFound => CommandError::NotFound { name: source },
        _ => CommandError::execution(source, status.message()),
    }
}
