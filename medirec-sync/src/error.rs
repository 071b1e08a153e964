//! Error type for individual sync steps.

use medirec_network::NetworkError;
use medirec_storage::StorageError;
use thiserror::Error;

/// What went wrong inside one step of a cycle. These never escape the
/// engine; each is converted into an error record on the cycle report.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The server call failed.
    #[error("network error: {0}")]
    Network(#[from] NetworkError),

    /// The local store rejected a write.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// The server answered with something other than the expected shape.
    #[error("unexpected response: {0}")]
    UnexpectedResponse(String),
}
