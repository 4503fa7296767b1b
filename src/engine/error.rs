//! Engine-sidecar error types.

use std::io;
use thiserror::Error;

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Errors that can occur while talking to the engine sidecar.
#[derive(Error, Debug)]
pub enum EngineError {
    /// Failed to spawn the engine sidecar process.
    #[error("failed to spawn engine process: {0}")]
    SpawnFailed(#[source] io::Error),

    /// Failed to write to engine stdin.
    #[error("failed to write to engine: {0}")]
    WriteFailed(#[source] io::Error),

    /// Failed to read from engine stdout.
    #[error("failed to read from engine: {0}")]
    ReadFailed(#[source] io::Error),

    /// Failed to serialize request to JSON.
    #[error("failed to serialize request: {0}")]
    SerializeFailed(#[source] serde_json::Error),

    /// Failed to deserialize response from JSON.
    #[error("failed to deserialize response: {0}")]
    DeserializeFailed(#[source] serde_json::Error),

    /// Request timed out waiting for response.
    #[error("request timed out after {0} seconds")]
    Timeout(u64),

    /// Engine process exited unexpectedly.
    #[error("engine process exited unexpectedly")]
    EngineExited,

    /// Response channel was closed (internal error).
    #[error("response channel closed unexpectedly")]
    ChannelClosed,

    /// Engine returned an error response.
    #[error("engine error: {message} (code: {code})")]
    Remote {
        /// Error code from the engine.
        code: String,
        /// Error message from the engine.
        message: String,
    },

    /// The source database is unreachable or rejected authentication.
    #[error("source connection failed: {0}")]
    ConnectionFailed(String),

    /// The source rejected the submitted query.
    #[error("query rejected by source: {0}")]
    QueryRejected(String),

    /// Invalid request parameters.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Method not found.
    #[error("method not found: {0}")]
    MethodNotFound(String),
}

impl EngineError {
    /// Create a remote error from an error response.
    pub fn remote(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Remote {
            code: code.into(),
            message: message.into(),
        }
    }

    /// Check if this error indicates the engine has exited.
    pub fn is_engine_exited(&self) -> bool {
        matches!(self, Self::EngineExited | Self::ChannelClosed)
    }

    /// Check if this error is a transport/connectivity failure rather than a
    /// rejection of the request itself.
    pub fn is_connectivity(&self) -> bool {
        matches!(
            self,
            Self::SpawnFailed(_)
                | Self::WriteFailed(_)
                | Self::ReadFailed(_)
                | Self::Timeout(_)
                | Self::EngineExited
                | Self::ChannelClosed
                | Self::ConnectionFailed(_)
        )
    }
}

impl From<io::Error> for EngineError {
    fn from(err: io::Error) -> Self {
        Self::WriteFailed(err)
    }
}

impl From<serde_json::Error> for EngineError {
    fn from(err: serde_json::Error) -> Self {
        Self::DeserializeFailed(err)
    }
}

impl From<tokio::sync::oneshot::error::RecvError> for EngineError {
    fn from(_: tokio::sync::oneshot::error::RecvError) -> Self {
        Self::ChannelClosed
    }
}
