//! Session context management.
//!
//! An engine session is an opaque, expensive-to-construct handle bound to a
//! (manifest, function path, properties) triple. This module provides the
//! keyed memoization cache that guarantees at most one constructed handle
//! per distinct triple for the lifetime of the process, plus the manifest
//! transport encoding.
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────┐
//! │                   SessionContextCache                     │
//! │   SessionKey ──▶ OnceCell ──▶ Arc<SessionContext>         │
//! │   (per-key single flight, no eviction, retry on failure)  │
//! └───────────────────────────────────────────────────────────┘
//!                            │
//!                            ▼ create_session
//! ┌───────────────────────────────────────────────────────────┐
//! │              SessionBackend (capability trait)            │
//! │        EngineSessionBackend → engine sidecar RPC          │
//! └───────────────────────────────────────────────────────────┘
//! ```

mod cache;
mod context;
mod engine_backend;
mod key;
mod manifest;

use thiserror::Error;

use crate::engine::EngineError;

pub use cache::SessionContextCache;
pub use context::{SessionBackend, SessionContext};
pub use engine_backend::EngineSessionBackend;
pub use key::{PropertyValue, SessionKey};
pub use manifest::to_json_base64;

/// Result type for session operations.
pub type SessionResult<T> = Result<T, SessionError>;

/// Errors surfaced by session operations.
#[derive(Error, Debug)]
pub enum SessionError {
    /// The properties value cannot form a comparable, hashable key.
    /// Rejected before any construction attempt.
    #[error("session properties are not a flat map of scalar values: {0}")]
    MalformedProperties(String),

    /// The engine failed to construct a session for this key. The key stays
    /// unset in the cache; a later call retries construction.
    #[error("session construction failed: {0}")]
    Construction(#[source] EngineError),

    /// Manifest serialization failed.
    #[error("manifest serialization failed: {0}")]
    Json(#[from] serde_json::Error),
}
