//! Session handle and constructor capability.

use std::collections::BTreeMap;

use async_trait::async_trait;

use super::key::{PropertyValue, SessionKey};
use crate::engine::EngineResult;

/// An opaque engine session handle.
///
/// Constructed lazily on the first request for a key and owned by the
/// cache for the rest of the process; callers hold shared references.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionContext {
    session_id: String,
    manifest: Option<String>,
    function_path: String,
    properties: Option<BTreeMap<String, PropertyValue>>,
}

impl SessionContext {
    /// Create a handle for an engine-side session.
    pub fn new(session_id: impl Into<String>, key: &SessionKey) -> Self {
        Self {
            session_id: session_id.into(),
            manifest: key.manifest.clone(),
            function_path: key.function_path.clone(),
            properties: key.properties.clone(),
        }
    }

    /// Engine-side identifier of this session.
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// The manifest payload this session was built from, if any.
    pub fn manifest(&self) -> Option<&str> {
        self.manifest.as_deref()
    }

    /// The function-resolution path this session was built with.
    pub fn function_path(&self) -> &str {
        &self.function_path
    }

    /// The normalized properties this session was built with.
    pub fn properties(&self) -> Option<&BTreeMap<String, PropertyValue>> {
        self.properties.as_ref()
    }
}

/// Capability for constructing engine sessions.
///
/// Construction is potentially expensive and I/O-bearing; the cache drives
/// this trait at most once per key (until a failure, which is not cached).
#[async_trait]
pub trait SessionBackend: Send + Sync {
    /// Construct a new session for the given key.
    async fn create_session(&self, key: &SessionKey) -> EngineResult<SessionContext>;
}
