//! Keyed memoization of engine session handles.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::OnceCell;

use super::context::{SessionBackend, SessionContext};
use super::key::SessionKey;
use super::{SessionError, SessionResult};

/// Memoizing factory for engine session handles.
///
/// One cache instance lives for the whole process. Each distinct
/// [`SessionKey`] gets at most one constructed [`SessionContext`]; repeated
/// calls with equal keys return the same `Arc` (identity, not just value
/// equality). The table never evicts: handle identity across calls is part
/// of the contract, so the map grows with the number of distinct keys seen.
///
/// Concurrency: concurrent first-time callers of one key are collapsed into
/// a single backend invocation; the rest wait and share the result. Keys
/// are independent and never serialize against each other. A caller that
/// drops its future mid-construction hands initialization to the next
/// waiting caller, so shared construction survives any single abandonment.
///
/// A failed construction is not cached. The key's slot stays unset, the
/// error goes to the caller(s) of that attempt, and a later call retries.
pub struct SessionContextCache {
    backend: Arc<dyn SessionBackend>,
    sessions: DashMap<SessionKey, Arc<OnceCell<Arc<SessionContext>>>>,
}

impl SessionContextCache {
    /// Create a cache over a session-constructing backend.
    pub fn new(backend: Arc<dyn SessionBackend>) -> Self {
        Self {
            backend,
            sessions: DashMap::new(),
        }
    }

    /// Return the session for (manifest, function path, properties),
    /// constructing it on first use.
    ///
    /// `properties` is an opaque JSON value; it must be a flat object of
    /// scalars or absent, otherwise the call is rejected with
    /// [`SessionError::MalformedProperties`] before the backend is
    /// consulted.
    pub async fn get_or_create(
        &self,
        manifest: Option<&str>,
        function_path: &str,
        properties: Option<&serde_json::Value>,
    ) -> SessionResult<Arc<SessionContext>> {
        let key = SessionKey::new(manifest, function_path, properties)?;
        self.get_or_create_key(key).await
    }

    /// Like [`get_or_create`](Self::get_or_create) with a pre-built key.
    pub async fn get_or_create_key(&self, key: SessionKey) -> SessionResult<Arc<SessionContext>> {
        // Clone the cell out of the map guard before awaiting anything:
        // the shard lock must not be held across construction.
        let cell = self.sessions.entry(key.clone()).or_default().clone();

        let context = cell
            .get_or_try_init(|| async {
                self.backend
                    .create_session(&key)
                    .await
                    .map(Arc::new)
                    .map_err(SessionError::Construction)
            })
            .await?;

        Ok(Arc::clone(context))
    }

    /// Return the already-constructed session for a key, if any.
    pub fn get(&self, key: &SessionKey) -> Option<Arc<SessionContext>> {
        self.sessions
            .get(key)
            .and_then(|cell| cell.get().cloned())
    }

    /// Number of keys tracked (constructed or with construction in flight).
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use crate::engine::{EngineError, EngineResult};

    struct CountingBackend {
        created: AtomicUsize,
        fail_remaining: AtomicUsize,
    }

    impl CountingBackend {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                created: AtomicUsize::new(0),
                fail_remaining: AtomicUsize::new(0),
            })
        }

        fn failing_first(n: usize) -> Arc<Self> {
            Arc::new(Self {
                created: AtomicUsize::new(0),
                fail_remaining: AtomicUsize::new(n),
            })
        }
    }

    #[async_trait]
    impl SessionBackend for CountingBackend {
        async fn create_session(&self, key: &SessionKey) -> EngineResult<SessionContext> {
            if self
                .fail_remaining
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_ok()
            {
                return Err(EngineError::remote("SESSION_FAILED", "constructor down"));
            }

            let n = self.created.fetch_add(1, Ordering::SeqCst);
            Ok(SessionContext::new(format!("session-{}", n), key))
        }
    }

    #[tokio::test]
    async fn test_equal_keys_share_one_handle() {
        let backend = CountingBackend::new();
        let cache = SessionContextCache::new(backend.clone());

        let first = cache.get_or_create(Some("M1"), "fp", None).await.unwrap();
        let second = cache.get_or_create(Some("M1"), "fp", None).await.unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(backend.created.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_distinct_keys_get_distinct_handles() {
        let backend = CountingBackend::new();
        let cache = SessionContextCache::new(backend.clone());

        let plain = cache.get_or_create(Some("M1"), "fp", None).await.unwrap();
        let with_properties = cache
            .get_or_create(Some("M1"), "fp", Some(&serde_json::json!({"x": 1})))
            .await
            .unwrap();

        assert!(!Arc::ptr_eq(&plain, &with_properties));
        assert_eq!(backend.created.load(Ordering::SeqCst), 2);
        assert_eq!(cache.len(), 2);
    }

    #[tokio::test]
    async fn test_failure_is_not_cached() {
        let backend = CountingBackend::failing_first(1);
        let cache = SessionContextCache::new(backend.clone());

        let err = cache.get_or_create(Some("M1"), "fp", None).await.unwrap_err();
        assert!(matches!(err, SessionError::Construction(_)));

        let key = SessionKey::new(Some("M1"), "fp", None).unwrap();
        assert!(cache.get(&key).is_none());

        // Retry succeeds and the handle is now cached.
        let handle = cache.get_or_create(Some("M1"), "fp", None).await.unwrap();
        assert_eq!(backend.created.load(Ordering::SeqCst), 1);
        assert!(Arc::ptr_eq(&handle, &cache.get(&key).unwrap()));
    }

    #[tokio::test]
    async fn test_malformed_properties_never_reach_backend() {
        let backend = CountingBackend::new();
        let cache = SessionContextCache::new(backend.clone());

        let err = cache
            .get_or_create(None, "fp", Some(&serde_json::json!([1, 2])))
            .await
            .unwrap_err();

        assert!(matches!(err, SessionError::MalformedProperties(_)));
        assert_eq!(backend.created.load(Ordering::SeqCst), 0);
        assert!(cache.is_empty());
    }
}
