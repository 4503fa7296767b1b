//! Integration tests for the session context cache.
//!
//! The backend is mocked at the SessionBackend seam so the tests can count
//! constructor invocations and inject failures.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;
use tokio::sync::Barrier;

use gantry::engine::{EngineError, EngineResult};
use gantry::session::{SessionBackend, SessionContext, SessionContextCache, SessionError, SessionKey};

/// Backend that counts constructions, optionally failing the first few and
/// sleeping inside construction to widen the concurrency window.
struct CountingBackend {
    created: AtomicUsize,
    fail_remaining: AtomicUsize,
    delay: Option<Duration>,
}

impl CountingBackend {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            created: AtomicUsize::new(0),
            fail_remaining: AtomicUsize::new(0),
            delay: None,
        })
    }

    fn slow(delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            created: AtomicUsize::new(0),
            fail_remaining: AtomicUsize::new(0),
            delay: Some(delay),
        })
    }

    fn failing_first(n: usize) -> Arc<Self> {
        Arc::new(Self {
            created: AtomicUsize::new(0),
            fail_remaining: AtomicUsize::new(n),
            delay: None,
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

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let n = self.created.fetch_add(1, Ordering::SeqCst);
        Ok(SessionContext::new(format!("session-{}", n), key))
    }
}

#[tokio::test]
async fn test_repeated_calls_return_identical_handle() {
    let backend = CountingBackend::new();
    let cache = SessionContextCache::new(backend.clone());

    let first = cache.get_or_create(Some("M1"), "fp", None).await.unwrap();
    let second = cache.get_or_create(Some("M1"), "fp", None).await.unwrap();

    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(first.session_id(), second.session_id());
    assert_eq!(backend.created.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_properties_distinguish_keys() {
    let backend = CountingBackend::new();
    let cache = SessionContextCache::new(backend.clone());

    let plain = cache.get_or_create(Some("M1"), "fp", None).await.unwrap();
    let with_properties = cache
        .get_or_create(Some("M1"), "fp", Some(&json!({"x": 1})))
        .await
        .unwrap();

    assert!(!Arc::ptr_eq(&plain, &with_properties));
    assert_eq!(backend.created.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_property_order_does_not_split_keys() {
    let backend = CountingBackend::new();
    let cache = SessionContextCache::new(backend.clone());

    let a = cache
        .get_or_create(None, "fp", Some(&json!({"a": 1, "b": "x"})))
        .await
        .unwrap();
    let b = cache
        .get_or_create(None, "fp", Some(&json!({"b": "x", "a": 1})))
        .await
        .unwrap();

    assert!(Arc::ptr_eq(&a, &b));
    assert_eq!(backend.created.load(Ordering::SeqCst), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_first_calls_construct_exactly_once() {
    let backend = CountingBackend::slow(Duration::from_millis(50));
    let cache = Arc::new(SessionContextCache::new(backend.clone()));

    let callers = 16;
    let barrier = Arc::new(Barrier::new(callers));

    let mut handles = Vec::new();
    for _ in 0..callers {
        let cache = Arc::clone(&cache);
        let barrier = Arc::clone(&barrier);
        handles.push(tokio::spawn(async move {
            barrier.wait().await;
            cache.get_or_create(Some("M1"), "fp", None).await.unwrap()
        }));
    }

    let mut contexts = Vec::new();
    for handle in handles {
        contexts.push(handle.await.unwrap());
    }

    assert_eq!(backend.created.load(Ordering::SeqCst), 1);
    for context in &contexts[1..] {
        assert!(Arc::ptr_eq(&contexts[0], context));
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_distinct_keys_do_not_serialize() {
    let backend = CountingBackend::slow(Duration::from_millis(100));
    let cache = Arc::new(SessionContextCache::new(backend.clone()));

    let start = std::time::Instant::now();
    let (a, b) = tokio::join!(
        cache.get_or_create(Some("M1"), "fp", None),
        cache.get_or_create(Some("M2"), "fp", None),
    );
    a.unwrap();
    b.unwrap();

    assert_eq!(backend.created.load(Ordering::SeqCst), 2);
    // Both constructions ran concurrently; serialized they would need 200ms.
    assert!(start.elapsed() < Duration::from_millis(190));
}

#[tokio::test]
async fn test_failed_construction_retries_later() {
    let backend = CountingBackend::failing_first(1);
    let cache = SessionContextCache::new(backend.clone());

    let err = cache.get_or_create(Some("M1"), "fp", None).await.unwrap_err();
    assert!(matches!(err, SessionError::Construction(_)));
    assert_eq!(backend.created.load(Ordering::SeqCst), 0);

    let handle = cache.get_or_create(Some("M1"), "fp", None).await.unwrap();
    assert_eq!(backend.created.load(Ordering::SeqCst), 1);

    // And the retried handle is now the cached identity.
    let again = cache.get_or_create(Some("M1"), "fp", None).await.unwrap();
    assert!(Arc::ptr_eq(&handle, &again));
}

#[tokio::test]
async fn test_malformed_properties_rejected_before_construction() {
    let backend = CountingBackend::new();
    let cache = SessionContextCache::new(backend.clone());

    for bad in [json!([1]), json!({"x": 1.5}), json!({"x": {"y": 1}}), json!("s")] {
        let err = cache.get_or_create(None, "fp", Some(&bad)).await.unwrap_err();
        assert!(matches!(err, SessionError::MalformedProperties(_)));
    }

    assert_eq!(backend.created.load(Ordering::SeqCst), 0);
    assert!(cache.is_empty());
}

#[tokio::test]
async fn test_abandoned_caller_does_not_abort_shared_construction() {
    let backend = CountingBackend::slow(Duration::from_millis(80));
    let cache = Arc::new(SessionContextCache::new(backend.clone()));

    // First caller starts construction, then is dropped mid-flight.
    let abandoned = {
        let cache = Arc::clone(&cache);
        tokio::spawn(async move { cache.get_or_create(Some("M1"), "fp", None).await })
    };
    tokio::time::sleep(Duration::from_millis(10)).await;
    abandoned.abort();

    // A surviving caller still gets a handle.
    let handle = cache.get_or_create(Some("M1"), "fp", None).await.unwrap();
    assert_eq!(handle.function_path(), "fp");
    assert_eq!(backend.created.load(Ordering::SeqCst), 1);
}
