//! Keyed pool of reusable upstream connections.
//!
//! # Responsibilities
//! - Hold at most one idle handle per destination host
//! - Evict handles idle longer than `max_idle` (swept lazily on acquire)
//! - Probe a handle before handing it out; drop it if the probe fails
//!
//! # Design Decisions
//! - One mutex guards the whole map; pool operations are cheap next to I/O
//! - Acquire removes the handle from the map before probing, so the probe
//!   runs without the lock and no two callers can hold the same handle
//! - Handles are only stored back after a successful call

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::time::Instant;
use url::Url;

use crate::observability::metrics;
use crate::upstream::connection::PooledHandle;

/// Maximum idle time before a pooled handle is evicted.
pub const DEFAULT_MAX_IDLE: Duration = Duration::from_secs(60);

struct PoolEntry<C> {
    handle: C,
    last_used: Instant,
}

/// Process-wide registry of idle upstream handles keyed by host.
pub struct ConnectionPool<C> {
    entries: Mutex<HashMap<String, PoolEntry<C>>>,
    max_idle: Duration,
}

impl<C: PooledHandle> ConnectionPool<C> {
    /// Create an empty pool.
    pub fn new(max_idle: Duration) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            max_idle,
        }
    }

    /// Take the idle handle for `host`, if one is still usable.
    ///
    /// Runs a full idle sweep over every host first. A surviving handle is
    /// probed; on success it is rebound to `url` and returned, otherwise it
    /// is closed and `None` is returned.
    pub async fn acquire(&self, host: &str, url: &Url) -> Option<C> {
        let entry = {
            let mut entries = self.entries();
            self.sweep(&mut entries);
            entries.remove(host)
        };
        let mut handle = entry?.handle;

        if handle.probe().await {
            handle.rebind(url.clone());
            tracing::debug!(host = %host, "Reusing pooled upstream connection");
            metrics::record_pool_event("reused");
            Some(handle)
        } else {
            tracing::debug!(host = %host, "Pooled connection failed liveness probe, evicting");
            metrics::record_pool_event("probe_failed");
            handle.close();
            None
        }
    }

    /// Store `handle` as the idle connection for `host`.
    /// A handle already stored for that host is closed and replaced.
    pub fn release(&self, host: &str, handle: C) {
        let previous = self.entries().insert(
            host.to_string(),
            PoolEntry {
                handle,
                last_used: Instant::now(),
            },
        );
        if let Some(previous) = previous {
            previous.handle.close();
        }
        metrics::record_pool_event("stored");
    }

    /// Number of idle handles currently held.
    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether an idle handle is held for `host`.
    pub fn contains(&self, host: &str) -> bool {
        self.entries().contains_key(host)
    }

    /// Close every idle handle. Returns how many were closed.
    pub fn close_all(&self) -> usize {
        let drained: Vec<_> = self.entries().drain().collect();
        let count = drained.len();
        for (_, entry) in drained {
            entry.handle.close();
        }
        count
    }

    fn sweep(&self, entries: &mut HashMap<String, PoolEntry<C>>) {
        let now = Instant::now();
        let expired: Vec<String> = entries
            .iter()
            .filter(|(_, entry)| now.duration_since(entry.last_used) > self.max_idle)
            .map(|(host, _)| host.clone())
            .collect();

        for host in expired {
            if let Some(entry) = entries.remove(&host) {
                tracing::debug!(host = %host, "Evicting idle upstream connection");
                metrics::record_pool_event("evicted_idle");
                entry.handle.close();
            }
        }
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<String, PoolEntry<C>>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<C: PooledHandle> Default for ConnectionPool<C> {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_IDLE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Handle double with a switchable probe result and a shared close counter.
    struct FakeHandle {
        id: usize,
        alive: Arc<AtomicBool>,
        closed: Arc<AtomicUsize>,
        url: Option<Url>,
    }

    impl PooledHandle for FakeHandle {
        async fn probe(&mut self) -> bool {
            self.alive.load(Ordering::SeqCst)
        }

        fn rebind(&mut self, url: Url) {
            self.url = Some(url);
        }

        fn close(self) {
            self.closed.fetch_add(1, Ordering::SeqCst);
        }
    }

    struct Fixture {
        alive: Arc<AtomicBool>,
        closed: Arc<AtomicUsize>,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                alive: Arc::new(AtomicBool::new(true)),
                closed: Arc::new(AtomicUsize::new(0)),
            }
        }

        fn handle(&self, id: usize) -> FakeHandle {
            FakeHandle {
                id,
                alive: self.alive.clone(),
                closed: self.closed.clone(),
                url: None,
            }
        }
    }

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[tokio::test]
    async fn test_empty_pool_returns_none() {
        let pool: ConnectionPool<FakeHandle> = ConnectionPool::default();
        assert!(pool.acquire("api.example.com", &url("https://api.example.com/svc")).await.is_none());
    }

    #[tokio::test]
    async fn test_release_then_acquire_rebinds() {
        let fx = Fixture::new();
        let pool = ConnectionPool::default();
        pool.release("api.example.com", fx.handle(1));

        let handle = pool
            .acquire("api.example.com", &url("https://api.example.com/other"))
            .await
            .unwrap();
        assert_eq!(handle.id, 1);
        assert_eq!(handle.url.as_ref().unwrap().path(), "/other");
        assert!(pool.is_empty());
    }

    #[tokio::test]
    async fn test_handle_never_given_to_two_holders() {
        let fx = Fixture::new();
        let pool = ConnectionPool::default();
        pool.release("h", fx.handle(1));

        let first = pool.acquire("h", &url("http://h/")).await;
        let second = pool.acquire("h", &url("http://h/")).await;
        assert!(first.is_some());
        assert!(second.is_none());
    }

    #[tokio::test]
    async fn test_dead_handle_is_closed_and_evicted() {
        let fx = Fixture::new();
        let pool = ConnectionPool::default();
        pool.release("h", fx.handle(1));
        fx.alive.store(false, Ordering::SeqCst);

        assert!(pool.acquire("h", &url("http://h/")).await.is_none());
        assert_eq!(fx.closed.load(Ordering::SeqCst), 1);
        assert!(!pool.contains("h"));
    }

    #[tokio::test]
    async fn test_release_replaces_and_closes_previous() {
        let fx = Fixture::new();
        let pool = ConnectionPool::default();
        pool.release("h", fx.handle(1));
        pool.release("h", fx.handle(2));

        assert_eq!(pool.len(), 1);
        assert_eq!(fx.closed.load(Ordering::SeqCst), 1);
        let handle = pool.acquire("h", &url("http://h/")).await.unwrap();
        assert_eq!(handle.id, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_idle_handle_evicted_on_acquire_for_any_host() {
        let fx = Fixture::new();
        let pool = ConnectionPool::new(DEFAULT_MAX_IDLE);
        pool.release("idle.example.com", fx.handle(1));

        tokio::time::advance(DEFAULT_MAX_IDLE + Duration::from_secs(1)).await;

        assert!(pool.acquire("other.example.com", &url("http://other.example.com/")).await.is_none());
        assert!(!pool.contains("idle.example.com"));
        assert_eq!(fx.closed.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_handle_within_idle_window_survives_sweep() {
        let fx = Fixture::new();
        let pool = ConnectionPool::new(DEFAULT_MAX_IDLE);
        pool.release("a", fx.handle(1));

        tokio::time::advance(DEFAULT_MAX_IDLE - Duration::from_secs(1)).await;

        assert!(pool.acquire("b", &url("http://b/")).await.is_none());
        assert!(pool.contains("a"));
        assert_eq!(fx.closed.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_close_all() {
        let fx = Fixture::new();
        let pool = ConnectionPool::default();
        pool.release("a", fx.handle(1));
        pool.release("b", fx.handle(2));

        assert_eq!(pool.close_all(), 2);
        assert!(pool.is_empty());
        assert_eq!(fx.closed.load(Ordering::SeqCst), 2);
    }
}
