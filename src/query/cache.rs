use futures::future::{BoxFuture, FutureExt, Shared};
use std::any::Any;
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, warn};

type QueryValue = Arc<dyn Any + Send + Sync>;
type SharedFetch = Shared<BoxFuture<'static, Result<QueryValue, FetchError>>>;

/// A failed remote read
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    #[error("network error: {0}")]
    Network(String),

    #[error("server responded with {status}: {message}")]
    Status { status: u16, message: String },

    #[error("failed to decode response: {0}")]
    Decode(String),

    #[error("{0}")]
    Source(String),

    #[error("cached value for '{0}' has an unexpected type")]
    TypeMismatch(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryOptions {
    /// How long a result is served from cache without a new call
    pub stale_time: Duration,
    pub refetch_on_window_focus: bool,
    /// Extra attempts after a failed fetch
    pub retry: u32,
    pub retry_delay: Duration,
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            stale_time: Duration::ZERO,
            refetch_on_window_focus: true,
            retry: 0,
            retry_delay: Duration::from_millis(500),
        }
    }
}

/// Snapshot of one key
#[derive(Debug, Clone)]
pub struct QueryState<T> {
    pub data: Option<Arc<T>>,
    /// First load in flight, nothing to show yet
    pub is_loading: bool,
    pub error: Option<FetchError>,
    pub fetched_at: Option<Instant>,
}

impl<T> Default for QueryState<T> {
    fn default() -> Self {
        Self {
            data: None,
            is_loading: false,
            error: None,
            fetched_at: None,
        }
    }
}

#[derive(Default)]
struct Entry {
    value: Option<QueryValue>,
    fetched_at: Option<Instant>,
    stale_after: Duration,
    error: Option<FetchError>,
    in_flight: Option<(u64, SharedFetch)>,
    /// Generation of the most recently started fetch
    generation: u64,
    /// Generation whose result currently populates `value`/`error`
    applied: u64,
    /// Results from generations below this are discarded
    min_generation: u64,
}

impl Entry {
    fn is_fresh(&self, now: Instant) -> bool {
        match (&self.value, self.fetched_at) {
            (Some(_), Some(at)) => self.applied >= self.min_generation && now.duration_since(at) < self.stale_after,
            _ => false,
        }
    }
}

/// Key-partitioned cache of remote reads. Clones share the same entries.
#[derive(Clone, Default)]
pub struct QueryCache {
    entries: Arc<Mutex<HashMap<String, Entry>>>,
}

impl QueryCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Entry>> {
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Return the cached value for `key` while it is fresh, join a fetch that
    /// is already running, or start a new one.
    ///
    /// The fetch runs on its own task, so dropping every waiter still lets it
    /// complete and populate the cache.
    pub async fn fetch<T, F, Fut>(&self, key: &str, options: &QueryOptions, fetcher: F) -> Result<Arc<T>, FetchError>
    where
        T: Send + Sync + 'static,
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, FetchError>> + Send + 'static,
    {
        let shared = {
            let mut entries = self.lock();
            let entry = entries.entry(key.to_string()).or_default();

            if entry.is_fresh(Instant::now()) {
                if let Some(value) = &entry.value {
                    debug!(key, "query cache hit");
                    return downcast(key, value.clone());
                }
            }

            if let Some((generation, shared)) = &entry.in_flight {
                debug!(key, generation, "joining in-flight query");
                shared.clone()
            } else {
                entry.generation += 1;
                let generation = entry.generation;
                info!(key, generation, "fetching query");

                let shared = self.start(key.to_string(), generation, options.clone(), fetcher);
                entry.in_flight = Some((generation, shared.clone()));
                shared
            }
        };

        let value = shared.await?;
        downcast(key, value)
    }

    fn start<T, F, Fut>(&self, key: String, generation: u64, options: QueryOptions, fetcher: F) -> SharedFetch
    where
        T: Send + Sync + 'static,
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, FetchError>> + Send + 'static,
    {
        let cache = self.clone();
        let shared = async move {
            let result = run_with_retry(&key, &options, &fetcher)
                .await
                .map(|value| Arc::new(value) as QueryValue);
            cache.settle(&key, generation, options.stale_time, &result);
            result
        }
        .boxed()
        .shared();

        tokio::spawn(shared.clone());
        shared
    }

    fn settle(&self, key: &str, generation: u64, stale_after: Duration, result: &Result<QueryValue, FetchError>) {
        let mut entries = self.lock();
        let Some(entry) = entries.get_mut(key) else {
            return;
        };

        if matches!(&entry.in_flight, Some((current, _)) if *current == generation) {
            entry.in_flight = None;
        }

        if generation < entry.min_generation || generation < entry.applied {
            debug!(key, generation, "discarding superseded query result");
            return;
        }

        entry.applied = generation;
        match result {
            Ok(value) => {
                entry.value = Some(value.clone());
                entry.fetched_at = Some(Instant::now());
                entry.stale_after = stale_after;
                entry.error = None;
            }
            Err(err) => {
                warn!(key, generation, "query failed: {}", err);
                entry.error = Some(err.clone());
            }
        }
    }

    pub fn state<T: Send + Sync + 'static>(&self, key: &str) -> QueryState<T> {
        let entries = self.lock();
        let Some(entry) = entries.get(key) else {
            return QueryState::default();
        };

        let data = entry.value.clone().and_then(|value| value.downcast::<T>().ok());
        QueryState {
            is_loading: entry.in_flight.is_some() && data.is_none(),
            data,
            error: entry.error.clone(),
            fetched_at: entry.fetched_at,
        }
    }

    /// Whether a focus event should refetch `key` under `options`.
    pub fn should_refetch_on_focus(&self, key: &str, options: &QueryOptions) -> bool {
        if !options.refetch_on_window_focus {
            return false;
        }
        let entries = self.lock();
        match entries.get(key) {
            Some(entry) => entry.in_flight.is_none() && entry.fetched_at.is_some() && !entry.is_fresh(Instant::now()),
            None => false,
        }
    }

    /// Mark `key` stale. A fetch already running keeps its waiters but its
    /// result is discarded; the next read starts over.
    pub fn invalidate(&self, key: &str) {
        let mut entries = self.lock();
        if let Some(entry) = entries.get_mut(key) {
            entry.min_generation = entry.generation + 1;
            entry.in_flight = None;
            debug!(key, "query invalidated");
        }
    }
}

async fn run_with_retry<T, F, Fut>(key: &str, options: &QueryOptions, fetcher: &F) -> Result<T, FetchError>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T, FetchError>>,
{
    let mut attempt = 0;
    loop {
        match fetcher().await {
            Ok(value) => return Ok(value),
            Err(err) if attempt < options.retry => {
                attempt += 1;
                warn!(key, attempt, "query attempt failed, retrying: {}", err);
                tokio::time::sleep(options.retry_delay).await;
            }
            Err(err) => return Err(err),
        }
    }
}

fn downcast<T: Send + Sync + 'static>(key: &str, value: QueryValue) -> Result<Arc<T>, FetchError> {
    value.downcast::<T>().map_err(|_| FetchError::TypeMismatch(key.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::Notify;
    use tokio::task::JoinHandle;

    fn counting(calls: &Arc<AtomicUsize>) -> impl Fn() -> BoxFuture<'static, Result<usize, FetchError>> + Send + Sync + 'static {
        let calls = calls.clone();
        move || {
            let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
            async move { Ok(n) }.boxed()
        }
    }

    fn five_minutes() -> QueryOptions {
        QueryOptions {
            stale_time: Duration::from_secs(300),
            ..QueryOptions::default()
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_fresh_value_served_from_cache() {
        let cache = QueryCache::new();
        let calls = Arc::new(AtomicUsize::new(0));

        let first = cache.fetch("k", &five_minutes(), counting(&calls)).await.unwrap();
        tokio::time::advance(Duration::from_secs(299)).await;
        let second = cache.fetch("k", &five_minutes(), counting(&calls)).await.unwrap();

        assert_eq!((*first, *second), (1, 1));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_value_refetched() {
        let cache = QueryCache::new();
        let calls = Arc::new(AtomicUsize::new(0));

        cache.fetch("k", &five_minutes(), counting(&calls)).await.unwrap();
        tokio::time::advance(Duration::from_secs(301)).await;
        let value = cache.fetch("k", &five_minutes(), counting(&calls)).await.unwrap();

        assert_eq!(*value, 2);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_concurrent_fetches_share_one_call() {
        let cache = QueryCache::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let gate = Arc::new(tokio::sync::Notify::new());

        let slow = {
            let calls = calls.clone();
            let gate = gate.clone();
            move || {
                calls.fetch_add(1, Ordering::SeqCst);
                let gate = gate.clone();
                async move {
                    gate.notified().await;
                    Ok::<_, FetchError>("done".to_string())
                }
            }
        };

        let options = five_minutes();
        let a = cache.fetch("k", &options, slow.clone());
        let b = cache.fetch("k", &options, slow);
        let release = async {
            while !cache.state::<String>("k").is_loading {
                tokio::task::yield_now().await;
            }
            gate.notify_one();
        };

        let (a, b, _) = tokio::join!(a, b, release);
        assert_eq!(a.unwrap().as_str(), "done");
        assert_eq!(b.unwrap().as_str(), "done");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failure_is_recorded_as_state() {
        let cache = QueryCache::new();
        let options = QueryOptions::default();

        let result = cache
            .fetch("k", &options, || async { Err::<u32, _>(FetchError::Source("boom".into())) })
            .await;
        assert_eq!(result.unwrap_err(), FetchError::Source("boom".into()));

        let state = cache.state::<u32>("k");
        assert!(state.data.is_none());
        assert!(!state.is_loading);
        assert_eq!(state.error, Some(FetchError::Source("boom".into())));
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_until_success() {
        let cache = QueryCache::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let flaky = {
            let calls = calls.clone();
            move || {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                async move {
                    if n < 2 {
                        Err(FetchError::Network("reset".into()))
                    } else {
                        Ok(n)
                    }
                }
            }
        };

        let options = QueryOptions {
            retry: 2,
            ..QueryOptions::default()
        };
        assert_eq!(*cache.fetch("k", &options, flaky).await.unwrap(), 2);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_invalidate_forces_refetch() {
        let cache = QueryCache::new();
        let calls = Arc::new(AtomicUsize::new(0));

        cache.fetch("k", &five_minutes(), counting(&calls)).await.unwrap();
        cache.invalidate("k");
        let value = cache.fetch("k", &five_minutes(), counting(&calls)).await.unwrap();
        assert_eq!(*value, 2);
    }

    fn gated(value: usize, gate: &Arc<Notify>) -> impl Fn() -> BoxFuture<'static, Result<usize, FetchError>> + Send + Sync + 'static {
        let gate = gate.clone();
        move || {
            let gate = gate.clone();
            async move {
                gate.notified().await;
                Ok(value)
            }
            .boxed()
        }
    }

    fn spawn_fetch(
        cache: &QueryCache,
        fetcher: impl Fn() -> BoxFuture<'static, Result<usize, FetchError>> + Send + Sync + 'static,
    ) -> JoinHandle<Result<Arc<usize>, FetchError>> {
        let cache = cache.clone();
        tokio::spawn(async move { cache.fetch("k", &five_minutes(), fetcher).await })
    }

    async fn wait_until_loading(cache: &QueryCache) {
        while !cache.state::<usize>("k").is_loading {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test]
    async fn test_superseded_fetch_resolving_last_is_discarded() {
        let cache = QueryCache::new();
        let gate = Arc::new(Notify::new());

        let older = spawn_fetch(&cache, gated(1, &gate));
        wait_until_loading(&cache).await;
        cache.invalidate("k");

        let newer = cache
            .fetch("k", &five_minutes(), || async { Ok::<_, FetchError>(2usize) })
            .await
            .unwrap();
        assert_eq!(*newer, 2);

        gate.notify_one();
        // the older waiter still gets its own result
        assert_eq!(*older.await.unwrap().unwrap(), 1);

        let state = cache.state::<usize>("k");
        assert_eq!(state.data.as_deref(), Some(&2));
        assert!(!state.is_loading);
        let cached = cache
            .fetch("k", &five_minutes(), || async { Ok::<_, FetchError>(3usize) })
            .await
            .unwrap();
        assert_eq!(*cached, 2);
    }

    #[tokio::test]
    async fn test_superseded_fetch_resolving_first_is_discarded() {
        let cache = QueryCache::new();
        let older_gate = Arc::new(Notify::new());
        let newer_gate = Arc::new(Notify::new());

        let older = spawn_fetch(&cache, gated(1, &older_gate));
        wait_until_loading(&cache).await;
        cache.invalidate("k");
        let newer = spawn_fetch(&cache, gated(2, &newer_gate));
        wait_until_loading(&cache).await;

        older_gate.notify_one();
        assert_eq!(*older.await.unwrap().unwrap(), 1);
        let state = cache.state::<usize>("k");
        assert!(state.data.is_none());
        assert!(state.is_loading);

        newer_gate.notify_one();
        assert_eq!(*newer.await.unwrap().unwrap(), 2);
        assert_eq!(cache.state::<usize>("k").data.as_deref(), Some(&2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_focus_refetch_respects_options() {
        let cache = QueryCache::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let mut options = QueryOptions::default();

        cache.fetch("k", &options, counting(&calls)).await.unwrap();
        tokio::time::advance(Duration::from_secs(1)).await;
        assert!(cache.should_refetch_on_focus("k", &options));

        options.refetch_on_window_focus = false;
        assert!(!cache.should_refetch_on_focus("k", &options));
        assert!(!cache.should_refetch_on_focus("missing", &QueryOptions::default()));
    }

    #[tokio::test]
    async fn test_keys_are_independent() {
        let cache = QueryCache::new();
        let options = five_minutes();
        cache.fetch("a", &options, || async { Ok::<_, FetchError>(1u8) }).await.unwrap();

        assert!(cache.state::<u8>("b").data.is_none());
        assert_eq!(cache.state::<u8>("a").data.as_deref(), Some(&1));
        assert!(matches!(
            cache.fetch("a", &options, || async { Ok::<_, FetchError>("x") }).await,
            Err(FetchError::TypeMismatch(_))
        ));
    }
}
