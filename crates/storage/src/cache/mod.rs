//! In-memory cache of server resources with prefix invalidation.
//!
//! Entries are replaced whole under a short lock and never mutated in place.
//! Invalidating several prefixes is a sequence of independent writes.

mod key;
mod mutation;
mod pages;

use std::any::Any;
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Duration, Utc};
use quiz_core::Clock;
use quiz_core::model::Page;
use thiserror::Error;
use tokio::sync::broadcast;
use tracing::debug;

pub use key::{CacheKey, KeyParam, KeyPrefix, ResourceKind};
pub use mutation::{AdminEntity, AdminOp, Mutation};
pub use pages::PageSequence;

const EVENT_CAPACITY: usize = 64;

#[derive(Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum CacheError {
    #[error("expected page {expected}, got page {got}")]
    NonContiguousPage { expected: u32, got: u32 },
}

/// Change notification for subscribers that re-render on cache updates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheEvent {
    Stored(CacheKey),
    Invalidated(CacheKey),
    Removed(CacheKey),
}

impl CacheEvent {
    #[must_use]
    pub fn key(&self) -> &CacheKey {
        match self {
            CacheEvent::Stored(key) | CacheEvent::Invalidated(key) | CacheEvent::Removed(key) => {
                key
            }
        }
    }
}

struct CacheEntry {
    value: Arc<dyn Any + Send + Sync>,
    stale_at: DateTime<Utc>,
    invalidated: bool,
}

impl CacheEntry {
    fn is_stale(&self, now: DateTime<Utc>) -> bool {
        self.invalidated || now >= self.stale_at
    }
}

#[derive(Default)]
struct CacheState {
    entries: HashMap<CacheKey, CacheEntry>,
}

/// Keyed, stale-time-aware store shared by every view of one client.
#[derive(Clone)]
pub struct RemoteDataCache {
    inner: Arc<Mutex<CacheState>>,
    clock: Clock,
    stale_time: Duration,
    events: broadcast::Sender<CacheEvent>,
}

impl std::fmt::Debug for RemoteDataCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteDataCache")
            .field("entries", &self.len())
            .field("stale_time", &self.stale_time)
            .finish_non_exhaustive()
    }
}

impl RemoteDataCache {
    #[must_use]
    pub fn new(clock: Clock, stale_time: Duration) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            inner: Arc::new(Mutex::new(CacheState::default())),
            clock,
            stale_time,
            events,
        }
    }

    fn state(&self) -> MutexGuard<'_, CacheState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn emit(&self, event: CacheEvent) {
        // No subscribers is not an error.
        let _ = self.events.send(event);
    }

    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<CacheEvent> {
        self.events.subscribe()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.state().entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Last stored value for `key`, fresh or not.
    ///
    /// A value stored under a different type reads as a miss.
    #[must_use]
    pub fn peek<T>(&self, key: &CacheKey) -> Option<T>
    where
        T: Clone + Send + Sync + 'static,
    {
        let state = self.state();
        let entry = state.entries.get(key)?;
        entry.value.downcast_ref::<T>().cloned()
    }

    /// Stored value for `key` only while it is inside its staleness window.
    #[must_use]
    pub fn fresh<T>(&self, key: &CacheKey) -> Option<T>
    where
        T: Clone + Send + Sync + 'static,
    {
        let now = self.clock.now();
        let state = self.state();
        let entry = state.entries.get(key)?;
        if entry.is_stale(now) {
            return None;
        }
        entry.value.downcast_ref::<T>().cloned()
    }

    /// Whether the next read of `key` must go to the network.
    #[must_use]
    pub fn is_stale(&self, key: &CacheKey) -> bool {
        let now = self.clock.now();
        self.state()
            .entries
            .get(key)
            .is_none_or(|entry| entry.is_stale(now))
    }

    /// Replace the entry for `key` with a fresh staleness deadline.
    pub fn store<T>(&self, key: CacheKey, value: T)
    where
        T: Send + Sync + 'static,
    {
        let stale_at = self.clock.now() + self.stale_time;
        let entry = CacheEntry {
            value: Arc::new(value),
            stale_at,
            invalidated: false,
        };
        self.state().entries.insert(key.clone(), entry);
        debug!(key = %key, "cache entry stored");
        self.emit(CacheEvent::Stored(key));
    }

    pub fn remove(&self, key: &CacheKey) -> bool {
        let removed = self.state().entries.remove(key).is_some();
        if removed {
            self.emit(CacheEvent::Removed(key.clone()));
        }
        removed
    }

    /// Mark every entry matching one of `prefixes` stale.
    ///
    /// Returns the number of entries newly marked.
    pub fn invalidate(&self, prefixes: &[KeyPrefix]) -> usize {
        let marked: Vec<CacheKey> = {
            let mut state = self.state();
            state
                .entries
                .iter_mut()
                .filter(|(key, entry)| {
                    !entry.invalidated && prefixes.iter().any(|prefix| key.matches(prefix))
                })
                .map(|(key, entry)| {
                    entry.invalidated = true;
                    key.clone()
                })
                .collect()
        };
        debug!(
            prefixes = prefixes.len(),
            entries = marked.len(),
            "cache invalidated"
        );
        let count = marked.len();
        for key in marked {
            self.emit(CacheEvent::Invalidated(key));
        }
        count
    }

    pub fn invalidate_mutation(&self, mutation: &Mutation) -> usize {
        self.invalidate(&mutation.invalidates())
    }

    /// Serve `key` from cache while fresh, otherwise run `fetcher` and store.
    ///
    /// # Errors
    ///
    /// Propagates the fetcher's error; nothing is stored in that case.
    pub async fn fetch<T, F, Fut, E>(&self, key: CacheKey, fetcher: F) -> Result<T, E>
    where
        T: Clone + Send + Sync + 'static,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        if let Some(value) = self.fresh::<T>(&key) {
            debug!(key = %key, "cache hit");
            return Ok(value);
        }
        debug!(key = %key, "cache miss");
        let value = fetcher().await?;
        self.store(key, value.clone());
        Ok(value)
    }

    /// Page sequence for `key`, starting it with page 1 if absent.
    ///
    /// A stale sequence is rebuilt by refetching every page it had loaded so
    /// the list a user already scrolled through stays the same length.
    ///
    /// # Errors
    ///
    /// Propagates fetcher errors and rejects out-of-order pages.
    pub async fn fetch_first_page<T, F, Fut, E>(
        &self,
        key: CacheKey,
        fetcher: F,
    ) -> Result<PageSequence<T>, E>
    where
        T: Clone + Send + Sync + 'static,
        F: Fn(u32) -> Fut,
        Fut: Future<Output = Result<Page<T>, E>>,
        E: From<CacheError>,
    {
        if let Some(seq) = self.fresh::<PageSequence<T>>(&key) {
            debug!(key = %key, pages = seq.loaded_pages(), "cache hit");
            return Ok(seq);
        }
        let wanted = self
            .peek::<PageSequence<T>>(&key)
            .map_or(1, |seq| seq.loaded_pages().max(1));
        let seq = self.load_pages(&fetcher, wanted).await?;
        self.store(key, seq.clone());
        Ok(seq)
    }

    /// Append the next page to the sequence under `key`.
    ///
    /// Returns the sequence unchanged when the last page is already loaded.
    ///
    /// # Errors
    ///
    /// Propagates fetcher errors and rejects out-of-order pages.
    pub async fn fetch_next_page<T, F, Fut, E>(
        &self,
        key: CacheKey,
        fetcher: F,
    ) -> Result<PageSequence<T>, E>
    where
        T: Clone + Send + Sync + 'static,
        F: Fn(u32) -> Fut,
        Fut: Future<Output = Result<Page<T>, E>>,
        E: From<CacheError>,
    {
        let seq = match self.fresh::<PageSequence<T>>(&key) {
            Some(seq) => seq,
            None => return self.fetch_first_page(key, fetcher).await,
        };
        let Some(next) = seq.next_page() else {
            return Ok(seq);
        };
        let page = fetcher(next).await?;
        let seq = seq.appended(page)?;
        debug!(key = %key, pages = seq.loaded_pages(), "page appended");
        self.store(key, seq.clone());
        Ok(seq)
    }

    async fn load_pages<T, F, Fut, E>(&self, fetcher: &F, wanted: u32) -> Result<PageSequence<T>, E>
    where
        T: Clone,
        F: Fn(u32) -> Fut,
        Fut: Future<Output = Result<Page<T>, E>>,
        E: From<CacheError>,
    {
        let mut seq = PageSequence::from_first(fetcher(1).await?);
        while seq.loaded_pages() < wanted {
            let Some(next) = seq.next_page() else { break };
            seq = seq.appended(fetcher(next).await?)?;
        }
        Ok(seq)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::AttemptId;
    use quiz_core::time::fixed_now;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug, PartialEq)]
    enum TestError {
        Offline,
        Cache(CacheError),
    }

    impl From<CacheError> for TestError {
        fn from(err: CacheError) -> Self {
            TestError::Cache(err)
        }
    }

    fn cache() -> (RemoteDataCache, Clock) {
        let clock = Clock::manual(fixed_now());
        (
            RemoteDataCache::new(clock.clone(), Duration::seconds(30)),
            clock,
        )
    }

    #[tokio::test]
    async fn serves_fresh_value_without_refetching() {
        let (cache, _) = cache();
        let calls = AtomicUsize::new(0);
        for _ in 0..3 {
            let value: u32 = cache
                .fetch(CacheKey::dashboard(), || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok::<_, TestError>(7)
                })
                .await
                .unwrap();
            assert_eq!(value, 7);
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn refetches_after_stale_time() {
        let (cache, mut clock) = cache();
        cache.store(CacheKey::dashboard(), 1_u32);
        clock.advance(Duration::seconds(31));
        let value: u32 = cache
            .fetch(CacheKey::dashboard(), || async { Ok::<_, TestError>(2) })
            .await
            .unwrap();
        assert_eq!(value, 2);
    }

    #[tokio::test]
    async fn failed_fetch_keeps_previous_value() {
        let (cache, _) = cache();
        cache.store(CacheKey::dashboard(), 1_u32);
        cache.invalidate(&[KeyPrefix::kind(ResourceKind::Dashboard)]);
        let err = cache
            .fetch::<u32, _, _, _>(CacheKey::dashboard(), || async { Err(TestError::Offline) })
            .await
            .unwrap_err();
        assert_eq!(err, TestError::Offline);
        assert_eq!(cache.peek::<u32>(&CacheKey::dashboard()), Some(1));
        assert!(cache.is_stale(&CacheKey::dashboard()));
    }

    #[test]
    fn invalidation_marks_only_matching_entries() {
        let (cache, _) = cache();
        cache.store(CacheKey::attempt(AttemptId::new(1)), "one");
        cache.store(CacheKey::attempt(AttemptId::new(2)), "two");
        cache.store(CacheKey::attempts_mine(), "list");
        cache.store(CacheKey::dashboard(), "stats");
        cache.store(CacheKey::quizzes(None), "catalog");

        let marked = cache.invalidate_mutation(&Mutation::SubmitAttempt {
            attempt_id: AttemptId::new(1),
        });

        assert_eq!(marked, 3);
        assert!(cache.is_stale(&CacheKey::attempt(AttemptId::new(1))));
        assert!(!cache.is_stale(&CacheKey::attempt(AttemptId::new(2))));
        assert!(cache.is_stale(&CacheKey::attempts_mine()));
        assert!(cache.is_stale(&CacheKey::dashboard()));
        assert!(!cache.is_stale(&CacheKey::quizzes(None)));
    }

    #[test]
    fn type_mismatch_reads_as_miss() {
        let (cache, _) = cache();
        cache.store(CacheKey::dashboard(), 5_u32);
        assert_eq!(cache.fresh::<String>(&CacheKey::dashboard()), None);
    }

    #[test]
    fn subscribers_see_store_and_invalidate() {
        let (cache, _) = cache();
        let mut events = cache.subscribe();
        cache.store(CacheKey::dashboard(), 1_u8);
        cache.invalidate(&[KeyPrefix::kind(ResourceKind::Dashboard)]);
        assert_eq!(
            events.try_recv().unwrap(),
            CacheEvent::Stored(CacheKey::dashboard())
        );
        assert_eq!(
            events.try_recv().unwrap(),
            CacheEvent::Invalidated(CacheKey::dashboard())
        );
    }

    fn numbers(page: u32) -> Page<u32> {
        Page::new(vec![page * 10, page * 10 + 1], page, 3)
    }

    #[tokio::test]
    async fn load_more_appends_pages() {
        let (cache, _) = cache();
        let key = CacheKey::attempts_mine();
        let fetch = |page| async move { Ok::<_, TestError>(numbers(page)) };
        let seq = cache.fetch_first_page(key.clone(), fetch).await.unwrap();
        assert_eq!(seq.loaded_pages(), 1);
        let seq = cache.fetch_next_page(key.clone(), fetch).await.unwrap();
        let seq2 = cache.fetch_next_page(key.clone(), fetch).await.unwrap();
        assert_eq!(seq.loaded_pages(), 2);
        assert_eq!(seq2.loaded_pages(), 3);
        let done = cache.fetch_next_page(key, fetch).await.unwrap();
        assert_eq!(done.item_count(), 6);
    }

    #[tokio::test]
    async fn stale_sequence_is_rebuilt_to_same_depth() {
        let (cache, _) = cache();
        let key = CacheKey::attempts_mine();
        let calls = AtomicUsize::new(0);
        let fetch = |page| {
            calls.fetch_add(1, Ordering::SeqCst);
            async move { Ok::<_, TestError>(numbers(page)) }
        };
        cache.fetch_first_page(key.clone(), &fetch).await.unwrap();
        cache.fetch_next_page(key.clone(), &fetch).await.unwrap();
        cache.invalidate(&[KeyPrefix::kind(ResourceKind::AttemptsMine)]);

        let rebuilt = cache.fetch_first_page(key, &fetch).await.unwrap();
        assert_eq!(rebuilt.loaded_pages(), 2);
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn filter_sets_are_independent_sequences() {
        let (cache, _) = cache();
        let fetch = |page| async move { Ok::<_, TestError>(numbers(page)) };
        cache
            .fetch_first_page(CacheKey::quizzes(None), fetch)
            .await
            .unwrap();
        cache
            .fetch_next_page(CacheKey::quizzes(None), fetch)
            .await
            .unwrap();
        let filtered = cache
            .fetch_first_page(CacheKey::quizzes(Some("rust")), fetch)
            .await
            .unwrap();
        assert_eq!(filtered.loaded_pages(), 1);
        let unfiltered = cache
            .peek::<PageSequence<u32>>(&CacheKey::quizzes(None))
            .unwrap();
        assert_eq!(unfiltered.loaded_pages(), 2);
    }

    #[tokio::test]
    async fn out_of_order_page_surfaces_cache_error() {
        let (cache, _) = cache();
        let key = CacheKey::attempts_mine();
        cache
            .fetch_first_page(key.clone(), |p| async move { Ok::<_, TestError>(numbers(p)) })
            .await
            .unwrap();
        let err = cache
            .fetch_next_page(key, |_| async { Ok::<_, TestError>(numbers(3)) })
            .await
            .unwrap_err();
        assert_eq!(
            err,
            TestError::Cache(CacheError::NonContiguousPage {
                expected: 2,
                got: 3
            })
        );
    }
}
