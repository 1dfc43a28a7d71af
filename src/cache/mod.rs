//! Offline topic cache: fetch-or-reuse resolution with a batched flush.
//!
//! Resolution policy per topic:
//! 1. cache-priority — a persisted record wins outright, no network, no write
//! 2. miss — fetch, parse, write through (staged until the batch flush)
//! 3. force-reload — always fetch; connectivity loss falls back to the cache
//!
//! One `resolve_many`/`force_reload_many` call issues at most one flush,
//! sequenced strictly after every write in the batch. Per-topic failures
//! are absorbed and logged; only store failures propagate.

pub mod fetch;
pub mod parser;
pub mod store;

use futures::future::join_all;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex as StdMutex};
use tokio::sync::Mutex as AsyncMutex;

pub use fetch::{FetchError, HttpTopicFetcher, TopicFetcher};
pub use store::CacheStore;

use crate::domain::{LanguagePair, WordGroup};

/// Store-level failure. Per-topic network and parse failures never reach
/// this type — they are logged and the topic is omitted.
#[derive(Debug)]
pub enum CacheError {
  /// Store mutex poisoned
  Unavailable,
  /// Persisted-store read/write/flush failed; in-memory state stays usable
  WriteFailure(rusqlite::Error),
  /// Cache blob could not be serialized
  Serialize(serde_json::Error),
  /// The topic set or language pair changed while the batch was in
  /// flight; the result was discarded, nothing was written
  Cancelled,
}

impl std::fmt::Display for CacheError {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      CacheError::Unavailable => write!(f, "cache store unavailable"),
      CacheError::WriteFailure(e) => write!(f, "cache store failure: {}", e),
      CacheError::Serialize(e) => write!(f, "cache serialization failure: {}", e),
      CacheError::Cancelled => write!(f, "resolve superseded by a newer request"),
    }
  }
}

impl std::error::Error for CacheError {}

/// Extension trait for logging recoverable errors before discarding them.
pub trait LogOnError<T> {
  /// Log the error at warn level and return None
  fn log_warn(self, context: &str) -> Option<T>;
}

impl<T, E: std::fmt::Display> LogOnError<T> for Result<T, E> {
  fn log_warn(self, context: &str) -> Option<T> {
    match self {
      Ok(v) => Some(v),
      Err(e) => {
        tracing::warn!("{}: {}", context, e);
        None
      }
    }
  }
}

/// Reconciles network-fetched topic data against the persisted store.
///
/// All persisted-store writes in the system go through this type; UI-level
/// callers never touch the store directly.
pub struct CacheSynchronizer<F: TopicFetcher> {
  store: Arc<CacheStore>,
  fetcher: F,
  pair: StdMutex<LanguagePair>,
  /// Bumped on language-pair or topic-set change; in-flight batches
  /// carrying an older generation are discarded at completion time.
  generation: AtomicU64,
  /// Serializes overlapping resolves of the same topic so a stale write
  /// cannot clobber a fresher one.
  topic_locks: StdMutex<HashMap<String, Arc<AsyncMutex<()>>>>,
}

impl<F: TopicFetcher> CacheSynchronizer<F> {
  pub fn new(store: Arc<CacheStore>, fetcher: F, pair: LanguagePair) -> Self {
    Self {
      store,
      fetcher,
      pair: StdMutex::new(pair),
      generation: AtomicU64::new(0),
      topic_locks: StdMutex::new(HashMap::new()),
    }
  }

  pub fn store(&self) -> &CacheStore {
    &self.store
  }

  pub fn language_pair(&self) -> LanguagePair {
    self.pair.lock().expect("language pair lock poisoned").clone()
  }

  /// Change the active language pair: persists the record, invalidates
  /// every in-flight resolve and drops their staged writes. Callers
  /// follow up with a `force_reload_many`.
  pub fn set_language_pair(&self, pair: LanguagePair) -> Result<(), CacheError> {
    self.store.write_language_pair(&pair)?;
    *self.pair.lock().expect("language pair lock poisoned") = pair;
    self.invalidate_in_flight();
    Ok(())
  }

  /// Invalidate pending batches (topic-set change without a language change).
  pub fn invalidate_in_flight(&self) {
    self.generation.fetch_add(1, Ordering::SeqCst);
    self.store.discard_staged();
  }

  fn current_generation(&self) -> u64 {
    self.generation.load(Ordering::SeqCst)
  }

  fn topic_lock(&self, topic: &str) -> Arc<AsyncMutex<()>> {
    let mut locks = self.topic_locks.lock().expect("topic lock table poisoned");
    locks
      .entry(topic.to_string())
      .or_insert_with(|| Arc::new(AsyncMutex::new(())))
      .clone()
  }

  /// Resolve one topic with cache priority. `None` means the topic failed
  /// to load (network error or unusable file) and is omitted — never fatal.
  async fn resolve_one(
    &self,
    topic: &str,
    generation: u64,
    force: bool,
  ) -> Result<Option<WordGroup>, CacheError> {
    let lock = self.topic_lock(topic);
    let _guard = lock.lock().await;

    if !force {
      if let Some(group) = self.store.read_topic(topic)? {
        tracing::debug!("cache hit for topic '{}'", topic);
        return Ok(Some(group));
      }
    }

    let raw = match self.fetcher.fetch_raw(topic).await {
      Ok(raw) => raw,
      Err(e) if force && e.is_offline() => {
        tracing::info!("offline, serving topic '{}' from cache: {}", topic, e);
        return self.store.read_topic(topic);
      }
      Err(e) => {
        tracing::warn!("failed to fetch topic '{}': {}", topic, e);
        return Ok(None);
      }
    };

    let pair = self.language_pair();
    let Some(group) = parser::parse_topic(topic, &raw, &pair) else {
      return Ok(None);
    };

    // A newer request superseded this batch while the fetch was in
    // flight: discard instead of staging a stale write.
    if self.current_generation() != generation {
      tracing::debug!("discarding stale resolve of topic '{}'", topic);
      return Err(CacheError::Cancelled);
    }

    self.store.stage_topic(&group)?;
    Ok(Some(group))
  }

  async fn resolve_batch(
    &self,
    topics: &[String],
    force: bool,
  ) -> Result<Vec<WordGroup>, CacheError> {
    let generation = self.current_generation();

    let results = join_all(
      topics
        .iter()
        .map(|topic| self.resolve_one(topic, generation, force)),
    )
    .await;

    let mut groups = Vec::new();
    for result in results {
      match result {
        Ok(Some(group)) => groups.push(group),
        Ok(None) => {}
        Err(e) => {
          self.store.discard_staged();
          return Err(e);
        }
      }
    }

    if self.current_generation() != generation {
      self.store.discard_staged();
      return Err(CacheError::Cancelled);
    }

    // Single flush per batch, strictly after every write above.
    self.store.flush()?;
    Ok(groups)
  }

  /// Resolve a single topic cache-first. `None` when the topic failed to
  /// load and was omitted.
  pub async fn resolve(&self, topic: &str) -> Result<Option<WordGroup>, CacheError> {
    let names = [topic.to_string()];
    let groups = self.resolve_batch(&names, false).await?;
    Ok(groups.into_iter().next())
  }

  /// Resolve topics cache-first. Cache hits produce no fetch, no write
  /// and no flush; resolving an unchanged topic twice fetches once.
  pub async fn resolve_many(&self, topics: &[String]) -> Result<Vec<WordGroup>, CacheError> {
    self.resolve_batch(topics, false).await
  }

  /// Persist the topic selection so it survives restarts.
  pub fn persist_selected_topics(&self, topics: &[String]) -> Result<(), CacheError> {
    self.store.write_selected_topics(topics)
  }

  pub fn selected_topics(&self) -> Result<Vec<String>, CacheError> {
    self.store.read_selected_topics()
  }

  /// Bypass cache priority: fetch every topic anew (falling back to the
  /// cached copy when offline) and rewrite the persisted records.
  pub async fn force_reload_many(&self, topics: &[String]) -> Result<Vec<WordGroup>, CacheError> {
    self.resolve_batch(topics, true).await
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::testing::{StubFetcher, HAMMER_CSV, TOOLS_CSV};

  fn sync_with(fetcher: StubFetcher) -> CacheSynchronizer<StubFetcher> {
    let store = Arc::new(CacheStore::open_in_memory().unwrap());
    CacheSynchronizer::new(store, fetcher, LanguagePair::new("de", "en"))
  }

  fn topics(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
  }

  #[tokio::test]
  async fn test_miss_fetches_parses_and_persists() {
    let sync = sync_with(StubFetcher::with_topic("Tools", HAMMER_CSV));

    let groups = sync.resolve_many(&topics(&["Tools"])).await.unwrap();
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].items[0].meaning_id, "tool_hammer");
    assert_eq!(sync.fetcher.fetch_count(), 1);
    // written through and flushed
    assert!(sync.store().read_topic("Tools").unwrap().is_some());
    assert_eq!(sync.store().staged_len(), 0);
  }

  #[tokio::test]
  async fn test_resolve_twice_is_idempotent() {
    let sync = sync_with(StubFetcher::with_topic("Tools", HAMMER_CSV));

    let first = sync.resolve_many(&topics(&["Tools"])).await.unwrap();
    let second = sync.resolve_many(&topics(&["Tools"])).await.unwrap();

    assert_eq!(first, second);
    // exactly one network fetch, the second call is a pure cache hit
    assert_eq!(sync.fetcher.fetch_count(), 1);
  }

  #[tokio::test]
  async fn test_cache_hit_never_touches_network() {
    let sync = sync_with(StubFetcher::with_topic("Tools", HAMMER_CSV));
    sync.resolve_many(&topics(&["Tools"])).await.unwrap();
    sync.fetcher.reset_count();

    let groups = sync.resolve_many(&topics(&["Tools"])).await.unwrap();
    assert_eq!(groups.len(), 1);
    assert_eq!(sync.fetcher.fetch_count(), 0);
  }

  #[tokio::test]
  async fn test_failed_topic_omitted_not_fatal() {
    let sync = sync_with(StubFetcher::with_topic("Tools", HAMMER_CSV));

    let groups = sync
      .resolve_many(&topics(&["Missing", "Tools"]))
      .await
      .unwrap();
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].name, "Tools");
  }

  #[tokio::test]
  async fn test_unusable_language_topic_skipped() {
    let sync = sync_with(StubFetcher::with_topic(
      "Tools",
      "kind,cz,fr,meaningId\nnoun,kladivo,marteau,tool_hammer\n",
    ));
    let groups = sync.resolve_many(&topics(&["Tools"])).await.unwrap();
    assert!(groups.is_empty());
    assert!(sync.store().read_topic("Tools").unwrap().is_none());
  }

  #[tokio::test]
  async fn test_force_reload_refetches() {
    let sync = sync_with(StubFetcher::with_topic("Tools", HAMMER_CSV));
    sync.resolve_many(&topics(&["Tools"])).await.unwrap();

    sync.fetcher.set_topic("Tools", TOOLS_CSV);
    let groups = sync.force_reload_many(&topics(&["Tools"])).await.unwrap();

    assert_eq!(sync.fetcher.fetch_count(), 2);
    assert_eq!(groups[0].items.len(), 2);
    // persisted record replaced wholesale
    let stored = sync.store().read_topic("Tools").unwrap().unwrap();
    assert_eq!(stored.items.len(), 2);
  }

  #[tokio::test]
  async fn test_force_reload_offline_falls_back_to_cache() {
    let sync = sync_with(StubFetcher::with_topic("Tools", HAMMER_CSV));
    sync.resolve_many(&topics(&["Tools"])).await.unwrap();

    sync.fetcher.set_offline(true);
    let groups = sync.force_reload_many(&topics(&["Tools"])).await.unwrap();
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].items[0].meaning_id, "tool_hammer");
  }

  #[tokio::test]
  async fn test_force_reload_offline_without_cache_omits_topic() {
    let sync = sync_with(StubFetcher::with_topic("Tools", HAMMER_CSV));
    sync.fetcher.set_offline(true);
    let groups = sync.force_reload_many(&topics(&["Tools"])).await.unwrap();
    assert!(groups.is_empty());
  }

  #[tokio::test]
  async fn test_language_change_invalidates_and_discards() {
    let sync = sync_with(StubFetcher::with_topic("Tools", HAMMER_CSV));
    // simulate a batch captured before the change
    let stale_generation = sync.current_generation();

    // same pair re-selected still supersedes the in-flight batch
    sync
      .set_language_pair(LanguagePair::new("de", "en"))
      .unwrap();

    let result = sync.resolve_one("Tools", stale_generation, false).await;
    assert!(matches!(result, Err(CacheError::Cancelled)));
    assert!(sync.store().read_topic("Tools").unwrap().is_none());
  }

  #[tokio::test]
  async fn test_language_pair_persisted_on_change() {
    let sync = sync_with(StubFetcher::with_topic("Tools", HAMMER_CSV));
    let pair = LanguagePair::new("de", "cz");
    sync.set_language_pair(pair.clone()).unwrap();
    assert_eq!(sync.store().read_language_pair().unwrap(), Some(pair));
    assert_eq!(sync.language_pair(), LanguagePair::new("de", "cz"));
  }

  #[tokio::test]
  async fn test_single_resolve() {
    let sync = sync_with(StubFetcher::with_topic("Tools", HAMMER_CSV));
    let group = sync.resolve("Tools").await.unwrap().unwrap();
    assert_eq!(group.name, "Tools");
    assert!(sync.resolve("Missing").await.unwrap().is_none());
  }

  #[tokio::test]
  async fn test_overlapping_resolves_of_one_topic_agree() {
    // the per-topic lock serializes overlapping resolves, so both see a
    // coherent record and the store ends up with one consistent copy
    let sync = sync_with(StubFetcher::with_topic("Tools", HAMMER_CSV));
    let first = topics(&["Tools"]);
    let second = topics(&["Tools"]);
    let (a, b) = tokio::join!(
      sync.resolve_many(&first),
      sync.resolve_many(&second)
    );
    assert_eq!(a.unwrap(), b.unwrap());
    let stored = sync.store().read_topic("Tools").unwrap().unwrap();
    assert_eq!(stored.items[0].meaning_id, "tool_hammer");
  }

  #[tokio::test]
  async fn test_batch_writes_flush_once() {
    let sync = sync_with(StubFetcher::with_topics(&[
      ("Tools", HAMMER_CSV),
      ("MoreTools", TOOLS_CSV),
    ]));

    let groups = sync
      .resolve_many(&topics(&["Tools", "MoreTools"]))
      .await
      .unwrap();
    assert_eq!(groups.len(), 2);
    // both records visible after the single trailing flush
    assert!(sync.store().read_topic("Tools").unwrap().is_some());
    assert!(sync.store().read_topic("MoreTools").unwrap().is_some());
    assert_eq!(sync.store().staged_len(), 0);
  }
}
