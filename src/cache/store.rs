//! Persisted topic cache backed by SQLite.
//!
//! One row per topic holding the JSON blob `{ "<topic>": [items...] }`,
//! plus a settings table for the active language pair and the selected
//! topic list. Topic writes are staged in memory and committed by a
//! single [`CacheStore::flush`] transaction, mirroring the one explicit
//! sync the synchronizer issues per resolve batch.

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::CacheError;
use crate::domain::{LanguagePair, WordGroup};

pub type DbPool = Arc<Mutex<Connection>>;

/// Settings key for the persisted language pair record
const LANGUAGES_KEY: &str = "selected_languages";

/// Settings key for the comma-joined selected topic names
const TOPICS_KEY: &str = "topics";

pub struct CacheStore {
  pool: DbPool,
  /// Topic blobs written but not yet flushed: (topic, blob)
  staged: Mutex<Vec<(String, String)>>,
}

fn run_migrations(conn: &Connection) -> rusqlite::Result<()> {
  conn.execute_batch(
    r#"
    CREATE TABLE IF NOT EXISTS topic_cache (
      topic TEXT PRIMARY KEY,
      items TEXT NOT NULL,
      cached_at TEXT NOT NULL
    );
    CREATE TABLE IF NOT EXISTS settings (
      key TEXT PRIMARY KEY,
      value TEXT NOT NULL
    );
    "#,
  )
}

impl CacheStore {
  /// Open the store at the configured data-dir location.
  pub fn open_default() -> Result<Self, CacheError> {
    Self::open(&crate::config::cache_db_path())
  }

  pub fn open(path: &Path) -> Result<Self, CacheError> {
    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent).ok();
    }
    let conn = Connection::open(path).map_err(CacheError::WriteFailure)?;
    run_migrations(&conn).map_err(CacheError::WriteFailure)?;
    Ok(Self {
      pool: Arc::new(Mutex::new(conn)),
      staged: Mutex::new(Vec::new()),
    })
  }

  /// In-memory store for tests and throwaway sessions.
  pub fn open_in_memory() -> Result<Self, CacheError> {
    let conn = Connection::open_in_memory().map_err(CacheError::WriteFailure)?;
    run_migrations(&conn).map_err(CacheError::WriteFailure)?;
    Ok(Self {
      pool: Arc::new(Mutex::new(conn)),
      staged: Mutex::new(Vec::new()),
    })
  }

  fn conn(&self) -> Result<MutexGuard<'_, Connection>, CacheError> {
    self.pool.lock().map_err(|_: PoisonError<_>| {
      tracing::error!("cache store mutex poisoned");
      CacheError::Unavailable
    })
  }

  fn staged_guard(&self) -> Result<MutexGuard<'_, Vec<(String, String)>>, CacheError> {
    self
      .staged
      .lock()
      .map_err(|_: PoisonError<_>| CacheError::Unavailable)
  }

  pub fn has_topic(&self, topic: &str) -> Result<bool, CacheError> {
    let conn = self.conn()?;
    let found: Option<i64> = conn
      .query_row(
        "SELECT 1 FROM topic_cache WHERE topic = ?1",
        params![topic],
        |row| row.get(0),
      )
      .optional()
      .map_err(CacheError::WriteFailure)?;
    Ok(found.is_some())
  }

  /// Read a persisted topic. A corrupt blob is logged and treated as a
  /// cache miss rather than failing the resolve.
  pub fn read_topic(&self, topic: &str) -> Result<Option<WordGroup>, CacheError> {
    let conn = self.conn()?;
    let blob: Option<String> = conn
      .query_row(
        "SELECT items FROM topic_cache WHERE topic = ?1",
        params![topic],
        |row| row.get(0),
      )
      .optional()
      .map_err(CacheError::WriteFailure)?;

    let Some(blob) = blob else {
      return Ok(None);
    };
    match WordGroup::from_cache_blob(topic, &blob) {
      Ok(Some(group)) => Ok(Some(group)),
      Ok(None) => {
        tracing::warn!("cache record for '{}' lacks its own topic key", topic);
        Ok(None)
      }
      Err(e) => {
        tracing::warn!("corrupt cache record for '{}': {}", topic, e);
        Ok(None)
      }
    }
  }

  /// Stage a freshly fetched topic for the next flush.
  pub fn stage_topic(&self, group: &WordGroup) -> Result<(), CacheError> {
    let blob = group.to_cache_blob().map_err(CacheError::Serialize)?;
    self.staged_guard()?.push((group.name.clone(), blob));
    Ok(())
  }

  pub fn staged_len(&self) -> usize {
    self.staged.lock().map(|s| s.len()).unwrap_or(0)
  }

  /// Drop staged writes without committing (stale batch invalidation).
  pub fn discard_staged(&self) {
    if let Ok(mut staged) = self.staged.lock() {
      staged.clear();
    }
  }

  /// Commit all staged topic writes in one transaction. Returns the
  /// number of rows written; zero staged writes commit nothing. On
  /// failure the staged entries are kept so a later flush can retry.
  pub fn flush(&self) -> Result<usize, CacheError> {
    let pending: Vec<(String, String)> = {
      let mut staged = self.staged_guard()?;
      std::mem::take(&mut *staged)
    };
    if pending.is_empty() {
      return Ok(0);
    }

    let result = self.commit(&pending);
    if result.is_err() {
      if let Ok(mut staged) = self.staged.lock() {
        let mut pending = pending;
        staged.append(&mut pending);
      }
    }
    result
  }

  fn commit(&self, pending: &[(String, String)]) -> Result<usize, CacheError> {
    let mut conn = self.conn()?;
    let tx = conn.transaction().map_err(CacheError::WriteFailure)?;
    let now = Utc::now().to_rfc3339();
    for (topic, blob) in pending {
      tx.execute(
        "INSERT OR REPLACE INTO topic_cache (topic, items, cached_at) VALUES (?1, ?2, ?3)",
        params![topic, blob, now],
      )
      .map_err(CacheError::WriteFailure)?;
    }
    tx.commit().map_err(CacheError::WriteFailure)?;
    tracing::debug!("flushed {} topic record(s)", pending.len());
    Ok(pending.len())
  }

  fn write_setting(&self, key: &str, value: &str) -> Result<(), CacheError> {
    let conn = self.conn()?;
    conn
      .execute(
        "INSERT OR REPLACE INTO settings (key, value) VALUES (?1, ?2)",
        params![key, value],
      )
      .map_err(CacheError::WriteFailure)?;
    Ok(())
  }

  fn read_setting(&self, key: &str) -> Result<Option<String>, CacheError> {
    let conn = self.conn()?;
    conn
      .query_row("SELECT value FROM settings WHERE key = ?1", params![key], |row| {
        row.get(0)
      })
      .optional()
      .map_err(CacheError::WriteFailure)
  }

  pub fn write_language_pair(&self, pair: &LanguagePair) -> Result<(), CacheError> {
    let json = serde_json::to_string(pair).map_err(CacheError::Serialize)?;
    self.write_setting(LANGUAGES_KEY, &json)
  }

  pub fn read_language_pair(&self) -> Result<Option<LanguagePair>, CacheError> {
    let Some(json) = self.read_setting(LANGUAGES_KEY)? else {
      return Ok(None);
    };
    match serde_json::from_str(&json) {
      Ok(pair) => Ok(Some(pair)),
      Err(e) => {
        tracing::warn!("corrupt language pair record: {}", e);
        Ok(None)
      }
    }
  }

  /// Persist the selected topic names as a comma-joined list, matching
  /// the simple key-value shape the UI settings store used.
  pub fn write_selected_topics(&self, topics: &[String]) -> Result<(), CacheError> {
    self.write_setting(TOPICS_KEY, &topics.join(","))
  }

  pub fn read_selected_topics(&self) -> Result<Vec<String>, CacheError> {
    let Some(joined) = self.read_setting(TOPICS_KEY)? else {
      return Ok(Vec::new());
    };
    Ok(
      joined
        .split(',')
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .collect(),
    )
  }
}
