//! Engine configuration constants and layered path/URL loading.
//!
//! Tunables that were previously scattered through the UI layer live here.
//! File-system and network locations load with priority:
//! config.toml > .env > default.

use serde::Deserialize;
use std::path::PathBuf;

// ==================== Scheduling Configuration ====================

/// Items introduced before the first practice round
pub const INITIAL_PROGRESS: usize = 5;

/// Items added to the active pool on each new-set advance
pub const PROGRESS_INCREMENT: usize = 5;

/// Items served per practice round
pub const PRACTICE_BATCH_SIZE: usize = 3;

/// Score a new-set item must reach before the pool advances
pub const NEW_SET_MASTERY: i32 = 2;

/// Score every practiced item must reach before a new set is introduced
pub const PRACTICING_MASTERY: i32 = 1;

/// Sampling weight is `max(WEIGHT_FLOOR, WEIGHT_BASE - score)`
pub const WEIGHT_BASE: i32 = 5;

/// Floor keeping every item reachable regardless of score
pub const WEIGHT_FLOOR: u32 = 1;

/// Collisions tolerated during distinct-batch rejection sampling before
/// falling back to a sequential scan
pub const MAX_REDRAW_ATTEMPTS: usize = 64;

// ==================== Exam Configuration ====================

/// Fraction of correct answers that must be strictly exceeded to pass
pub const EXAM_PASS_RATIO: f64 = 0.75;

// ==================== Cache Configuration ====================

/// Configuration file structure for config.toml
#[derive(Debug, Deserialize)]
struct AppConfig {
  cache: Option<CacheConfig>,
}

#[derive(Debug, Deserialize)]
struct CacheConfig {
  data_dir: Option<String>,
  exercise_base_url: Option<String>,
}

fn load_cache_config() -> Option<CacheConfig> {
  let contents = std::fs::read_to_string("config.toml").ok()?;
  toml::from_str::<AppConfig>(&contents).ok()?.cache
}

/// Load the cache database directory with priority: config.toml > .env > default
pub fn load_data_dir() -> PathBuf {
  let _ = dotenvy::dotenv();

  if let Some(cache) = load_cache_config() {
    if let Some(dir) = cache.data_dir {
      tracing::info!("Using data dir from config.toml: {}", dir);
      return PathBuf::from(dir);
    }
  }

  if let Ok(dir) = std::env::var("WORDDRILL_DATA_DIR") {
    tracing::info!("Using data dir from WORDDRILL_DATA_DIR env: {}", dir);
    return PathBuf::from(dir);
  }

  let default = PathBuf::from("data");
  tracing::info!("Using default data dir: {}", default.display());
  default
}

/// Base URL the topic fetcher resolves `<topic>.csv` against, with priority:
/// config.toml > .env > default
pub fn load_exercise_base_url() -> String {
  let _ = dotenvy::dotenv();

  if let Some(cache) = load_cache_config() {
    if let Some(url) = cache.exercise_base_url {
      tracing::info!("Using exercise base URL from config.toml: {}", url);
      return url;
    }
  }

  if let Ok(url) = std::env::var("WORDDRILL_EXERCISE_URL") {
    tracing::info!("Using exercise base URL from env: {}", url);
    return url;
  }

  "http://localhost:8080/Exercises".to_string()
}

/// Cache database filename inside the data dir
pub const CACHE_DB_FILE: &str = "worddrill.db";

/// Get the full cache database path
pub fn cache_db_path() -> PathBuf {
  load_data_dir().join(CACHE_DB_FILE)
}
