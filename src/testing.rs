//! Shared test fixtures: canned topic files, a counting stub fetcher and
//! recording host hooks.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::cache::{FetchError, TopicFetcher};
use crate::domain::ExerciseItem;
use crate::scheduler::{HostHooks, SessionState};

/// The smallest valid topic file: one data row, trailing newline.
pub const HAMMER_CSV: &str = "kind,en,de,meaningId\nnoun,hammer,Hammer,tool_hammer\n";

pub const TOOLS_CSV: &str =
  "kind,en,de,meaningId\nnoun,hammer,Hammer,tool_hammer\nnoun,saw,Säge,tool_saw\n";

/// Build an exercise item with the common fields filled in.
pub fn item(meaning_id: &str, answer: &str, score: i32) -> ExerciseItem {
  ExerciseItem {
    kind: "noun".to_string(),
    meaning_id: meaning_id.to_string(),
    prompt: format!("{}_prompt", meaning_id),
    answer: answer.to_string(),
    image_ref: None,
    score,
  }
}

/// In-memory topic source counting every fetch; flips offline on demand.
#[derive(Default)]
pub struct StubFetcher {
  topics: Mutex<HashMap<String, String>>,
  fetches: AtomicUsize,
  offline: AtomicBool,
}

impl StubFetcher {
  pub fn with_topic(name: &str, raw: &str) -> Self {
    Self::with_topics(&[(name, raw)])
  }

  pub fn with_topics(entries: &[(&str, &str)]) -> Self {
    let fetcher = Self::default();
    for (name, raw) in entries {
      fetcher.set_topic(name, raw);
    }
    fetcher
  }

  pub fn set_topic(&self, name: &str, raw: &str) {
    self
      .topics
      .lock()
      .unwrap()
      .insert(name.to_string(), raw.to_string());
  }

  pub fn set_offline(&self, offline: bool) {
    self.offline.store(offline, Ordering::SeqCst);
  }

  pub fn fetch_count(&self) -> usize {
    self.fetches.load(Ordering::SeqCst)
  }

  pub fn reset_count(&self) {
    self.fetches.store(0, Ordering::SeqCst);
  }
}

impl TopicFetcher for StubFetcher {
  async fn fetch_raw(&self, topic: &str) -> Result<String, FetchError> {
    self.fetches.fetch_add(1, Ordering::SeqCst);
    if self.offline.load(Ordering::SeqCst) {
      return Err(FetchError::Offline("stub offline".to_string()));
    }
    self
      .topics
      .lock()
      .unwrap()
      .get(topic)
      .cloned()
      .ok_or(FetchError::Status(404))
  }
}

/// Host hooks that record every notification for assertions.
#[derive(Default)]
pub struct RecordingHooks {
  assets: AtomicUsize,
  exams: Mutex<Vec<usize>>,
  state_log: Mutex<Vec<SessionState>>,
}

impl RecordingHooks {
  pub fn assets_loaded(&self) -> usize {
    self.assets.load(Ordering::SeqCst)
  }

  pub fn exam_requests(&self) -> Vec<usize> {
    self.exams.lock().unwrap().clone()
  }

  pub fn states(&self) -> Vec<SessionState> {
    self.state_log.lock().unwrap().clone()
  }
}

impl HostHooks for RecordingHooks {
  fn on_assets_loaded(&self) {
    self.assets.fetch_add(1, Ordering::SeqCst);
  }

  fn on_exam_requested(&self, question_count: usize) {
    self.exams.lock().unwrap().push(question_count);
  }

  fn on_state_change(&self, state: SessionState) {
    self.state_log.lock().unwrap().push(state);
  }
}
