//! Session facade tying the cache, catalog and scheduling algorithms
//! together behind the surface the host runtime consumes.

use rand::Rng;
use std::sync::Arc;

use crate::cache::{CacheError, CacheSynchronizer, LogOnError, TopicFetcher};
use crate::catalog::ExerciseCatalog;
use crate::config;
use crate::domain::{ExerciseItem, ItemId, LanguagePair};
use crate::mastery::{MasteryStore, ScoringPolicy};
use crate::sched::{generate_batch, grade_exam, ExamOutcome, ExamSheet, ProgressStateMachine};

/// Coarse session state reported to the host through
/// [`HostHooks::on_state_change`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
  /// No topics resolved yet
  Idle,
  /// Practice rounds in progress
  Practice,
  /// An exam sheet is prepared and awaiting submission
  Exam,
}

impl SessionState {
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Idle => "Idle",
      Self::Practice => "Practice",
      Self::Exam => "Exam",
    }
  }
}

/// Capability interface injected by the host runtime at construction.
///
/// Replaces the imperative host-callback bridge: the scheduler knows
/// nothing about the runtime beyond these three notifications.
pub trait HostHooks: Send + Sync {
  fn on_assets_loaded(&self) {}
  fn on_exam_requested(&self, _question_count: usize) {}
  fn on_state_change(&self, _state: SessionState) {}
}

/// No-op hooks for hosts that poll instead of listening.
pub struct NullHooks;

impl HostHooks for NullHooks {}

/// Drives one learner session: which exercises to serve next, how scored
/// rounds feed back into mastery, and when the cache is consulted.
///
/// One active session at a time by design; item scores are only ever
/// mutated through this type's scoring steps.
pub struct DrillScheduler<F: TopicFetcher> {
  synchronizer: CacheSynchronizer<F>,
  hooks: Arc<dyn HostHooks>,
  catalog: ExerciseCatalog,
  items: Vec<ExerciseItem>,
  mastery: MasteryStore,
  progress: ProgressStateMachine,
  exam: Option<ExamSheet>,
  state: SessionState,
  last_exam_passed: Option<bool>,
}

impl<F: TopicFetcher> DrillScheduler<F> {
  pub fn new(synchronizer: CacheSynchronizer<F>, hooks: Arc<dyn HostHooks>) -> Self {
    Self {
      synchronizer,
      hooks,
      catalog: ExerciseCatalog::default(),
      items: Vec::new(),
      mastery: MasteryStore::default(),
      progress: ProgressStateMachine::with_defaults(0),
      exam: None,
      state: SessionState::Idle,
      last_exam_passed: None,
    }
  }

  pub fn items(&self) -> &[ExerciseItem] {
    &self.items
  }

  pub fn catalog(&self) -> &ExerciseCatalog {
    &self.catalog
  }

  pub fn state(&self) -> SessionState {
    self.state
  }

  pub fn language_pair(&self) -> LanguagePair {
    self.synchronizer.language_pair()
  }

  fn enter(&mut self, state: SessionState) {
    if self.state != state {
      self.state = state;
      self.hooks.on_state_change(state);
    }
  }

  /// Rebuild the session over freshly resolved groups: flatten, reindex,
  /// reset the progress cursor.
  fn install_catalog(&mut self, catalog: ExerciseCatalog) {
    self.catalog = catalog;
    self.items = self.catalog.flatten();
    self.mastery = MasteryStore::build(&self.items);
    self.progress = ProgressStateMachine::with_defaults(self.items.len());
    self.exam = None;
    tracing::info!(
      "session over {} topic(s), {} item(s)",
      self.catalog.groups().len(),
      self.items.len()
    );
  }

  /// Resolve a topic selection (cache-first) and start a session over it.
  pub async fn resolve_topics(&mut self, names: &[String]) -> Result<&[ExerciseItem], CacheError> {
    self.synchronizer.invalidate_in_flight();
    let groups = self.synchronizer.resolve_many(names).await?;
    self
      .synchronizer
      .persist_selected_topics(names)
      .log_warn("failed to persist topic selection");

    self.install_catalog(ExerciseCatalog::new(groups));
    self.hooks.on_assets_loaded();
    self.enter(if self.items.is_empty() {
      SessionState::Idle
    } else {
      SessionState::Practice
    });
    Ok(&self.items)
  }

  /// Change the language pair and reload the current topics from the
  /// network (cache copies are for the old pair).
  pub async fn set_language_pair(&mut self, pair: LanguagePair) -> Result<(), CacheError> {
    self.synchronizer.set_language_pair(pair)?;
    let names = self.catalog.topic_names();
    let groups = self.synchronizer.force_reload_many(&names).await?;
    self.install_catalog(ExerciseCatalog::new(groups));
    self.enter(if self.items.is_empty() {
      SessionState::Idle
    } else {
      SessionState::Practice
    });
    Ok(())
  }

  /// Restore the persisted topic selection from a previous run.
  pub fn persisted_topics(&self) -> Vec<String> {
    self
      .synchronizer
      .selected_topics()
      .log_warn("failed to read persisted topic selection")
      .unwrap_or_default()
  }

  /// Item indices for the next practice round, drawn from the range the
  /// progress machine is currently drilling.
  pub fn next_batch<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<usize> {
    let range = self.progress.batch_range();
    generate_batch(
      &self.items,
      range.start,
      range.end - range.start,
      config::PRACTICE_BATCH_SIZE,
      rng,
    )
  }

  /// Record one practice answer (symmetric scoring).
  pub fn record_answer(&mut self, id: &ItemId, correct: bool) {
    self
      .mastery
      .apply(&mut self.items, id, correct, ScoringPolicy::Practice);
  }

  /// Evaluate state-machine transitions after a fully scored round.
  pub fn finish_round(&mut self) {
    self.progress.on_round_scored(&self.items);
  }

  /// The progress machine has introduced everything and the pool holds
  /// its threshold — the host may switch to exam mode.
  pub fn ready_for_exam(&self) -> bool {
    !self.items.is_empty() && self.progress.is_complete(&self.items)
  }

  /// Prepare an exam over a shuffled subset and notify the host.
  pub fn start_exam<R: Rng + ?Sized>(&mut self, question_count: usize, rng: &mut R) {
    let sheet = ExamSheet::prepare(self.items.len(), question_count, rng);
    let count = sheet.question_count();
    self.exam = Some(sheet);
    self.enter(SessionState::Exam);
    self.hooks.on_exam_requested(count);
  }

  pub fn exam(&self) -> Option<&ExamSheet> {
    self.exam.as_ref()
  }

  /// Grade a submission against the prepared sheet (exam scoring: no
  /// penalty on miss). `None` when no exam is in progress.
  pub fn submit_exam(&mut self, answers: &[String]) -> Option<ExamOutcome> {
    let sheet = self.exam.as_mut()?;
    let outcome = grade_exam(sheet, answers, &mut self.items, ScoringPolicy::Exam);
    self.on_exam_result(outcome.passed);
    Some(outcome)
  }

  /// Re-permute the same exam subset for another attempt.
  pub fn retry_exam<R: Rng + ?Sized>(&mut self, rng: &mut R) {
    if let Some(sheet) = self.exam.as_mut() {
      sheet.retry(rng);
      self.enter(SessionState::Exam);
    }
  }

  /// Host callback with the exam verdict; closes the exam and returns
  /// the session to practice.
  pub fn on_exam_result(&mut self, passed: bool) {
    tracing::info!("exam finished: {}", if passed { "passed" } else { "failed" });
    self.last_exam_passed = Some(passed);
    self.enter(SessionState::Practice);
  }

  pub fn last_exam_passed(&self) -> Option<bool> {
    self.last_exam_passed
  }
}
