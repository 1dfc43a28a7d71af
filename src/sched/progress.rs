//! Two-state progression deciding when the learner advances from the
//! practiced pool to a fresh set of items and back.
//!
//! `progress` is a cursor into the session's ordered item list: items
//! below it are in rotation, items at or above it are not yet introduced.
//! It only ever moves forward, clamped to the total item count.

use std::ops::Range;

use crate::config;
use crate::domain::ExerciseItem;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
  /// Drilling the freshly introduced `[progress, progress + increment)` slice
  NewSet,
  /// Rotating over everything introduced so far, `[0, progress)`
  Practicing,
}

impl Mode {
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::NewSet => "NewSet",
      Self::Practicing => "Practicing",
    }
  }
}

#[derive(Debug, Clone)]
pub struct ProgressStateMachine {
  progress: usize,
  total: usize,
  increment: usize,
  mode: Mode,
}

impl ProgressStateMachine {
  /// Fresh machine for a newly loaded item list: practicing, with the
  /// first `initial` items introduced.
  pub fn new(total: usize, initial: usize, increment: usize) -> Self {
    Self {
      progress: initial.min(total),
      total,
      increment,
      mode: Mode::Practicing,
    }
  }

  pub fn with_defaults(total: usize) -> Self {
    Self::new(total, config::INITIAL_PROGRESS, config::PROGRESS_INCREMENT)
  }

  pub fn progress(&self) -> usize {
    self.progress
  }

  pub fn mode(&self) -> Mode {
    self.mode
  }

  /// Item range the next batch is drawn from.
  pub fn batch_range(&self) -> Range<usize> {
    match self.mode {
      Mode::Practicing => 0..self.progress,
      Mode::NewSet => self.progress..(self.progress + self.increment).min(self.total),
    }
  }

  /// Evaluate transitions after a scored round. No transition fires while
  /// any item in the checked range is below its threshold; the learner is
  /// re-served another batch from the same range.
  pub fn on_round_scored(&mut self, items: &[ExerciseItem]) {
    match self.mode {
      Mode::NewSet => {
        let range = self.batch_range();
        if items[range.clone()].iter().all(|i| i.score >= config::NEW_SET_MASTERY) {
          self.progress = range.end;
          self.mode = Mode::Practicing;
        }
      }
      Mode::Practicing => {
        let practiced_mastered = items[..self.progress]
          .iter()
          .all(|i| i.score >= config::PRACTICING_MASTERY);
        // At the end of the list there is nothing left to introduce
        if practiced_mastered && self.progress < self.total {
          self.mode = Mode::NewSet;
        }
      }
    }
  }

  /// Nothing further to introduce and the whole practiced pool holds its
  /// threshold — the caller may switch to exam mode.
  pub fn is_complete(&self, items: &[ExerciseItem]) -> bool {
    self.progress == self.total
      && items[..self.progress]
        .iter()
        .all(|i| i.score >= config::PRACTICING_MASTERY)
  }
}
