//! One-shot scored exam over a shuffled subset of the full item list.

use rand::Rng;

use crate::config;
use crate::domain::{AnswerState, ExerciseItem};
use crate::mastery::ScoringPolicy;

/// A prepared exam: a fixed question order over the item list plus the
/// grading state of each slot.
#[derive(Debug, Clone)]
pub struct ExamSheet {
  /// Item indices in presentation order
  order: Vec<usize>,
  states: Vec<AnswerState>,
}

/// Result of grading one submission.
#[derive(Debug, Clone, PartialEq)]
pub struct ExamOutcome {
  pub states: Vec<AnswerState>,
  pub correct: usize,
  pub total: usize,
  pub passed: bool,
}

impl ExamSheet {
  /// Shuffle `0..total` with an unbiased Fisher–Yates pass and keep the
  /// first `question_count` positions.
  pub fn prepare<R: Rng + ?Sized>(total: usize, question_count: usize, rng: &mut R) -> Self {
    let mut order: Vec<usize> = (0..total).collect();
    permute(&mut order, rng);
    order.truncate(question_count);
    let states = vec![AnswerState::Unchecked; order.len()];
    Self { order, states }
  }

  pub fn question_count(&self) -> usize {
    self.order.len()
  }

  /// Item index presented in slot `slot`.
  pub fn item_at(&self, slot: usize) -> usize {
    self.order[slot]
  }

  pub fn states(&self) -> &[AnswerState] {
    &self.states
  }

  /// Reset for another attempt over the same subset: states back to
  /// unchecked, presentation order re-permuted. Does not redraw from the
  /// catalog.
  pub fn retry<R: Rng + ?Sized>(&mut self, rng: &mut R) {
    permute(&mut self.order, rng);
    self.states.fill(AnswerState::Unchecked);
  }
}

/// In-place unbiased permutation: for each position, swap with a uniform
/// index in `[i, len)`.
pub fn permute<T, R: Rng + ?Sized>(values: &mut [T], rng: &mut R) {
  let len = values.len();
  for i in 0..len {
    let j = rng.random_range(i..len);
    values.swap(i, j);
  }
}

/// Grade a submission against the expected answers (exact, case-sensitive
/// equality) and apply the scoring policy to each matched item.
///
/// Missing answer slots grade as incorrect. `passed` requires the correct
/// fraction to strictly exceed the pass ratio: 3 of 4 is 0.75 exactly and
/// fails.
pub fn grade_exam(
  sheet: &mut ExamSheet,
  answers: &[String],
  items: &mut [ExerciseItem],
  policy: ScoringPolicy,
) -> ExamOutcome {
  let total = sheet.order.len();
  let mut correct = 0;

  for (slot, &item_idx) in sheet.order.iter().enumerate() {
    let given = answers.get(slot).map(String::as_str).unwrap_or("");
    let is_correct = given == items[item_idx].answer;
    sheet.states[slot] = if is_correct {
      correct += 1;
      AnswerState::Correct
    } else {
      AnswerState::Incorrect
    };
    items[item_idx].score += policy.delta(is_correct);
  }

  let passed = total > 0 && (correct as f64 / total as f64) > config::EXAM_PASS_RATIO;
  ExamOutcome {
    states: sheet.states.clone(),
    correct,
    total,
    passed,
  }
}
