//! Per-item mastery scores and the scoring policies that mutate them.
//!
//! Scores live on the items themselves (keyed by stable meaning id via
//! [`ItemId`]), not in a side table keyed by the surface word — surface-word
//! keying collides when two topics share a spelling with different meanings.

use std::collections::HashMap;

use crate::domain::{ExerciseItem, ItemId};

/// How a scored answer adjusts an item's mastery score.
///
/// The two policies are intentionally distinct: exam grading never
/// penalizes a wrong answer, practice grading does. Kept as named
/// policies pending product clarification rather than silently unified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoringPolicy {
  /// +1 on correct, -1 on incorrect
  Practice,
  /// +1 on correct, 0 on incorrect
  Exam,
}

impl ScoringPolicy {
  pub fn delta(self, correct: bool) -> i32 {
    match self {
      Self::Practice => {
        if correct {
          1
        } else {
          -1
        }
      }
      Self::Exam => {
        if correct {
          1
        } else {
          0
        }
      }
    }
  }
}

/// Index from item identity to position in a session's flat item list.
///
/// The store never owns scores; it locates the item and applies the
/// policy delta to `item.score` in place.
#[derive(Debug, Clone, Default)]
pub struct MasteryStore {
  index: HashMap<ItemId, usize>,
}

impl MasteryStore {
  /// Build the index over a flat, identity-deduplicated item list.
  pub fn build(items: &[ExerciseItem]) -> Self {
    let index = items
      .iter()
      .enumerate()
      .map(|(pos, item)| (item.identity(), pos))
      .collect();
    Self { index }
  }

  pub fn position(&self, id: &ItemId) -> Option<usize> {
    self.index.get(id).copied()
  }

  pub fn score(&self, items: &[ExerciseItem], id: &ItemId) -> Option<i32> {
    self.position(id).map(|pos| items[pos].score)
  }

  /// Apply the policy's delta for one answer. Returns the new score, or
  /// `None` for an unknown identity (logged, not an error — the host may
  /// report answers for items from a previous topic selection).
  pub fn apply(
    &self,
    items: &mut [ExerciseItem],
    id: &ItemId,
    correct: bool,
    policy: ScoringPolicy,
  ) -> Option<i32> {
    match self.position(id) {
      Some(pos) => {
        items[pos].score += policy.delta(correct);
        Some(items[pos].score)
      }
      None => {
        tracing::warn!("score update for unknown item {}", id);
        None
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::testing::item;

  fn items() -> Vec<ExerciseItem> {
    vec![item("id_1", "eins", 0), item("id_2", "zwei", 0)]
  }

  #[test]
  fn test_practice_policy_is_symmetric() {
    assert_eq!(ScoringPolicy::Practice.delta(true), 1);
    assert_eq!(ScoringPolicy::Practice.delta(false), -1);
  }

  #[test]
  fn test_exam_policy_never_penalizes() {
    assert_eq!(ScoringPolicy::Exam.delta(true), 1);
    assert_eq!(ScoringPolicy::Exam.delta(false), 0);
  }

  #[test]
  fn test_apply_updates_item_in_place() {
    let mut items = items();
    let store = MasteryStore::build(&items);
    let id = ItemId("id_1".to_string());

    assert_eq!(store.apply(&mut items, &id, true, ScoringPolicy::Practice), Some(1));
    assert_eq!(items[0].score, 1);
    assert_eq!(items[1].score, 0);
  }

  #[test]
  fn test_score_can_go_negative() {
    let mut items = items();
    let store = MasteryStore::build(&items);
    let id = ItemId("id_2".to_string());

    for _ in 0..3 {
      store.apply(&mut items, &id, false, ScoringPolicy::Practice);
    }
    assert_eq!(store.score(&items, &id), Some(-3));
  }

  #[test]
  fn test_unknown_identity_is_ignored() {
    let mut items = items();
    let store = MasteryStore::build(&items);
    let id = ItemId("missing".to_string());

    assert_eq!(store.apply(&mut items, &id, true, ScoringPolicy::Practice), None);
    assert!(items.iter().all(|i| i.score == 0));
  }
}
