use serde::{Deserialize, Serialize};

/// A single drillable vocabulary exercise.
///
/// `score` is the item's mastery score: raised and lowered by scoring
/// operations only. It is deliberately not clamped at zero — repeated
/// failure drives it negative, which keeps the sampling weight monotone
/// in the failure count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExerciseItem {
  /// Word class tag from the source file ("noun", "verb", ...)
  pub kind: String,
  /// Stable cross-language identity ("tool_hammer"); may be empty in
  /// older source files
  pub meaning_id: String,
  /// Shown to the learner, in the native language
  pub prompt: String,
  /// Expected answer, in the studied language
  pub answer: String,
  /// Optional illustration reference
  pub image_ref: Option<String>,
  /// Mastery score, starts at 0
  pub score: i32,
}

impl ExerciseItem {
  /// Identity used for mastery lookups and batch deduplication.
  /// Falls back to the answer text when the source had no meaning id.
  pub fn identity(&self) -> ItemId {
    if self.meaning_id.is_empty() {
      ItemId(self.answer.clone())
    } else {
      ItemId(self.meaning_id.clone())
    }
  }
}

/// Item identity key: the meaning id, or the answer text for items
/// without one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ItemId(pub String);

impl std::fmt::Display for ItemId {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.0)
  }
}

/// Grading state of one answer slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnswerState {
  Unchecked,
  Correct,
  Incorrect,
}

impl AnswerState {
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Unchecked => "UNCHECKED",
      Self::Correct => "CORRECT",
      Self::Incorrect => "INCORRECT",
    }
  }
}
