//! Immutable-per-load collection of parsed exercise items grouped by topic.

use std::collections::HashSet;

use crate::domain::{ExerciseItem, ItemId, WordGroup};

/// All topics loaded for the current session, in resolve order.
///
/// Replaced wholesale whenever the topic selection or language pair
/// changes; individual groups are never merged in place.
#[derive(Debug, Clone, Default)]
pub struct ExerciseCatalog {
  groups: Vec<WordGroup>,
}

impl ExerciseCatalog {
  pub fn new(groups: Vec<WordGroup>) -> Self {
    Self { groups }
  }

  pub fn groups(&self) -> &[WordGroup] {
    &self.groups
  }

  pub fn topic_names(&self) -> Vec<String> {
    self.groups.iter().map(|g| g.name.clone()).collect()
  }

  pub fn is_empty(&self) -> bool {
    self.groups.iter().all(|g| g.items.is_empty())
  }

  /// Flatten all topics into one ordered item list, dropping later items
  /// whose identity already appeared. The flat list backs a session's
  /// progress cursor and mastery index, so each identity appears once.
  pub fn flatten(&self) -> Vec<ExerciseItem> {
    let mut seen: HashSet<ItemId> = HashSet::new();
    let mut items = Vec::new();
    for group in &self.groups {
      for item in &group.items {
        if seen.insert(item.identity()) {
          items.push(item.clone());
        }
      }
    }
    items
  }
}
