use serde::{Deserialize, Serialize};

use super::ExerciseItem;

/// One topic's worth of exercises. One topic ↔ one source file ↔ one
/// cache entry; reloads replace the whole group, there is no partial merge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordGroup {
  pub name: String,
  pub items: Vec<ExerciseItem>,
}

impl WordGroup {
  pub fn new(name: impl Into<String>, items: Vec<ExerciseItem>) -> Self {
    Self {
      name: name.into(),
      items,
    }
  }

  /// Serialize to the persisted cache shape `{ "<topic>": [items...] }`.
  pub fn to_cache_blob(&self) -> serde_json::Result<String> {
    let mut record = serde_json::Map::new();
    record.insert(self.name.clone(), serde_json::to_value(&self.items)?);
    serde_json::to_string(&serde_json::Value::Object(record))
  }

  /// Deserialize from the persisted cache shape. Returns `None` when the
  /// blob lacks an entry for `name`.
  pub fn from_cache_blob(name: &str, blob: &str) -> serde_json::Result<Option<Self>> {
    let record: serde_json::Value = serde_json::from_str(blob)?;
    match record.get(name) {
      Some(items) => {
        let items: Vec<ExerciseItem> = serde_json::from_value(items.clone())?;
        Ok(Some(Self::new(name, items)))
      }
      None => Ok(None),
    }
  }
}

/// The active native/studied language selection.
///
/// Passed explicitly to the synchronizer and scheduler instead of being
/// read from ambient global state; persisted as its own cache record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguagePair {
  pub studied: String,
  pub native: String,
}

impl LanguagePair {
  pub fn new(studied: impl Into<String>, native: impl Into<String>) -> Self {
    Self {
      studied: studied.into(),
      native: native.into(),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::ExerciseItem;

  fn hammer_group() -> WordGroup {
    WordGroup::new(
      "Tools",
      vec![ExerciseItem {
        kind: "noun".to_string(),
        meaning_id: "tool_hammer".to_string(),
        prompt: "hammer".to_string(),
        answer: "Hammer".to_string(),
        image_ref: None,
        score: 3,
      }],
    )
  }

  #[test]
  fn test_cache_blob_round_trip() {
    let group = hammer_group();
    let blob = group.to_cache_blob().unwrap();
    let restored = WordGroup::from_cache_blob("Tools", &blob).unwrap().unwrap();
    assert_eq!(restored, group);
  }

  #[test]
  fn test_cache_blob_wrong_topic_is_none() {
    let blob = hammer_group().to_cache_blob().unwrap();
    assert!(WordGroup::from_cache_blob("Animals", &blob).unwrap().is_none());
  }

  #[test]
  fn test_language_pair_json_shape() {
    let pair = LanguagePair::new("de", "en");
    let json = serde_json::to_string(&pair).unwrap();
    assert_eq!(json, r#"{"studied":"de","native":"en"}"#);
  }
}
