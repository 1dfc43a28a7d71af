//! Delimited topic-file parsing.
//!
//! Format: line 0 is a header `kind,<lang1>,<lang2>,...,meaningId[,...]`;
//! the studied/native columns are located by matching header fields
//! against the active language pair. Data rows follow in the same column
//! order. The final line is always dropped: source files end with a
//! trailing newline, so that fragment is empty (a file without the
//! trailing newline silently loses its last row — a preserved quirk of
//! the data pipeline).

use crate::domain::{ExerciseItem, LanguagePair, WordGroup};

/// Header field naming the meaning-id column
const MEANING_ID_FIELD: &str = "meaningId";

/// Parse one topic's raw text. Returns `None` when the header lacks
/// either of the pair's languages — the topic is skipped, not an error.
/// Malformed rows are skipped per line.
pub fn parse_topic(name: &str, raw: &str, pair: &LanguagePair) -> Option<WordGroup> {
  // Split keeps the empty fragment after the trailing newline; the slice
  // below drops it as the "last line".
  let lines: Vec<&str> = raw.split('\n').map(|l| l.trim_end_matches('\r')).collect();
  if lines.len() < 2 {
    tracing::warn!("topic '{}' has no data rows", name);
    return None;
  }

  let header: Vec<&str> = lines[0].split(',').map(str::trim).collect();
  let studied_col = match header.iter().position(|&f| f == pair.studied) {
    Some(col) => col,
    None => {
      tracing::warn!(
        "topic '{}' lacks studied language '{}', skipping",
        name,
        pair.studied
      );
      return None;
    }
  };
  let native_col = match header.iter().position(|&f| f == pair.native) {
    Some(col) => col,
    None => {
      tracing::warn!(
        "topic '{}' lacks native language '{}', skipping",
        name,
        pair.native
      );
      return None;
    }
  };
  let meaning_col = header.iter().position(|&f| f == MEANING_ID_FIELD);

  let mut items = Vec::new();
  for (line_no, line) in lines[1..lines.len() - 1].iter().enumerate() {
    match parse_row(line, studied_col, native_col, meaning_col) {
      Some(item) => items.push(item),
      None => {
        tracing::warn!("topic '{}': skipping malformed row {}", name, line_no + 1);
      }
    }
  }

  Some(WordGroup::new(name, items))
}

fn parse_row(
  line: &str,
  studied_col: usize,
  native_col: usize,
  meaning_col: Option<usize>,
) -> Option<ExerciseItem> {
  let fields: Vec<&str> = line.split(',').collect();
  let kind = fields.first()?.trim();
  let answer = fields.get(studied_col)?.trim();
  let prompt = fields.get(native_col)?.trim();
  if answer.is_empty() || prompt.is_empty() {
    return None;
  }
  let meaning_id = meaning_col
    .and_then(|col| fields.get(col))
    .map(|f| f.replace(' ', ""))
    .unwrap_or_default();

  Some(ExerciseItem {
    kind: kind.to_string(),
    meaning_id,
    prompt: prompt.to_string(),
    answer: answer.to_string(),
    image_ref: None,
    score: 0,
  })
}
