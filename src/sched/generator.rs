//! Practice batch generation: a bounded, duplicate-free draw from an
//! eligible slice of the session's item list.

use rand::Rng;

use crate::config;
use crate::domain::ExerciseItem;
use crate::sched::sampler::{sampling_weight, CumulativeWeights};

/// Draw `batch_size` distinct item indices from
/// `items[range_start .. range_start + range_count)`, weighted by
/// current mastery scores. Returned indices are positions in `items`.
///
/// When the eligible slice has fewer elements than `batch_size` the whole
/// slice is returned unmodified — a deliberate short-circuit, not an error.
///
/// Distinctness comes from rejection sampling: weights are recomputed from
/// the static scores, not depleted after each draw. Acceptable because
/// `batch_size` is small relative to the pool in intended use; a retry cap
/// with a sequential-scan fallback bounds the loop when the pool is nearly
/// exhausted of distinct draws.
pub fn generate_batch<R: Rng + ?Sized>(
  items: &[ExerciseItem],
  range_start: usize,
  range_count: usize,
  batch_size: usize,
  rng: &mut R,
) -> Vec<usize> {
  let range_end = (range_start + range_count).min(items.len());
  let range_start = range_start.min(range_end);
  let eligible = range_end - range_start;

  if eligible < batch_size {
    return (range_start..range_end).collect();
  }
  if batch_size == 0 {
    return Vec::new();
  }

  let weights: Vec<u32> = items[range_start..range_end]
    .iter()
    .map(|item| sampling_weight(item.score))
    .collect();
  // eligible >= batch_size >= 1, so the slice is non-empty
  let cum = CumulativeWeights::new(&weights).expect("eligible slice is non-empty");

  let mut batch: Vec<usize> = Vec::with_capacity(batch_size);
  while batch.len() < batch_size {
    let mut attempts = 0;
    let mut candidate = range_start + cum.sample(rng);
    while batch.contains(&candidate) {
      attempts += 1;
      if attempts >= config::MAX_REDRAW_ATTEMPTS {
        candidate = scan_unused(range_start, range_end, &batch);
        break;
      }
      candidate = range_start + cum.sample(rng);
    }
    batch.push(candidate);
  }
  batch
}

/// First index in the range not yet drawn. Only reached when rejection
/// sampling hit its retry cap, and `eligible >= batch_size` guarantees an
/// unused index exists.
fn scan_unused(range_start: usize, range_end: usize, batch: &[usize]) -> usize {
  (range_start..range_end)
    .find(|idx| !batch.contains(idx))
    .expect("batch is smaller than the eligible range")
}
