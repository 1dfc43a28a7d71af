//! Weighted index sampling over a prefix-sum table.
//!
//! Lower mastery score ⇒ higher weight ⇒ more likely to be drawn. The
//! draw is a uniform point in `[0, total)` located by lower-bound binary
//! search over the cumulative sums, so a single draw costs O(log n).

use rand::Rng;

use crate::config;

/// Misuse of the sampler. An empty weight sequence is a programming
/// error at the call site and fails loudly, never silently returning a
/// default index.
#[derive(Debug, PartialEq, Eq)]
pub enum SamplerError {
  EmptyWeights,
}

impl std::fmt::Display for SamplerError {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      SamplerError::EmptyWeights => write!(f, "cannot sample from an empty weight sequence"),
    }
  }
}

impl std::error::Error for SamplerError {}

/// Selection weight for a mastery score: `max(1, 5 - score)`.
///
/// The floor of 1 guarantees every item stays reachable no matter how
/// high its score climbs; unclamped negative scores keep raising the
/// weight of items the learner repeatedly misses.
pub fn sampling_weight(score: i32) -> u32 {
  (config::WEIGHT_BASE - score).max(config::WEIGHT_FLOOR as i32) as u32
}

/// Prefix-sum table over a non-empty weight sequence.
#[derive(Debug, Clone)]
pub struct CumulativeWeights {
  cum: Vec<u64>,
}

impl CumulativeWeights {
  /// Build the table. Every weight must already be `>= 1`; callers apply
  /// the floor via [`sampling_weight`].
  pub fn new(weights: &[u32]) -> Result<Self, SamplerError> {
    if weights.is_empty() {
      return Err(SamplerError::EmptyWeights);
    }
    let mut cum = Vec::with_capacity(weights.len());
    let mut total = 0u64;
    for &w in weights {
      total += w as u64;
      cum.push(total);
    }
    Ok(Self { cum })
  }

  fn total(&self) -> u64 {
    *self.cum.last().unwrap_or(&0)
  }

  /// Draw an index with probability `weights[i] / total`.
  pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> usize {
    let point = rng.random::<f64>() * self.total() as f64;
    self.lower_bound(point)
  }

  /// First index whose cumulative sum exceeds `point`; ties break toward
  /// the smaller index.
  fn lower_bound(&self, point: f64) -> usize {
    let mut low = 0;
    let mut high = self.cum.len() - 1;
    while low < high {
      let mid = (low + high) / 2;
      if point < self.cum[mid] as f64 {
        high = mid;
      } else {
        low = mid + 1;
      }
    }
    low
  }
}
