//! Network source for raw topic files.

use std::future::Future;

/// Why a topic fetch failed. `Offline` (no route, timeout) is what the
/// force-reload path treats as "fall back to the cached copy"; other
/// variants just drop the topic from the result set.
#[derive(Debug)]
pub enum FetchError {
  /// Connectivity-level failure: connection refused, DNS, timeout
  Offline(String),
  /// Server answered with a non-2xx status
  Status(u16),
  /// Body could not be read
  Body(String),
}

impl std::fmt::Display for FetchError {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      FetchError::Offline(e) => write!(f, "network unreachable: {}", e),
      FetchError::Status(code) => write!(f, "server returned status {}", code),
      FetchError::Body(e) => write!(f, "failed to read response body: {}", e),
    }
  }
}

impl std::error::Error for FetchError {}

impl FetchError {
  pub fn is_offline(&self) -> bool {
    matches!(self, FetchError::Offline(_))
  }
}

/// Source of raw delimited topic text, keyed by topic name. The
/// synchronizer is generic over this so tests can substitute a stub and
/// count fetches.
pub trait TopicFetcher: Send + Sync {
  fn fetch_raw(&self, topic: &str) -> impl Future<Output = Result<String, FetchError>> + Send;
}

/// Fetches `{base_url}/{topic}.csv` over HTTP.
pub struct HttpTopicFetcher {
  client: reqwest::Client,
  base_url: String,
}

impl HttpTopicFetcher {
  /// Fetcher over the configured exercise base URL.
  pub fn from_config() -> Self {
    Self::new(crate::config::load_exercise_base_url())
  }

  pub fn new(base_url: impl Into<String>) -> Self {
    Self {
      client: reqwest::Client::new(),
      base_url: base_url.into(),
    }
  }

  fn topic_url(&self, topic: &str) -> String {
    format!("{}/{}.csv", self.base_url.trim_end_matches('/'), topic)
  }
}

impl TopicFetcher for HttpTopicFetcher {
  async fn fetch_raw(&self, topic: &str) -> Result<String, FetchError> {
    let url = self.topic_url(topic);
    let response = self.client.get(&url).send().await.map_err(|e| {
      if e.is_connect() || e.is_timeout() {
        FetchError::Offline(e.to_string())
      } else {
        FetchError::Body(e.to_string())
      }
    })?;

    let status = response.status();
    if !status.is_success() {
      return Err(FetchError::Status(status.as_u16()));
    }
    response
      .text()
      .await
      .map_err(|e| FetchError::Body(e.to_string()))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_topic_url_joins_cleanly() {
    let fetcher = HttpTopicFetcher::new("http://localhost:8080/Exercises/");
    assert_eq!(
      fetcher.topic_url("Tools"),
      "http://localhost:8080/Exercises/Tools.csv"
    );
  }

  #[test]
  fn test_offline_classification() {
    assert!(FetchError::Offline("refused".into()).is_offline());
    assert!(!FetchError::Status(404).is_offline());
  }
}
