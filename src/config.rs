//! Client configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

fn default_request_timeout_ms() -> u64 {
  10_000
}

/// Configuration for a [`Client`](crate::Client).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
  /// Per-endpoint transport timeout, in milliseconds, used when a pending
  /// operation does not carry its own.
  #[serde(default = "default_request_timeout_ms")]
  pub request_timeout_ms: u64,
}

impl Default for ClientConfig {
  fn default() -> Self {
    Self {
      request_timeout_ms: default_request_timeout_ms(),
    }
  }
}

impl ClientConfig {
  pub fn request_timeout(&self) -> Duration {
    Duration::from_millis(self.request_timeout_ms)
  }
}
