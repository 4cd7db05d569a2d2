//! Transport capability.
//!
//! The driver fans a pending network operation out to every listed endpoint;
//! each individual call goes through the [`Transport`] trait. Implementations
//! are injected per client instance, so embedders can replace HTTP with
//! anything that maps `(endpoint, payload)` to a response body.

mod http;

pub use http::HttpTransport;

use async_trait::async_trait;

/// Error type for transport calls.
///
/// One endpoint's failure is recorded into that endpoint's output slot and
/// never aborts the fan-out, so these errors stay per-call.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
  /// The endpoint is not something this transport can talk to.
  #[error("invalid endpoint: {0}")]
  InvalidEndpoint(String),

  /// The request itself failed. The message is recorded verbatim.
  #[error("{0}")]
  Failed(String),

  /// An HTTP-level failure (connection, status, body read).
  #[error(transparent)]
  Http(#[from] reqwest::Error),
}

/// A single outbound request to a single endpoint.
#[async_trait]
pub trait Transport: Send + Sync {
  /// Send `payload` to `endpoint` and return the response body.
  async fn fetch(&self, endpoint: &str, payload: &str) -> Result<String, TransportError>;
}
