//! Default HTTP transport.

use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use tracing::debug;
use url::Url;

use crate::{Transport, TransportError};

/// The default transport: a JSON POST to the endpoint.
///
/// Only `http` and `https` endpoints are accepted. Timeouts are not applied
/// here - the driver wraps every fan-out call with the pending operation's
/// timeout so that a slow endpoint is recorded as that endpoint's failure.
#[derive(Debug, Clone, Default)]
pub struct HttpTransport {
  client: reqwest::Client,
}

impl HttpTransport {
  pub fn new() -> Self {
    Self::default()
  }

  /// Build on top of a preconfigured reqwest client (proxies, TLS, etc.).
  pub fn with_client(client: reqwest::Client) -> Self {
    Self { client }
  }
}

#[async_trait]
impl Transport for HttpTransport {
  async fn fetch(&self, endpoint: &str, payload: &str) -> Result<String, TransportError> {
    let url =
      Url::parse(endpoint).map_err(|e| TransportError::InvalidEndpoint(format!("{endpoint}: {e}")))?;
    if url.scheme() != "http" && url.scheme() != "https" {
      return Err(TransportError::InvalidEndpoint(format!(
        "unsupported scheme '{}' in {endpoint}",
        url.scheme()
      )));
    }

    debug!(%endpoint, bytes = payload.len(), "sending request");

    let response = self
      .client
      .post(url)
      .header(CONTENT_TYPE, "application/json")
      .header(ACCEPT, "application/json")
      .body(payload.to_owned())
      .send()
      .await?
      .error_for_status()?;

    let body = response.text().await?;
    debug!(%endpoint, bytes = body.len(), "received response");
    Ok(body)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[tokio::test]
  async fn rejects_unparseable_endpoint() {
    let transport = HttpTransport::new();
    let result = transport.fetch("not a url", "{}").await;
    assert!(matches!(result, Err(TransportError::InvalidEndpoint(_))));
  }

  #[tokio::test]
  async fn rejects_non_http_scheme() {
    let transport = HttpTransport::new();
    let result = transport.fetch("ftp://node.example/rpc", "{}").await;
    let err = result.unwrap_err();
    assert!(err.to_string().contains("unsupported scheme 'ftp'"));
  }
}
