//! Scripted transport implementation.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use verity_transport::{Transport, TransportError};

#[derive(Debug, Clone)]
struct Route {
  outcome: Result<String, String>,
  delay: Option<Duration>,
}

/// A [`Transport`] that answers from a scripted per-endpoint table.
///
/// Unknown endpoints fail, optional per-endpoint latency lets tests exercise
/// out-of-order completion, and every invocation is recorded so tests can
/// assert that no transport call happens when none is allowed.
#[derive(Debug, Default)]
pub struct MockTransport {
  routes: HashMap<String, Route>,
  calls: Mutex<Vec<String>>,
}

impl MockTransport {
  pub fn new() -> Self {
    Self::default()
  }

  /// Script a successful response body for `endpoint`.
  pub fn respond(mut self, endpoint: impl Into<String>, body: impl Into<String>) -> Self {
    self.routes.insert(
      endpoint.into(),
      Route {
        outcome: Ok(body.into()),
        delay: None,
      },
    );
    self
  }

  /// Script a failure message for `endpoint`.
  pub fn fail(mut self, endpoint: impl Into<String>, message: impl Into<String>) -> Self {
    self.routes.insert(
      endpoint.into(),
      Route {
        outcome: Err(message.into()),
        delay: None,
      },
    );
    self
  }

  /// Delay the scripted outcome for an already-routed `endpoint`.
  pub fn delay(mut self, endpoint: &str, delay: Duration) -> Self {
    if let Some(route) = self.routes.get_mut(endpoint) {
      route.delay = Some(delay);
    }
    self
  }

  /// Number of `fetch` invocations so far.
  pub fn calls(&self) -> usize {
    self.calls.lock().unwrap().len()
  }

  /// Endpoints fetched, in invocation order.
  pub fn called_endpoints(&self) -> Vec<String> {
    self.calls.lock().unwrap().clone()
  }
}

#[async_trait]
impl Transport for MockTransport {
  async fn fetch(&self, endpoint: &str, _payload: &str) -> Result<String, TransportError> {
    self.calls.lock().unwrap().push(endpoint.to_string());

    let Some(route) = self.routes.get(endpoint).cloned() else {
      return Err(TransportError::Failed(format!(
        "no scripted response for {endpoint}"
      )));
    };

    if let Some(delay) = route.delay {
      tokio::time::sleep(delay).await;
    }

    route.outcome.map_err(TransportError::Failed)
  }
}
