//! Transport fan-out resolution.

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, instrument, warn};
use verity_transport::Transport;

use crate::context::Context;

/// Resolve a pending network operation by fanning out to every endpoint.
///
/// All endpoint calls are spawned before any result is awaited, and every
/// output slot is written before control returns - the engine, not the
/// driver, decides how many successes are enough, so a partial result set is
/// never handed back early. One endpoint's failure (including a timeout) is
/// recorded into that endpoint's slot and leaves the others untouched.
#[instrument(name = "transport_resolve", skip(ctx, sub, transport, fallback_timeout))]
pub(crate) async fn resolve(
  ctx: &Context<'_>,
  sub: &Context<'_>,
  transport: &Arc<dyn Transport>,
  fallback_timeout: Duration,
) {
  let Some(pending) = sub.pending_request() else {
    warn!("waiting sub-context has no pending network operation");
    ctx.report_error(crate::PROTOCOL_VIOLATION);
    return;
  };

  let timeout = if pending.timeout.is_zero() {
    fallback_timeout
  } else {
    pending.timeout
  };

  info!(
    endpoints = pending.endpoints.len(),
    timeout_ms = timeout.as_millis() as u64,
    "dispatching transport fan-out"
  );

  let mut handles = Vec::with_capacity(pending.endpoints.len());
  for endpoint in &pending.endpoints {
    let transport = Arc::clone(transport);
    let endpoint = endpoint.clone();
    let payload = pending.payload.clone();
    handles.push(tokio::spawn(async move {
      match tokio::time::timeout(timeout, transport.fetch(&endpoint, &payload)).await {
        Ok(Ok(body)) => Ok(body),
        Ok(Err(e)) => Err(e.to_string()),
        Err(_) => Err(format!(
          "request to {endpoint} timed out after {}ms",
          timeout.as_millis()
        )),
      }
    }));
  }

  // join_all preserves spawn order, which is the endpoint/slot order.
  for (index, joined) in futures::future::join_all(handles).await.into_iter().enumerate() {
    let outcome = match joined {
      Ok(outcome) => outcome,
      Err(e) => Err(format!("transport task failed: {e}")),
    };
    if let Err(message) = &outcome {
      warn!(index, %message, "endpoint failed");
    }
    sub.record_response(index, outcome);
  }
}
