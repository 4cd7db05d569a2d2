//! The top-level execution loop.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{error, info, instrument, warn};
use verity_engine::{ContextKind, Engine};
use verity_signer::Signer;
use verity_transport::Transport;

use crate::context::Context;
use crate::error::DriverError;
use crate::state::State;
use crate::{sign, transport};

/// Reported on the context when the engine announces a pending side-effect
/// but no pending sub-context can be found. Always an engine-contract bug.
pub const PROTOCOL_VIOLATION: &str = "protocol violation: no pending sub-context to resolve";

/// Message used when the engine terminates with an error but provides none.
const UNSPECIFIED_ENGINE_ERROR: &str = "engine reported an error without a message";

/// Drives engine contexts to completion.
///
/// One `Runner` serves any number of concurrent [`run`](Runner::run) calls;
/// each call owns an independent context and they share nothing but the
/// injected capabilities.
pub struct Runner {
  engine: Arc<dyn Engine>,
  transport: Arc<dyn Transport>,
  signer: Option<Arc<dyn Signer>>,
  request_timeout: Duration,
}

impl Runner {
  /// Create a runner over an engine and the side-effect capabilities.
  ///
  /// `request_timeout` is the per-endpoint transport timeout used when a
  /// pending operation carries none of its own.
  pub fn new(
    engine: Arc<dyn Engine>,
    transport: Arc<dyn Transport>,
    signer: Option<Arc<dyn Signer>>,
    request_timeout: Duration,
  ) -> Self {
    Self {
      engine,
      transport,
      signer,
      request_timeout,
    }
  }

  /// Execute one request payload to completion.
  ///
  /// Returns the engine's final result payload, or the single error string
  /// the engine (or a driver-discovered failure routed through it)
  /// terminated with. The context is released on every exit path, including
  /// cancellation and creation failure.
  #[instrument(
    name = "rpc_execute",
    skip(self, payload, cancel),
    fields(execution_id = %uuid::Uuid::new_v4())
  )]
  pub async fn run(&self, payload: &str, cancel: CancellationToken) -> Result<String, DriverError> {
    let ctx = Context::create(self.engine.as_ref(), payload)?;

    loop {
      if cancel.is_cancelled() {
        info!("execution cancelled");
        return Err(DriverError::Cancelled);
      }

      let code = ctx.advance();
      match State::classify(code) {
        State::Ok => {
          let response = ctx.response();
          info!(bytes = response.len(), "execution completed");
          return Ok(response);
        }
        State::Error => {
          let message = ctx
            .error_message()
            .unwrap_or_else(|| UNSPECIFIED_ENGINE_ERROR.to_string());
          error!(%message, "execution failed");
          return Err(DriverError::Rpc { message });
        }
        State::Waiting => match ctx.last_pending() {
          None => {
            warn!(code, "waiting state without a pending sub-context");
            ctx.report_error(PROTOCOL_VIOLATION);
          }
          Some(sub) => match sub.kind() {
            ContextKind::Rpc => {
              transport::resolve(&ctx, &sub, &self.transport, self.request_timeout).await
            }
            ContextKind::Sign => sign::resolve(&ctx, &sub, self.signer.as_ref()).await,
          },
        },
        State::Skip => match ctx.last_pending() {
          None => {
            warn!(code, "skip state without a pending sub-context");
            ctx.report_error(PROTOCOL_VIOLATION);
          }
          Some(sub) => {
            info!("marking pending sub-dependency as not needed");
            sub.skip_pending();
          }
        },
      }
    }
  }
}
