//! Signing resolution.

use std::sync::Arc;

use tracing::{info, instrument, warn};
use verity_signer::{Signer, SignerError};

use crate::context::Context;

/// Resolve a pending signing operation.
///
/// Exactly one signing call is in flight per sub-context; it may suspend
/// (remote or interactive signers) but never fans out. Any failure here is
/// fatal to the request: it is reported on the owning context so the next
/// advance terminates with it.
#[instrument(name = "sign_resolve", skip(ctx, sub, signer))]
pub(crate) async fn resolve(
  ctx: &Context<'_>,
  sub: &Context<'_>,
  signer: Option<&Arc<dyn Signer>>,
) {
  let Some(request) = sub.pending_sign() else {
    warn!("waiting sub-context has no pending signing operation");
    ctx.report_error(crate::PROTOCOL_VIOLATION);
    return;
  };

  let Some(signer) = signer else {
    ctx.report_error("no signer configured");
    return;
  };

  if !signer.can_sign(&request.identity) {
    ctx.report_error(&SignerError::UnknownIdentity(request.identity).to_string());
    return;
  }

  info!(identity = %request.identity, bytes = request.message.len(), "signing");

  match signer.sign(&request.message, &request.identity).await {
    Ok(signature) => sub.record_signature(&signature),
    Err(e) => {
      warn!(error = %e, "signing failed");
      ctx.report_error(&e.to_string());
    }
  }
}
