//! Scoped wrapper around an engine context handle.

use verity_engine::{ContextId, ContextKind, Engine, PendingRequest, SignRequest};

use crate::error::DriverError;

/// A safe facade over one engine-owned execution context.
///
/// Top-level contexts are constructed only through [`Context::create`] and
/// release their handle exactly once, on drop - whatever path the execution
/// loop exits through. Sub-contexts obtained via [`last_pending`] are
/// borrowed views into engine-owned state and are never released here.
///
/// [`last_pending`]: Context::last_pending
pub struct Context<'e> {
  engine: &'e dyn Engine,
  id: ContextId,
  owned: bool,
}

impl<'e> Context<'e> {
  /// Create a top-level context from a request payload.
  ///
  /// If the engine rejects the payload the half-created handle is released
  /// before the error is returned, so no context leaks on this path.
  pub fn create(engine: &'e dyn Engine, payload: &str) -> Result<Self, DriverError> {
    let id = engine.create(payload);
    if let Some(message) = engine.creation_error(id) {
      engine.release(id);
      return Err(DriverError::InvalidRequest { message });
    }
    Ok(Self {
      engine,
      id,
      owned: true,
    })
  }

  pub fn id(&self) -> ContextId {
    self.id
  }

  /// Request one step of engine progress. Non-blocking.
  pub fn advance(&self) -> i32 {
    self.engine.advance(self.id)
  }

  /// The most deeply nested unresolved sub-context, as a borrowed view.
  pub fn last_pending(&self) -> Option<Context<'e>> {
    self.engine.find_deepest_pending(self.id).map(|id| Context {
      engine: self.engine,
      id,
      owned: false,
    })
  }

  pub fn kind(&self) -> ContextKind {
    self.engine.kind(self.id)
  }

  /// The final result payload. Only meaningful in terminal success.
  pub fn response(&self) -> String {
    self.engine.result_payload(self.id)
  }

  /// The terminal error message, if the engine recorded one.
  pub fn error_message(&self) -> Option<String> {
    self.engine.error_message(self.id)
  }

  /// Record a driver-discovered failure; the next [`advance`](Context::advance)
  /// will yield the terminal error state.
  pub fn report_error(&self, message: &str) {
    self.engine.report_error(self.id, message);
  }

  /// The pending network operation, when this is an `Rpc` sub-context.
  pub fn pending_request(&self) -> Option<PendingRequest> {
    self.engine.pending_request(self.id)
  }

  /// Write one endpoint's outcome into its output slot.
  pub fn record_response(&self, index: usize, response: Result<String, String>) {
    self.engine.record_response(self.id, index, response);
  }

  /// The pending signing operation, when this is a `Sign` sub-context.
  pub fn pending_sign(&self) -> Option<SignRequest> {
    self.engine.pending_sign(self.id)
  }

  /// Write the produced signature into this sub-context.
  pub fn record_signature(&self, signature_hex: &str) {
    self.engine.record_signature(self.id, signature_hex);
  }

  /// Mark the outstanding sub-dependency as no longer needed.
  pub fn skip_pending(&self) {
    self.engine.skip_pending(self.id);
  }
}

impl Drop for Context<'_> {
  fn drop(&mut self) {
    if self.owned {
      self.engine.release(self.id);
    }
  }
}
