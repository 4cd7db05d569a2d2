//! Verity Engine Contract
//!
//! The verification engine that parses requests, checks proofs and decides
//! when a request is complete is an external collaborator. This crate defines
//! the surface the driver consumes: opaque context handles, advancement status
//! codes, and the read/write-back operations on pending side-effects.
//!
//! The [`Engine`] trait is object-safe and implementations are injected
//! (`Arc<dyn Engine>`). All state lives inside the engine - the driver only
//! holds [`ContextId`] handles and queries through this trait, so the context
//! hierarchy stays engine-owned.

use std::time::Duration;

/// Opaque handle to an engine-owned execution context.
///
/// Handles carry no meaning outside the engine that issued them. The driver
/// treats them as tokens: it never fabricates one and never dereferences one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContextId(u64);

impl ContextId {
  /// Wrap a raw engine handle value.
  pub const fn new(raw: u64) -> Self {
    Self(raw)
  }

  /// The raw handle value, for engine-side bookkeeping.
  pub const fn raw(self) -> u64 {
    self.0
  }
}

/// What kind of side-effect a pending sub-context is blocked on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextKind {
  /// A network request that must be sent to one or more endpoints.
  Rpc,
  /// A message that must be signed.
  Sign,
}

/// Advancement status codes returned by [`Engine::advance`].
///
/// The numbering follows the engine's wire contract. Codes outside this set
/// must be treated as a terminal error by callers (fail-closed).
pub mod status {
  /// Terminal success; the result payload is available.
  pub const OK: i32 = 0;
  /// A dependent sub-context is blocked on a side-effect.
  pub const WAITING: i32 = 1;
  /// The deepest pending sub-dependency is no longer needed and should be
  /// marked as such without performing its side-effect.
  pub const SKIP: i32 = 2;
  /// Terminal failure; the error message is available.
  pub const ERROR: i32 = 3;
}

/// A pending network operation read from an `Rpc` sub-context.
#[derive(Debug, Clone)]
pub struct PendingRequest {
  /// The request body to send, verbatim.
  pub payload: String,
  /// Ordered target endpoints. Every endpoint gets its own output slot.
  pub endpoints: Vec<String>,
  /// Per-endpoint timeout. Zero means the engine has no opinion and the
  /// driver applies its configured default.
  pub timeout: Duration,
}

/// A pending signing operation read from a `Sign` sub-context.
#[derive(Debug, Clone)]
pub struct SignRequest {
  /// The message to sign.
  pub message: Vec<u8>,
  /// Identifier of the signing identity (account).
  pub identity: String,
}

/// The execution-context contract of the verification engine.
///
/// All operations are synchronous, non-blocking computations on the engine
/// side; only the driver's side-effects (transport, signing) may suspend.
/// Implementations must be safe to share across tasks - independent top-level
/// contexts may be driven concurrently, though no single context is ever
/// advanced from two places at once.
pub trait Engine: Send + Sync {
  /// Create a top-level context from a request payload.
  ///
  /// Always yields a handle, even when the payload is rejected; callers must
  /// check [`creation_error`](Engine::creation_error) and release the
  /// half-created handle before surfacing the failure.
  fn create(&self, payload: &str) -> ContextId;

  /// The engine's rejection message if `create` failed, if any.
  fn creation_error(&self, ctx: ContextId) -> Option<String>;

  /// Request one step of progress. Returns a [`status`] code.
  fn advance(&self, ctx: ContextId) -> i32;

  /// The most deeply nested dependent sub-context that is not yet resolved.
  ///
  /// `None` after a `WAITING`/`SKIP` code is a contract violation the driver
  /// reports back via [`report_error`](Engine::report_error).
  fn find_deepest_pending(&self, ctx: ContextId) -> Option<ContextId>;

  /// Whether a sub-context is blocked on transport or signing.
  fn kind(&self, ctx: ContextId) -> ContextKind;

  /// The final result payload. Only meaningful after [`status::OK`].
  fn result_payload(&self, ctx: ContextId) -> String;

  /// The terminal error message, if the engine recorded one.
  fn error_message(&self, ctx: ContextId) -> Option<String>;

  /// Record a driver-discovered failure so the next `advance` on the
  /// context deterministically yields [`status::ERROR`].
  fn report_error(&self, ctx: ContextId, message: &str);

  /// Destroy a top-level context. Called exactly once per created handle;
  /// dependent sub-contexts are owned by their parent and never released
  /// through this.
  fn release(&self, ctx: ContextId);

  /// The pending network operation of an `Rpc` sub-context.
  fn pending_request(&self, ctx: ContextId) -> Option<PendingRequest>;

  /// Write one endpoint's outcome into its output slot: the response body on
  /// success, the failure message otherwise.
  fn record_response(&self, ctx: ContextId, index: usize, response: Result<String, String>);

  /// The pending signing operation of a `Sign` sub-context.
  fn pending_sign(&self, ctx: ContextId) -> Option<SignRequest>;

  /// Write the produced signature (hex) into a `Sign` sub-context.
  fn record_signature(&self, ctx: ContextId, signature_hex: &str);

  /// Mark the sub-context's outstanding sub-dependency as no longer needed,
  /// without performing its side-effect.
  fn skip_pending(&self, ctx: ContextId);
}
