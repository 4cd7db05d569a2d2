//! Scripted engine implementation.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

use verity_engine::{ContextId, ContextKind, Engine, PendingRequest, SignRequest, status};

/// One scripted advancement outcome.
#[derive(Debug, Clone)]
pub enum Step {
  /// Terminate successfully with this result payload.
  Ok(String),
  /// Terminate with this error message (`None` leaves the message unset).
  Error(Option<String>),
  /// Surface a pending network operation on a fresh `Rpc` sub-context.
  WaitTransport(PendingRequest),
  /// Surface a pending signing operation on a fresh `Sign` sub-context.
  WaitSign(SignRequest),
  /// Ask the driver to mark the pending sub-dependency as not needed.
  Skip,
  /// Report `WAITING` but expose no pending sub-context (contract breach).
  WaitDetached,
  /// Report `SKIP` but expose no pending sub-context (contract breach).
  SkipDetached,
  /// Return this advancement code verbatim.
  Raw(i32),
}

impl Step {
  /// Convenience constructor for a transport step.
  pub fn wait_transport(
    payload: impl Into<String>,
    endpoints: &[&str],
    timeout: Duration,
  ) -> Step {
    Step::WaitTransport(PendingRequest {
      payload: payload.into(),
      endpoints: endpoints.iter().map(|e| e.to_string()).collect(),
      timeout,
    })
  }

  /// Convenience constructor for a signing step.
  pub fn wait_sign(message: &[u8], identity: impl Into<String>) -> Step {
    Step::WaitSign(SignRequest {
      message: message.to_vec(),
      identity: identity.into(),
    })
  }
}

#[derive(Default)]
struct ScriptState {
  steps: VecDeque<Step>,
  next_id: u64,
  creation_error: Option<String>,
  created: Vec<ContextId>,
  created_payloads: Vec<String>,
  releases: Vec<ContextId>,
  kinds: HashMap<ContextId, ContextKind>,
  pending_requests: HashMap<ContextId, PendingRequest>,
  pending_signs: HashMap<ContextId, SignRequest>,
  current_sub: Option<ContextId>,
  responses: Vec<(usize, Result<String, String>)>,
  signatures: Vec<String>,
  skips: usize,
  reported: Vec<String>,
  forced_error: Option<String>,
  current_error: Option<String>,
  result: Option<String>,
}

impl ScriptState {
  fn alloc_id(&mut self) -> ContextId {
    self.next_id += 1;
    ContextId::new(self.next_id)
  }
}

/// An [`Engine`] that plays back a fixed script of advancement outcomes.
///
/// A driver-reported error overrides the script: the advance after
/// [`report_error`](Engine::report_error) yields [`status::ERROR`] with the
/// reported message, which is exactly the contract the real engine honors.
/// An exhausted script also yields an error rather than looping forever.
pub struct ScriptedEngine {
  state: Mutex<ScriptState>,
}

impl ScriptedEngine {
  pub fn new(steps: Vec<Step>) -> Self {
    Self {
      state: Mutex::new(ScriptState {
        steps: steps.into(),
        ..ScriptState::default()
      }),
    }
  }

  /// Reject every `create` with this message.
  pub fn with_creation_error(self, message: impl Into<String>) -> Self {
    self.state.lock().unwrap().creation_error = Some(message.into());
    self
  }

  /// Whether every created top-level context was released exactly once and
  /// no sub-context was ever released.
  pub fn released_exactly_once(&self) -> bool {
    let state = self.state.lock().unwrap();
    !state.created.is_empty()
      && state
        .created
        .iter()
        .all(|id| state.releases.iter().filter(|r| *r == id).count() == 1)
      && state.releases.iter().all(|id| state.created.contains(id))
  }

  pub fn release_count(&self) -> usize {
    self.state.lock().unwrap().releases.len()
  }

  /// Payloads passed to `create`, in order.
  pub fn created_payloads(&self) -> Vec<String> {
    self.state.lock().unwrap().created_payloads.clone()
  }

  /// Every `record_response` write-back, in call order.
  pub fn responses(&self) -> Vec<(usize, Result<String, String>)> {
    self.state.lock().unwrap().responses.clone()
  }

  pub fn signatures(&self) -> Vec<String> {
    self.state.lock().unwrap().signatures.clone()
  }

  pub fn skip_count(&self) -> usize {
    self.state.lock().unwrap().skips
  }

  /// Messages the driver reported via `report_error`, in order.
  pub fn reported_errors(&self) -> Vec<String> {
    self.state.lock().unwrap().reported.clone()
  }
}

impl Engine for ScriptedEngine {
  fn create(&self, payload: &str) -> ContextId {
    let mut state = self.state.lock().unwrap();
    let id = state.alloc_id();
    state.created.push(id);
    state.created_payloads.push(payload.to_string());
    id
  }

  fn creation_error(&self, _ctx: ContextId) -> Option<String> {
    self.state.lock().unwrap().creation_error.clone()
  }

  fn advance(&self, _ctx: ContextId) -> i32 {
    let mut state = self.state.lock().unwrap();

    if let Some(message) = state.forced_error.take() {
      state.current_error = Some(message);
      return status::ERROR;
    }

    let Some(step) = state.steps.pop_front() else {
      state.current_error = Some("script exhausted".to_string());
      return status::ERROR;
    };

    match step {
      Step::Ok(payload) => {
        state.result = Some(payload);
        status::OK
      }
      Step::Error(message) => {
        state.current_error = message;
        status::ERROR
      }
      Step::WaitTransport(request) => {
        let sub = state.alloc_id();
        state.kinds.insert(sub, ContextKind::Rpc);
        state.pending_requests.insert(sub, request);
        state.current_sub = Some(sub);
        status::WAITING
      }
      Step::WaitSign(request) => {
        let sub = state.alloc_id();
        state.kinds.insert(sub, ContextKind::Sign);
        state.pending_signs.insert(sub, request);
        state.current_sub = Some(sub);
        status::WAITING
      }
      Step::Skip => {
        let sub = state.alloc_id();
        state.kinds.insert(sub, ContextKind::Rpc);
        state.current_sub = Some(sub);
        status::SKIP
      }
      Step::WaitDetached => {
        state.current_sub = None;
        status::WAITING
      }
      Step::SkipDetached => {
        state.current_sub = None;
        status::SKIP
      }
      Step::Raw(code) => code,
    }
  }

  fn find_deepest_pending(&self, _ctx: ContextId) -> Option<ContextId> {
    self.state.lock().unwrap().current_sub
  }

  fn kind(&self, ctx: ContextId) -> ContextKind {
    self
      .state
      .lock()
      .unwrap()
      .kinds
      .get(&ctx)
      .copied()
      .unwrap_or(ContextKind::Rpc)
  }

  fn result_payload(&self, _ctx: ContextId) -> String {
    self.state.lock().unwrap().result.clone().unwrap_or_default()
  }

  fn error_message(&self, _ctx: ContextId) -> Option<String> {
    self.state.lock().unwrap().current_error.clone()
  }

  fn report_error(&self, _ctx: ContextId, message: &str) {
    let mut state = self.state.lock().unwrap();
    state.reported.push(message.to_string());
    state.forced_error = Some(message.to_string());
  }

  fn release(&self, ctx: ContextId) {
    self.state.lock().unwrap().releases.push(ctx);
  }

  fn pending_request(&self, ctx: ContextId) -> Option<PendingRequest> {
    self.state.lock().unwrap().pending_requests.get(&ctx).cloned()
  }

  fn record_response(&self, _ctx: ContextId, index: usize, response: Result<String, String>) {
    self.state.lock().unwrap().responses.push((index, response));
  }

  fn pending_sign(&self, ctx: ContextId) -> Option<SignRequest> {
    self.state.lock().unwrap().pending_signs.get(&ctx).cloned()
  }

  fn record_signature(&self, _ctx: ContextId, signature_hex: &str) {
    self
      .state
      .lock()
      .unwrap()
      .signatures
      .push(signature_hex.to_string());
  }

  fn skip_pending(&self, _ctx: ContextId) {
    self.state.lock().unwrap().skips += 1;
  }
}
