//! Scripted signer implementation.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use verity_signer::{Signer, SignerError};

/// A [`Signer`] holding one scripted identity.
#[derive(Debug)]
pub struct MockSigner {
  identity: String,
  outcome: Result<String, String>,
  prepared: Option<String>,
  sign_calls: AtomicUsize,
}

impl MockSigner {
  /// A signer that produces `signature` for `identity`.
  pub fn succeeding(identity: impl Into<String>, signature: impl Into<String>) -> Self {
    Self {
      identity: identity.into(),
      outcome: Ok(signature.into()),
      prepared: None,
      sign_calls: AtomicUsize::new(0),
    }
  }

  /// A signer that fails every `sign` with `message`.
  pub fn failing(identity: impl Into<String>, message: impl Into<String>) -> Self {
    Self {
      identity: identity.into(),
      outcome: Err(message.into()),
      prepared: None,
      sign_calls: AtomicUsize::new(0),
    }
  }

  /// Make `prepare_request` replace the payload with `payload`.
  pub fn with_prepared(mut self, payload: impl Into<String>) -> Self {
    self.prepared = Some(payload.into());
    self
  }

  /// Number of `sign` invocations so far.
  pub fn sign_calls(&self) -> usize {
    self.sign_calls.load(Ordering::SeqCst)
  }
}

#[async_trait]
impl Signer for MockSigner {
  fn can_sign(&self, identity: &str) -> bool {
    identity == self.identity
  }

  async fn sign(&self, _message: &[u8], identity: &str) -> Result<String, SignerError> {
    self.sign_calls.fetch_add(1, Ordering::SeqCst);
    if identity != self.identity {
      return Err(SignerError::UnknownIdentity(identity.to_string()));
    }
    self.outcome.clone().map_err(SignerError::Failed)
  }

  async fn prepare_request(&self, payload: String) -> Result<String, SignerError> {
    Ok(self.prepared.clone().unwrap_or(payload))
  }
}
