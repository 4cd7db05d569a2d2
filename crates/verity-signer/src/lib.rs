//! Signer capability.
//!
//! When the engine decides a request needs a signature it surfaces a pending
//! signing sub-context; the driver resolves it through this trait. The
//! signing math itself lives behind the implementation - local keys, hardware
//! wallets and remote/interactive signers all fit, which is why `sign` may
//! suspend.

use async_trait::async_trait;

/// Error type for signing operations.
///
/// A signing failure is fatal to the request it belongs to: the driver
/// records the message on the context and the engine terminates with it.
#[derive(Debug, thiserror::Error)]
pub enum SignerError {
  /// The signer does not hold keys for the requested identity.
  #[error("unknown signing identity: {0}")]
  UnknownIdentity(String),

  /// Signing was attempted and failed.
  #[error("{0}")]
  Failed(String),
}

/// A set of signing identities the embedding application makes available.
#[async_trait]
pub trait Signer: Send + Sync {
  /// Whether this signer can produce signatures for `identity`.
  fn can_sign(&self, identity: &str) -> bool;

  /// Sign `message` for `identity`, returning the signature hex-encoded.
  async fn sign(&self, message: &[u8], identity: &str) -> Result<String, SignerError>;

  /// Rewrite an outgoing request payload before submission.
  ///
  /// Lets signers fill in fields only they know (nonces, gas settings, the
  /// sending account). The default is a pass-through.
  async fn prepare_request(&self, payload: String) -> Result<String, SignerError> {
    Ok(payload)
  }
}
