//! The client facade.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use serde_json::{Map, Value};
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::info;
use verity_driver::{DriverError, Runner};
use verity_engine::Engine;
use verity_signer::{Signer, SignerError};
use verity_transport::{HttpTransport, Transport};

use crate::config::ClientConfig;
use crate::request;

/// Errors surfaced by [`Client`] calls.
#[derive(Debug, Error)]
pub enum ClientError {
  /// The driver terminated with an error (engine rejection, rpc failure,
  /// cancellation).
  #[error(transparent)]
  Driver(#[from] DriverError),

  /// The signer refused to prepare the outgoing request.
  #[error("signer rejected the request: {0}")]
  Signer(#[from] SignerError),

  /// An extra option collides with a request envelope field.
  #[error("option '{key}' collides with a request envelope field")]
  ReservedOption { key: String },

  /// The request envelope could not be encoded.
  #[error("failed to encode request: {0}")]
  Encode(#[from] serde_json::Error),
}

/// Builder for [`Client`].
pub struct ClientBuilder {
  engine: Arc<dyn Engine>,
  transport: Option<Arc<dyn Transport>>,
  signer: Option<Arc<dyn Signer>>,
  config: ClientConfig,
}

impl ClientBuilder {
  /// Replace the default HTTP transport.
  pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
    self.transport = Some(transport);
    self
  }

  /// Attach a signer. Without one, any signing request the engine surfaces
  /// terminates that request with an error.
  pub fn signer(mut self, signer: Arc<dyn Signer>) -> Self {
    self.signer = Some(signer);
    self
  }

  pub fn config(mut self, config: ClientConfig) -> Self {
    self.config = config;
    self
  }

  pub fn build(self) -> Client {
    let transport = self
      .transport
      .unwrap_or_else(|| Arc::new(HttpTransport::new()));
    let runner = Runner::new(
      self.engine,
      transport,
      self.signer.clone(),
      self.config.request_timeout(),
    );

    Client {
      runner,
      signer: self.signer,
      next_id: AtomicU64::new(1),
      cancel: CancellationToken::new(),
    }
  }
}

/// The top-level entry point: "execute request, return final payload or
/// error".
///
/// A `Client` is cheap to share behind an `Arc` and all calls are safe to
/// run concurrently - every execution owns an independent engine context.
pub struct Client {
  runner: Runner,
  signer: Option<Arc<dyn Signer>>,
  next_id: AtomicU64,
  cancel: CancellationToken,
}

impl Client {
  /// Start building a client over a verification engine.
  pub fn builder(engine: Arc<dyn Engine>) -> ClientBuilder {
    ClientBuilder {
      engine,
      transport: None,
      signer: None,
      config: ClientConfig::default(),
    }
  }

  /// Execute an RPC method with the given parameters.
  pub async fn execute(&self, method: &str, params: Value) -> Result<String, ClientError> {
    self.execute_with_options(method, params, None).await
  }

  /// Execute an RPC method with extra top-level request options.
  ///
  /// Options are merged into the envelope next to the standard JSON-RPC
  /// fields; what they mean is between the caller and the engine.
  pub async fn execute_with_options(
    &self,
    method: &str,
    params: Value,
    options: Option<Map<String, Value>>,
  ) -> Result<String, ClientError> {
    let id = self.next_id.fetch_add(1, Ordering::Relaxed);
    let payload = request::build(id, method, &params, options.as_ref())?;

    let payload = match &self.signer {
      Some(signer) => signer.prepare_request(payload).await?,
      None => payload,
    };

    self.execute_raw(&payload).await
  }

  /// Execute a pre-encoded request payload.
  pub async fn execute_raw(&self, payload: &str) -> Result<String, ClientError> {
    Ok(self.runner.run(payload, self.cancel.child_token()).await?)
  }

  /// Cancel every in-flight and future execution on this client.
  ///
  /// Cancellation takes effect between driver iterations; an already
  /// dispatched transport or signing call runs to completion first.
  pub fn shutdown(&self) {
    info!("shutting down client");
    self.cancel.cancel();
  }
}
