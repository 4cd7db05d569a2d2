use thiserror::Error;

/// Errors surfaced to the caller of a driver run.
///
/// Only these escape the execution loop. Everything the engine can recover
/// from (per-endpoint transport failures, skipped dependencies) is written
/// back into the context instead.
#[derive(Debug, Error)]
pub enum DriverError {
  /// The engine rejected the request at creation time.
  #[error("invalid request: {message}")]
  InvalidRequest { message: String },

  /// The engine terminated the request with an error. The message is the
  /// engine's, verbatim.
  #[error("{message}")]
  Rpc { message: String },

  /// The run was cancelled between loop iterations.
  #[error("execution cancelled")]
  Cancelled,
}
