//! Verity
//!
//! A client-side execution driver for verified RPC. An external verification
//! engine owns the lifecycle of every request - parsing, proof checking,
//! deciding which endpoints to ask and when a signature is needed - and this
//! workspace drives that engine's contexts to completion, performing the
//! transport and signing side-effects it asks for.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                          Client                             │
//! │  - JSON-RPC envelope construction, id allocation            │
//! │  - signer prepare_request rewriting                         │
//! │  - execute(method, params) → result payload                 │
//! └─────────────────────────────────────────────────────────────┘
//!                               │
//!                               ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    Runner (verity-driver)                   │
//! │  - advance → classify → resolve side-effect → repeat        │
//! │  - context released on every exit path                      │
//! └─────────────────────────────────────────────────────────────┘
//!                │                          │
//!                ▼                          ▼
//!    Transport (verity-transport)   Signer (verity-signer)
//!        fan-out per endpoint         one signature per request
//! ```
//!
//! The engine itself is injected as an [`Engine`] trait object; see
//! `verity-testkit` for a scripted engine used throughout the tests.
//!
//! # Usage
//!
//! ```ignore
//! use std::sync::Arc;
//! use verity::Client;
//!
//! let client = Client::builder(engine)
//!     .signer(Arc::new(my_signer))
//!     .build();
//!
//! let block = client.execute("eth_blockNumber", serde_json::json!([])).await?;
//! ```

mod client;
mod config;
mod request;

pub use client::{Client, ClientBuilder, ClientError};
pub use config::ClientConfig;

pub use verity_driver::{Context, DriverError, Runner, State};
pub use verity_engine::{ContextId, ContextKind, Engine, PendingRequest, SignRequest, status};
pub use verity_signer::{Signer, SignerError};
pub use verity_transport::{HttpTransport, Transport, TransportError};
