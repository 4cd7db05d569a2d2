//! Test doubles for the verity workspace.
//!
//! [`ScriptedEngine`] stands in for the external verification engine: it
//! plays back a fixed sequence of advancement outcomes and records every
//! call the driver makes, so tests can assert the driver's contract
//! obligations (exactly-once release, complete write-backs, no I/O under
//! skip) rather than engine behavior.
//!
//! [`MockTransport`] and [`MockSigner`] are scripted capability
//! implementations with invocation counters.

mod engine;
mod signer;
mod transport;

pub use engine::{ScriptedEngine, Step};
pub use signer::MockSigner;
pub use transport::MockTransport;
