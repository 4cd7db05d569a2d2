//! Verity Execution Driver
//!
//! Drives one engine-owned execution context from creation to a terminal
//! state. The engine decides *what* has to happen next; this crate performs
//! the side-effects it asks for and feeds the results back in:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                          Runner                             │
//! │  create context → loop { advance → classify → resolve }     │
//! │  release on every exit path                                 │
//! └─────────────────────────────────────────────────────────────┘
//!                │                          │
//!                ▼                          ▼
//! ┌──────────────────────────┐  ┌──────────────────────────────┐
//! │    transport resolver    │  │       signing resolver       │
//! │  fan-out to N endpoints, │  │  one signature per pending   │
//! │  record all N outcomes   │  │  sub-context                 │
//! └──────────────────────────┘  └──────────────────────────────┘
//! ```
//!
//! All side-effect failures are written back into the context rather than
//! thrown across the loop, so control flow is uniform: after any non-terminal
//! step the context is advanced again, and the engine decides what the
//! partial results mean.

mod context;
mod error;
mod runner;
mod sign;
mod state;
mod transport;

pub use context::Context;
pub use error::DriverError;
pub use runner::{PROTOCOL_VIOLATION, Runner};
pub use state::State;
