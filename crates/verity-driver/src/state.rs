//! Advancement-code classification.

use verity_engine::status;

/// What one step of engine progress means for the execution loop.
///
/// `Ok` and `Error` are terminal. `Waiting` needs a side-effect resolved
/// before the loop may advance again; `Skip` suppresses one side-effect
/// instead of performing it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
  Ok,
  Error,
  Waiting,
  Skip,
}

impl State {
  /// Classify a raw advancement code.
  ///
  /// Total over all of `i32`: codes outside the known set collapse to
  /// `Error`. An engine state the driver does not understand must never be
  /// mistaken for progress or success.
  pub fn classify(code: i32) -> State {
    match code {
      status::OK => State::Ok,
      status::WAITING => State::Waiting,
      status::SKIP => State::Skip,
      status::ERROR => State::Error,
      _ => State::Error,
    }
  }

  pub fn is_terminal(self) -> bool {
    matches!(self, State::Ok | State::Error)
  }
}
