//! Error type carried by `Event::Error`.
//!
//! Every failure a stream can terminate with is an [`RxError`]. It is `Clone`
//! because subjects fan one error out to many observers, and cheap to clone
//! because user errors are kept behind an `Arc`.

use std::{error::Error as StdError, fmt, sync::Arc};

use thiserror::Error;

/// Errors produced by the reactive core or forwarded from user code.
#[derive(Clone, Error)]
pub enum RxError {
  /// A failure raised by a user supplied closure or source.
  #[error("{0}")]
  Custom(Arc<dyn StdError + Send + Sync>),

  /// A plain message, handy for sources that have no error type of their own.
  #[error("{0}")]
  Message(String),

  /// The object was used after it was disposed.
  #[error("`{object}` was already disposed")]
  Disposed { object: &'static str },

  /// Work that must run on a specific scheduler was invoked elsewhere.
  #[error("executing off `{scheduler}`, schedule the work on it instead")]
  NotOnScheduler { scheduler: &'static str },

  /// The scheduler could not acquire the resources it needs.
  #[error("scheduler `{scheduler}` is unavailable: {reason}")]
  Scheduler { scheduler: &'static str, reason: String },

  /// A single-assignment disposable was assigned a second time.
  #[error("single assignment disposable was already assigned")]
  AlreadyAssigned,
}

impl RxError {
  /// Wraps any error value.
  pub fn custom<E>(err: E) -> Self
  where
    E: StdError + Send + Sync + 'static,
  {
    RxError::Custom(Arc::new(err))
  }

  /// Builds an error from a message.
  pub fn msg(message: impl Into<String>) -> Self { RxError::Message(message.into()) }
}

impl fmt::Debug for RxError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      RxError::Custom(err) => f.debug_tuple("Custom").field(&err.to_string()).finish(),
      RxError::Message(msg) => f.debug_tuple("Message").field(msg).finish(),
      RxError::Disposed { object } => f.debug_struct("Disposed").field("object", object).finish(),
      RxError::NotOnScheduler { scheduler } => {
        f.debug_struct("NotOnScheduler").field("scheduler", scheduler).finish()
      }
      RxError::Scheduler { scheduler, reason } => f
        .debug_struct("Scheduler")
        .field("scheduler", scheduler)
        .field("reason", reason)
        .finish(),
      RxError::AlreadyAssigned => f.write_str("AlreadyAssigned"),
    }
  }
}

/// Two errors are equal when they are the same variant and render the same
/// message.
impl PartialEq for RxError {
  fn eq(&self, other: &Self) -> bool {
    std::mem::discriminant(self) == std::mem::discriminant(other)
      && self.to_string() == other.to_string()
  }
}

impl From<String> for RxError {
  fn from(message: String) -> Self { RxError::Message(message) }
}

impl From<&str> for RxError {
  fn from(message: &str) -> Self { RxError::Message(message.to_owned()) }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[derive(Debug, Error)]
  #[error("parse failed at {0}")]
  struct ParseError(usize);

  #[rxcore_macro::test]
  fn custom_error_keeps_message() {
    let err = RxError::custom(ParseError(3));
    assert_eq!(err.to_string(), "parse failed at 3");
    assert_eq!(err.clone(), err);
  }

  #[rxcore_macro::test]
  fn equality_respects_variant() {
    assert_eq!(RxError::msg("boom"), RxError::from("boom"));
    assert_ne!(RxError::msg("boom"), RxError::custom(ParseError(0)));
    assert_ne!(RxError::msg("a"), RxError::msg("b"));
  }
}
