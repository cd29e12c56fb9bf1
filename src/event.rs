//! The notification pushed through every observer.

use crate::error::RxError;

/// One push notification: a value, or one of the two terminal events.
///
/// A well behaved producer delivers any number of `Next`s followed by at
/// most one terminal event (`Error` or `Completed`), and nothing after it.
#[derive(Clone, Debug, PartialEq)]
pub enum Event<T> {
  Next(T),
  Error(RxError),
  Completed,
}

impl<T> Event<T> {
  /// `true` for `Error` and `Completed`.
  #[inline]
  pub fn is_terminal(&self) -> bool { !matches!(self, Event::Next(_)) }

  #[inline]
  pub fn is_completed(&self) -> bool { matches!(self, Event::Completed) }

  /// The carried value, if this is a `Next`.
  pub fn element(self) -> Option<T> {
    match self {
      Event::Next(value) => Some(value),
      _ => None,
    }
  }

  /// The carried error, if this is an `Error`.
  pub fn error(&self) -> Option<&RxError> {
    match self {
      Event::Error(err) => Some(err),
      _ => None,
    }
  }

  /// Transforms the value of a `Next`, leaving terminal events untouched.
  pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Event<U> {
    match self {
      Event::Next(value) => Event::Next(f(value)),
      Event::Error(err) => Event::Error(err),
      Event::Completed => Event::Completed,
    }
  }

  /// Like [`Event::map`], but a failing transform turns the event into an
  /// `Error`.
  pub fn try_map<U>(self, f: impl FnOnce(T) -> Result<U, RxError>) -> Event<U> {
    match self {
      Event::Next(value) => match f(value) {
        Ok(value) => Event::Next(value),
        Err(err) => Event::Error(err),
      },
      Event::Error(err) => Event::Error(err),
      Event::Completed => Event::Completed,
    }
  }
}
