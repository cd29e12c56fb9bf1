use std::sync::Arc;

use super::{
  impl_subject,
  subject_core::{Retention, SubjectCore},
};

/// Replays past `Next` values to every new subscriber, then forwards live
/// events.
///
/// The history survives termination: a subscriber arriving after
/// `Completed` still receives the buffered values, followed by the terminal
/// event.
pub struct ReplaySubject<T> {
  core: Arc<SubjectCore<T>>,
}

impl<T: Clone + Send + Sync + 'static> ReplaySubject<T> {
  /// Keeps the last `buffer_size` values.
  pub fn new(buffer_size: usize) -> Self {
    ReplaySubject { core: SubjectCore::new(Retention::Replay { limit: Some(buffer_size) }) }
  }

  /// Keeps every value.
  pub fn unbounded() -> Self {
    ReplaySubject { core: SubjectCore::new(Retention::Replay { limit: None }) }
  }
}

impl_subject!(ReplaySubject);
