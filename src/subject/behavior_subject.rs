use std::sync::Arc;

use super::{
  impl_subject,
  subject_core::{Retention, SubjectCore},
};
use crate::error::RxError;

/// Holds a current value. Each new subscriber receives it immediately,
/// followed by every later value.
///
/// After termination new subscribers only receive the terminal event.
pub struct BehaviorSubject<T> {
  core: Arc<SubjectCore<T>>,
}

impl<T: Clone + Send + Sync + 'static> BehaviorSubject<T> {
  pub fn new(initial: T) -> Self {
    BehaviorSubject { core: SubjectCore::with_value(Retention::Behavior, initial) }
  }

  /// The latest value.
  ///
  /// Fails with the stream's error once the subject terminated with one, and
  /// with [`RxError::Disposed`] once it was disposed. A completed subject
  /// still reports its last value.
  pub fn value(&self) -> Result<T, RxError> { self.core.value() }
}

impl_subject!(BehaviorSubject);
