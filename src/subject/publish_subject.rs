use std::sync::Arc;

use super::{
  impl_subject,
  subject_core::{Retention, SubjectCore},
};

/// Multicasts to the observers registered at the time of each event.
pub struct PublishSubject<T> {
  core: Arc<SubjectCore<T>>,
}

impl<T: Clone + Send + Sync + 'static> PublishSubject<T> {
  pub fn new() -> Self { PublishSubject { core: SubjectCore::new(Retention::Publish) } }
}

impl<T: Clone + Send + Sync + 'static> Default for PublishSubject<T> {
  fn default() -> Self { Self::new() }
}

impl_subject!(PublishSubject);
