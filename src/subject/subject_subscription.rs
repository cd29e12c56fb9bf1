use std::sync::Weak;

use parking_lot::Mutex;

use super::subject_core::SubjectCore;
use crate::disposable::{BagKey, Disposable};

/// Returned by a subject's `subscribe`: removes the observer from the
/// registry when disposed. Holds the subject weakly, so a forgotten
/// subscription does not keep the subject alive.
pub(crate) struct SubjectSubscription<T> {
  core: Weak<SubjectCore<T>>,
  key: Mutex<Option<BagKey>>,
}

impl<T> SubjectSubscription<T> {
  pub(crate) fn new(core: Weak<SubjectCore<T>>, key: BagKey) -> Self {
    SubjectSubscription { core, key: Mutex::new(Some(key)) }
  }
}

impl<T: Send + Sync> Disposable for SubjectSubscription<T> {
  fn dispose(&self) {
    let Some(key) = self.key.lock().take() else { return };
    if let Some(core) = self.core.upgrade() {
      let removed = core.state.lock().observers.remove(key);
      drop(removed);
    }
  }

  fn is_disposed(&self) -> bool { self.key.lock().is_none() }
}
