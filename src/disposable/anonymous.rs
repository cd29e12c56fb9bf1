use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;

use super::Disposable;

/// Runs a closure on the first dispose.
pub struct AnonymousDisposable {
  disposed: AtomicBool,
  action: Mutex<Option<Box<dyn FnOnce() + Send>>>,
}

impl AnonymousDisposable {
  pub fn new(action: impl FnOnce() + Send + 'static) -> Self {
    Self { disposed: AtomicBool::new(false), action: Mutex::new(Some(Box::new(action))) }
  }
}

impl Disposable for AnonymousDisposable {
  fn dispose(&self) {
    if !self.disposed.swap(true, Ordering::AcqRel) {
      let action = self.action.lock().take();
      if let Some(action) = action {
        action();
      }
    }
  }

  #[inline]
  fn is_disposed(&self) -> bool { self.disposed.load(Ordering::Acquire) }
}

/// A disposable that owns nothing.
///
/// Reported as disposed from the start since there is nothing left to
/// release.
#[derive(Clone, Copy, Debug, Default)]
pub struct NopDisposable;

impl Disposable for NopDisposable {
  #[inline]
  fn dispose(&self) {}

  #[inline]
  fn is_disposed(&self) -> bool { true }
}
