use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;

use super::{BoxedDisposable, Disposable};

/// Holds a replaceable inner disposable; setting a new one disposes the
/// previous one.
#[derive(Default)]
pub struct SerialDisposable {
  disposed: AtomicBool,
  current: Mutex<Option<BoxedDisposable>>,
}

impl SerialDisposable {
  #[inline]
  pub fn new() -> Self { Self::default() }

  /// Replaces the current disposable. After `dispose`, the new value is
  /// disposed immediately.
  pub fn set(&self, disposable: BoxedDisposable) {
    let previous = {
      let mut current = self.current.lock();
      if self.disposed.load(Ordering::Acquire) {
        Some(disposable)
      } else {
        current.replace(disposable)
      }
    };
    if let Some(previous) = previous {
      previous.dispose();
    }
  }
}

impl Disposable for SerialDisposable {
  fn dispose(&self) {
    let current = {
      let mut current = self.current.lock();
      if self.disposed.swap(true, Ordering::AcqRel) {
        return;
      }
      current.take()
    };
    if let Some(current) = current {
      current.dispose();
    }
  }

  #[inline]
  fn is_disposed(&self) -> bool { self.disposed.load(Ordering::Acquire) }
}

#[cfg(test)]
mod tests {
  use std::sync::{atomic::AtomicUsize, Arc};

  use super::*;
  use crate::disposable::Disposables;

  #[rxcore_macro::test]
  fn replacing_disposes_previous() {
    let count = Arc::new(AtomicUsize::new(0));
    let make = || {
      let count = count.clone();
      Disposables::create(move || {
        count.fetch_add(1, Ordering::SeqCst);
      })
    };
    let serial = SerialDisposable::new();
    serial.set(make());
    serial.set(make());
    assert_eq!(count.load(Ordering::SeqCst), 1);

    serial.dispose();
    assert_eq!(count.load(Ordering::SeqCst), 2);

    serial.set(make());
    assert_eq!(count.load(Ordering::SeqCst), 3);
  }
}
