use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;

use super::{BoxedDisposable, Disposable};
use crate::error::RxError;

/// Holds exactly one inner disposable, assigned once.
///
/// Assigning after `dispose` disposes the assigned value immediately, which
/// is what lets a sink dispose itself while its upstream `subscribe` call is
/// still running. Assigning twice is a protocol violation.
#[derive(Default)]
pub struct SingleAssignmentDisposable {
  disposed: AtomicBool,
  state: Mutex<Slot>,
}

#[derive(Default)]
struct Slot {
  assigned: bool,
  current: Option<BoxedDisposable>,
}

impl SingleAssignmentDisposable {
  #[inline]
  pub fn new() -> Self { Self::default() }

  /// Assigns the inner disposable.
  ///
  /// # Panics
  ///
  /// Panics when a disposable was already assigned.
  pub fn set(&self, disposable: BoxedDisposable) {
    if let Err(err) = self.try_set(disposable) {
      panic!("{err}");
    }
  }

  /// Assigns the inner disposable, reporting a second assignment as
  /// [`RxError::AlreadyAssigned`]. The rejected value is disposed.
  pub fn try_set(&self, disposable: BoxedDisposable) -> Result<(), RxError> {
    let mut slot = self.state.lock();
    if slot.assigned {
      drop(slot);
      disposable.dispose();
      return Err(RxError::AlreadyAssigned);
    }
    slot.assigned = true;
    if self.disposed.load(Ordering::Acquire) {
      drop(slot);
      disposable.dispose();
    } else {
      slot.current = Some(disposable);
    }
    Ok(())
  }

  /// `true` once a disposable has been assigned, disposed or not.
  pub fn is_assigned(&self) -> bool { self.state.lock().assigned }
}

impl Disposable for SingleAssignmentDisposable {
  fn dispose(&self) {
    let current = {
      let mut slot = self.state.lock();
      if self.disposed.swap(true, Ordering::AcqRel) {
        return;
      }
      slot.current.take()
    };
    if let Some(inner) = current {
      inner.dispose();
    }
  }

  #[inline]
  fn is_disposed(&self) -> bool { self.disposed.load(Ordering::Acquire) }
}

#[cfg(test)]
mod tests {
  use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
  };

  use super::*;
  use crate::disposable::Disposables;

  fn counting(count: &Arc<AtomicUsize>) -> BoxedDisposable {
    let count = count.clone();
    Disposables::create(move || {
      count.fetch_add(1, Ordering::SeqCst);
    })
  }

  #[rxcore_macro::test]
  fn dispose_forwards_to_inner() {
    let count = Arc::new(AtomicUsize::new(0));
    let single = SingleAssignmentDisposable::new();
    single.set(counting(&count));
    assert_eq!(count.load(Ordering::SeqCst), 0);

    single.dispose();
    single.dispose();
    assert_eq!(count.load(Ordering::SeqCst), 1);
  }

  #[rxcore_macro::test]
  fn assign_after_dispose_disposes_immediately() {
    let count = Arc::new(AtomicUsize::new(0));
    let single = SingleAssignmentDisposable::new();
    single.dispose();
    single.set(counting(&count));
    assert_eq!(count.load(Ordering::SeqCst), 1);
    assert!(single.is_assigned());
  }

  #[rxcore_macro::test]
  fn second_assignment_is_rejected() {
    let count = Arc::new(AtomicUsize::new(0));
    let single = SingleAssignmentDisposable::new();
    single.set(counting(&count));
    assert_eq!(single.try_set(counting(&count)), Err(RxError::AlreadyAssigned));
    // the rejected one is disposed, the original one is kept
    assert_eq!(count.load(Ordering::SeqCst), 1);
  }

  #[rxcore_macro::test]
  #[should_panic(expected = "already assigned")]
  fn set_twice_panics() {
    let single = SingleAssignmentDisposable::new();
    single.set(Disposables::nop());
    single.set(Disposables::nop());
  }
}
