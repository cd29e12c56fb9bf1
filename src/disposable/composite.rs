use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;

use super::{Bag, BagKey, BoxedDisposable, Disposable};

/// Owns a dynamic set of disposables and disposes all of them together.
///
/// Members can be removed individually through the key returned by
/// [`CompositeDisposable::insert`]. Inserting into a disposed composite
/// disposes the new member right away.
#[derive(Default)]
pub struct CompositeDisposable {
  disposed: AtomicBool,
  members: Mutex<Bag<BoxedDisposable>>,
}

impl CompositeDisposable {
  #[inline]
  pub fn new() -> Self { Self::default() }

  /// Adds a member. Returns `None`, after disposing `disposable`, when the
  /// composite is already disposed.
  pub fn insert(&self, disposable: BoxedDisposable) -> Option<BagKey> {
    let mut members = self.members.lock();
    if self.disposed.load(Ordering::Acquire) {
      drop(members);
      disposable.dispose();
      None
    } else {
      Some(members.insert(disposable))
    }
  }

  /// Removes and disposes the member stored under `key`.
  pub fn remove(&self, key: BagKey) {
    let removed = self.members.lock().remove(key);
    if let Some(disposable) = removed {
      disposable.dispose();
    }
  }

  /// Number of live members.
  pub fn len(&self) -> usize { self.members.lock().len() }

  pub fn is_empty(&self) -> bool { self.members.lock().is_empty() }
}

impl FromIterator<BoxedDisposable> for CompositeDisposable {
  fn from_iter<I: IntoIterator<Item = BoxedDisposable>>(iter: I) -> Self {
    let mut members = Bag::new();
    for disposable in iter {
      members.insert(disposable);
    }
    Self { disposed: AtomicBool::new(false), members: Mutex::new(members) }
  }
}

impl Disposable for CompositeDisposable {
  fn dispose(&self) {
    let members: Vec<_> = {
      let mut members = self.members.lock();
      if self.disposed.swap(true, Ordering::AcqRel) {
        return;
      }
      members.drain().collect()
    };
    for disposable in members {
      disposable.dispose();
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

  fn counting(count: &Arc<AtomicUsize>) -> BoxedDisposable {
    let count = count.clone();
    Disposables::create(move || {
      count.fetch_add(1, Ordering::SeqCst);
    })
  }

  #[rxcore_macro::test]
  fn remove_disposes_only_that_member() {
    let count = Arc::new(AtomicUsize::new(0));
    let composite = CompositeDisposable::new();
    let first = composite.insert(counting(&count));
    composite.insert(counting(&count));
    assert_eq!(composite.len(), 2);

    composite.remove(first.unwrap());
    assert_eq!(count.load(Ordering::SeqCst), 1);
    assert_eq!(composite.len(), 1);

    composite.dispose();
    composite.dispose();
    assert_eq!(count.load(Ordering::SeqCst), 2);
    assert!(composite.is_empty());
  }

  #[rxcore_macro::test]
  fn insert_after_dispose() {
    let count = Arc::new(AtomicUsize::new(0));
    let composite = CompositeDisposable::new();
    composite.dispose();
    assert!(composite.insert(counting(&count)).is_none());
    assert_eq!(count.load(Ordering::SeqCst), 1);
  }
}
