//! Cancellation handles.
//!
//! Every `subscribe` and every `schedule` returns a [`Disposable`]. Disposing
//! it stops further delivery and releases whatever the subscription or the
//! scheduled work holds. Disposing is idempotent and may race with event
//! delivery on another thread.

mod anonymous;
mod bag;
mod composite;
mod guard;
mod serial;
mod single_assignment;

use std::sync::Arc;

pub use anonymous::{AnonymousDisposable, NopDisposable};
pub use bag::{Bag, BagKey};
pub use composite::CompositeDisposable;
pub use guard::DisposeGuard;
pub use serial::SerialDisposable;
pub use single_assignment::SingleAssignmentDisposable;

/// A capability to cancel an in-flight subscription or a piece of scheduled
/// work.
pub trait Disposable: Send + Sync {
  /// Releases the resource. Calling it more than once has the same effect as
  /// calling it once.
  fn dispose(&self);

  fn is_disposed(&self) -> bool;
}

/// Type-erased disposable, the return type of `subscribe` and `schedule`.
pub type BoxedDisposable = Box<dyn Disposable>;

impl<D: Disposable + ?Sized> Disposable for Box<D> {
  #[inline]
  fn dispose(&self) { (**self).dispose() }

  #[inline]
  fn is_disposed(&self) -> bool { (**self).is_disposed() }
}

impl<D: Disposable + ?Sized> Disposable for Arc<D> {
  #[inline]
  fn dispose(&self) { (**self).dispose() }

  #[inline]
  fn is_disposed(&self) -> bool { (**self).is_disposed() }
}

/// Convenience methods available on every disposable.
pub trait DisposableExt: Disposable + Sized + 'static {
  fn boxed(self) -> BoxedDisposable { Box::new(self) }

  /// Activates RAII behavior: the returned guard disposes `self` when it goes
  /// out of scope.
  ///
  /// **Attention:** if the return value is not bound to a variable it is
  /// dropped, and the subscription disposed, immediately.
  fn dispose_when_dropped(self) -> DisposeGuard<Self> { DisposeGuard::new(self) }
}

impl<D: Disposable + Sized + 'static> DisposableExt for D {}

/// Constructors for the common disposables.
pub struct Disposables;

impl Disposables {
  /// A disposable that holds nothing.
  #[inline]
  pub fn nop() -> BoxedDisposable { Box::new(NopDisposable) }

  /// Runs `action` once, on the first dispose.
  pub fn create(action: impl FnOnce() + Send + 'static) -> BoxedDisposable {
    Box::new(AnonymousDisposable::new(action))
  }

  /// Disposes every member together.
  pub fn composite(members: impl IntoIterator<Item = BoxedDisposable>) -> BoxedDisposable {
    Box::new(CompositeDisposable::from_iter(members))
  }
}
