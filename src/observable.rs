//! Observable: the cold, re-subscribable description of a stream.
//!
//! An [`Observable`] is a cheap handle around a [`Producer`]. It holds only
//! the recipe (upstream observables, closures, scheduler handles); every
//! `subscribe` builds fresh per-subscription state and returns the
//! [`BoxedDisposable`] that tears it down.
//!
//! Factories live in the submodules as associated functions
//! (`Observable::just`, `Observable::from_iter`, ...); operators live in
//! [`crate::ops`].

mod connectable;
mod create;
mod from_iter;
mod interval;
mod just;
mod optional;
mod timer;
mod trivial;

use std::sync::Arc;

pub use connectable::{ConnectableObservable, Connection};

use crate::{
  disposable::BoxedDisposable,
  error::RxError,
  event::Event,
  observer::{AnyObserver, EventObserver, ObserverFn},
  scheduler::{CurrentThreadScheduler, ImmediateScheduler},
};

/// Something that can be subscribed to.
///
/// Implementations start delivering synchronously inside `subscribe` (or
/// schedule the delivery) and return the disposable that stops it.
pub trait Producer<T>: Send + Sync {
  fn subscribe(&self, observer: AnyObserver<T>) -> BoxedDisposable;
}

/// A push-based sequence of `T`.
pub struct Observable<T>(Arc<dyn Producer<T>>);

impl<T> Clone for Observable<T> {
  fn clone(&self) -> Self { Observable(self.0.clone()) }
}

impl<T: Send + 'static> Observable<T> {
  /// Wraps a producer.
  pub fn new(producer: impl Producer<T> + 'static) -> Self { Observable(Arc::new(producer)) }

  /// Subscribes `observer` and returns the subscription.
  ///
  /// The outermost `subscribe` on a thread runs the whole subscription chain
  /// on the current-thread trampoline, so sources that emit from inside
  /// `subscribe` only start once every operator has its disposable wired.
  /// This is what lets `take` or `first` stop an infinite synchronous
  /// source.
  pub fn subscribe(&self, observer: AnyObserver<T>) -> BoxedDisposable {
    if CurrentThreadScheduler::is_schedule_required() {
      let producer = self.0.clone();
      CurrentThreadScheduler.schedule_action(Box::new(move || producer.subscribe(observer)))
    } else {
      self.0.subscribe(observer)
    }
  }

  /// Subscribes a closure for `Next` values; errors are logged.
  pub fn subscribe_next(&self, next: impl FnMut(T) + Send + 'static) -> BoxedDisposable {
    self.subscribe(Arc::new(ObserverFn::new().with_next(next)))
  }

  /// Subscribes one closure per event kind.
  pub fn subscribe_all(
    &self, next: impl FnMut(T) + Send + 'static, error: impl FnOnce(RxError) + Send + 'static,
    completed: impl FnOnce() + Send + 'static,
  ) -> BoxedDisposable {
    let observer = ObserverFn::new().with_next(next).with_error(error).with_completed(completed);
    self.subscribe(Arc::new(observer))
  }

  /// Subscribes a closure that receives every event.
  pub fn subscribe_with(&self, on: impl FnMut(Event<T>) + Send + 'static) -> BoxedDisposable {
    self.subscribe(Arc::new(EventObserver::new(on)))
  }
}

impl<T> Producer<T> for Observable<T> {
  #[inline]
  fn subscribe(&self, observer: AnyObserver<T>) -> BoxedDisposable { self.0.subscribe(observer) }
}
