//! Observer trait and implementations
//!
//! The Observer is the consumer side of a stream. Everything it receives is
//! funnelled through a single method, [`Observer::on`], which takes an
//! [`Event`]. Observers are shared between the producer that pushes into them
//! and the disposable that cancels them, so they take `&self` and are
//! `Send + Sync`.

use std::sync::{
  atomic::{AtomicBool, Ordering},
  Arc,
};

use parking_lot::Mutex;
use tracing::warn;

use crate::{error::RxError, event::Event};

// ============================================================================
// Observer Trait
// ============================================================================

/// Observer trait: The consumer of data in reactive programming
///
/// An Observer receives values, errors, and completion notifications from an
/// Observable. The grammar is `Next* (Error | Completed)?`; implementations
/// built on [`StopFlag`] turn every call after the first terminal event into a
/// no-op.
pub trait Observer<T>: Send + Sync {
  /// Receives one notification.
  fn on(&self, event: Event<T>);

  /// Receive the next value from the observable
  #[inline]
  fn on_next(&self, value: T) { self.on(Event::Next(value)) }

  /// Handle an error from the observable
  #[inline]
  fn on_error(&self, err: RxError) { self.on(Event::Error(err)) }

  /// Handle completion of the observable
  #[inline]
  fn on_completed(&self) { self.on(Event::Completed) }
}

/// Type-erased, shareable observer.
pub type AnyObserver<T> = Arc<dyn Observer<T>>;

impl<T, O> Observer<T> for Arc<O>
where
  O: Observer<T> + ?Sized,
{
  #[inline]
  fn on(&self, event: Event<T>) { (**self).on(event) }
}

// ============================================================================
// StopFlag
// ============================================================================

/// One-way switch shared by everything that must stop exactly once.
///
/// `try_stop` is an atomic swap, so of any number of racing callers exactly
/// one observes `true`.
#[derive(Debug, Default)]
pub struct StopFlag(AtomicBool);

impl StopFlag {
  #[inline]
  pub const fn new() -> Self { StopFlag(AtomicBool::new(false)) }

  /// Flips the flag. Returns `true` only for the caller that flipped it.
  #[inline]
  pub fn try_stop(&self) -> bool { !self.0.swap(true, Ordering::AcqRel) }

  #[inline]
  pub fn is_stopped(&self) -> bool { self.0.load(Ordering::Acquire) }
}

// ============================================================================
// Closure observers
// ============================================================================

type NextFn<T> = Box<dyn FnMut(T) + Send>;
type ErrorFn = Box<dyn FnOnce(RxError) + Send>;
type CompletedFn = Box<dyn FnOnce() + Send>;

struct Handlers<T> {
  next: Option<NextFn<T>>,
  error: Option<ErrorFn>,
  completed: Option<CompletedFn>,
}

/// An observer assembled from closures.
///
/// ```rust
/// use std::sync::Arc;
/// use rxcore::prelude::*;
///
/// let observer = on_next(|v: i32| println!("{v}"))
///   .with_error(|e| eprintln!("{e}"))
///   .with_completed(|| println!("done"));
/// Observable::just(1).subscribe(Arc::new(observer));
/// ```
///
/// The handlers are dropped once a terminal event is delivered. An error
/// without an error handler is logged at `warn`.
///
/// The `Next` handler runs under a lock that is not reentrant: it must not
/// cause another value to be delivered to this same observer.
pub struct ObserverFn<T> {
  stopped: StopFlag,
  handlers: Mutex<Handlers<T>>,
}

impl<T> Default for ObserverFn<T> {
  fn default() -> Self {
    ObserverFn {
      stopped: StopFlag::new(),
      handlers: Mutex::new(Handlers { next: None, error: None, completed: None }),
    }
  }
}

impl<T> ObserverFn<T> {
  /// An observer that ignores everything.
  pub fn new() -> Self { Self::default() }

  pub fn with_next(self, f: impl FnMut(T) + Send + 'static) -> Self {
    self.handlers.lock().next = Some(Box::new(f));
    self
  }

  pub fn with_error(self, f: impl FnOnce(RxError) + Send + 'static) -> Self {
    self.handlers.lock().error = Some(Box::new(f));
    self
  }

  pub fn with_completed(self, f: impl FnOnce() + Send + 'static) -> Self {
    self.handlers.lock().completed = Some(Box::new(f));
    self
  }

  #[inline]
  pub fn is_stopped(&self) -> bool { self.stopped.is_stopped() }
}

impl<T> Observer<T> for ObserverFn<T> {
  fn on(&self, event: Event<T>) {
    match event {
      Event::Next(value) => {
        if self.stopped.is_stopped() {
          return;
        }
        if let Some(next) = self.handlers.lock().next.as_mut() {
          next(value);
        }
      }
      Event::Error(err) => {
        if !self.stopped.try_stop() {
          return;
        }
        let handler = self.take_handlers().error;
        match handler {
          Some(handler) => handler(err),
          None => warn!(error = %err, "unhandled error reached a closure observer"),
        }
      }
      Event::Completed => {
        if !self.stopped.try_stop() {
          return;
        }
        if let Some(handler) = self.take_handlers().completed {
          handler();
        }
      }
    }
  }
}

impl<T> ObserverFn<T> {
  fn take_handlers(&self) -> Handlers<T> {
    let mut handlers = self.handlers.lock();
    Handlers {
      next: handlers.next.take(),
      error: handlers.error.take(),
      completed: handlers.completed.take(),
    }
  }
}

/// Observer with only a `Next` handler.
pub fn on_next<T>(f: impl FnMut(T) + Send + 'static) -> ObserverFn<T> {
  ObserverFn::new().with_next(f)
}

/// Observer with only an `Error` handler.
pub fn on_error<T>(f: impl FnOnce(RxError) + Send + 'static) -> ObserverFn<T> {
  ObserverFn::new().with_error(f)
}

/// Observer with only a `Completed` handler.
pub fn on_completed<T>(f: impl FnOnce() + Send + 'static) -> ObserverFn<T> {
  ObserverFn::new().with_completed(f)
}

/// Observer that hands every event, terminal ones included, to one closure.
pub struct EventObserver<F> {
  stopped: StopFlag,
  handler: Mutex<F>,
}

impl<F> EventObserver<F> {
  pub fn new(handler: F) -> Self {
    EventObserver { stopped: StopFlag::new(), handler: Mutex::new(handler) }
  }
}

impl<T, F> Observer<T> for EventObserver<F>
where
  F: FnMut(Event<T>) + Send,
{
  fn on(&self, event: Event<T>) {
    let deliver = if event.is_terminal() {
      self.stopped.try_stop()
    } else {
      !self.stopped.is_stopped()
    };
    if deliver {
      let mut handler = self.handler.lock();
      (*handler)(event);
    }
  }
}
