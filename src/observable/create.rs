use std::sync::Arc;

use crate::{
  disposable::{BoxedDisposable, Disposable},
  event::Event,
  observable::{Observable, Producer},
  observer::{AnyObserver, Observer},
  sink::Sink,
};

/// Source built from a subscribe closure, see [`Observable::create`].
struct AnonymousObservable<F> {
  subscribe: F,
}

struct AnonymousSink<T> {
  sink: Sink<T>,
}

impl<T> Observer<T> for AnonymousSink<T> {
  fn on(&self, event: Event<T>) {
    if event.is_terminal() {
      self.sink.forward_terminal(event)
    } else {
      self.sink.forward_on(event)
    }
  }
}

impl<T> Disposable for AnonymousSink<T> {
  fn dispose(&self) { self.sink.dispose() }

  fn is_disposed(&self) -> bool { self.sink.is_disposed() }
}

impl<T, F> Producer<T> for AnonymousObservable<F>
where
  T: 'static,
  F: Fn(AnyObserver<T>) -> BoxedDisposable + Send + Sync,
{
  fn subscribe(&self, observer: AnyObserver<T>) -> BoxedDisposable {
    let sink = Arc::new(AnonymousSink { sink: Sink::new(observer) });
    let upstream = (self.subscribe)(sink.clone());
    sink.sink.set_upstream(upstream);
    Box::new(sink)
  }
}

impl<T: Send + 'static> Observable<T> {
  /// Creates an observable from a subscribe function.
  ///
  /// The closure runs once per subscription. Whatever it pushes into the
  /// observer is checked against the event grammar: everything after the
  /// first terminal event, or after the subscription is disposed, is
  /// dropped, and a terminal event disposes the returned disposable.
  ///
  /// ```rust
  /// use rxcore::prelude::*;
  ///
  /// let source = Observable::create(|observer| {
  ///   observer.on_next(1);
  ///   observer.on_next(2);
  ///   observer.on_completed();
  ///   Disposables::nop()
  /// });
  /// source.subscribe_next(|v| println!("{v}"));
  /// ```
  pub fn create<F>(subscribe: F) -> Self
  where
    F: Fn(AnyObserver<T>) -> BoxedDisposable + Send + Sync + 'static,
  {
    Observable::new(AnonymousObservable { subscribe })
  }
}
