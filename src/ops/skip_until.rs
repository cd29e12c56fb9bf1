use std::sync::Arc;

use parking_lot::Mutex;

use crate::{
  disposable::{BoxedDisposable, Disposable, SingleAssignmentDisposable},
  event::Event,
  observable::{Observable, Producer},
  observer::{AnyObserver, Observer},
  sink::Sink,
};

struct SkipUntil<T, U> {
  source: Observable<T>,
  other: Observable<U>,
}

struct SkipUntilSink<T> {
  sink: Sink<T>,
  forward_elements: Mutex<bool>,
  other: SingleAssignmentDisposable,
}

impl<T> Observer<T> for SkipUntilSink<T> {
  fn on(&self, event: Event<T>) {
    match event {
      Event::Next(_) => {
        let forward = *self.forward_elements.lock();
        if forward {
          self.sink.forward_on(event);
        }
      }
      terminal => {
        self.sink.forward_on(terminal);
        self.dispose();
      }
    }
  }
}

impl<T> Disposable for SkipUntilSink<T> {
  fn dispose(&self) {
    self.sink.dispose();
    self.other.dispose();
  }

  fn is_disposed(&self) -> bool { self.sink.is_disposed() }
}

/// Watches the trigger source on behalf of a [`SkipUntilSink`].
struct SkipUntilOther<T> {
  parent: Arc<SkipUntilSink<T>>,
}

impl<T, U> Observer<U> for SkipUntilOther<T> {
  fn on(&self, event: Event<U>) {
    match event {
      Event::Next(_) => {
        *self.parent.forward_elements.lock() = true;
        self.parent.other.dispose();
      }
      Event::Error(err) => {
        self.parent.sink.forward_on(Event::Error(err));
        self.parent.dispose();
      }
      // Forwarding never starts, but the source keeps running.
      Event::Completed => self.parent.other.dispose(),
    }
  }
}

impl<T, U> Producer<T> for SkipUntil<T, U>
where
  T: Send + 'static,
  U: Send + 'static,
{
  fn subscribe(&self, observer: AnyObserver<T>) -> BoxedDisposable {
    let sink = Arc::new(SkipUntilSink {
      sink: Sink::new(observer),
      forward_elements: Mutex::new(false),
      other: SingleAssignmentDisposable::new(),
    });
    let other = self.other.subscribe(Arc::new(SkipUntilOther { parent: sink.clone() }));
    sink.other.set(other);
    let upstream = self.source.subscribe(sink.clone());
    sink.sink.set_upstream(upstream);
    Box::new(sink)
  }
}

impl<T: Send + 'static> Observable<T> {
  /// Drops values until `other` emits its first value, then forwards
  /// everything and lets go of `other`.
  ///
  /// An error from either source ends the stream. If `other` completes
  /// without emitting, values are never forwarded, but the completion or
  /// error of `self` still is.
  pub fn skip_until<U: Send + 'static>(&self, other: Observable<U>) -> Observable<T> {
    Observable::new(SkipUntil { source: self.clone(), other })
  }
}
