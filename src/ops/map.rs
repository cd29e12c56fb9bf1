use std::sync::Arc;

use crate::{
  disposable::{BoxedDisposable, Disposable},
  error::RxError,
  event::Event,
  observable::{Observable, Producer},
  observer::{AnyObserver, Observer},
  sink::{self, Sink},
};

type Transform<T, U> = Arc<dyn Fn(T) -> Result<U, RxError> + Send + Sync>;

struct Map<T, U> {
  source: Observable<T>,
  transform: Transform<T, U>,
}

struct MapSink<T, U> {
  sink: Sink<U>,
  transform: Transform<T, U>,
}

impl<T, U> Observer<T> for MapSink<T, U> {
  fn on(&self, event: Event<T>) {
    match event.try_map(|value| (self.transform)(value)) {
      next @ Event::Next(_) => self.sink.forward_on(next),
      terminal => self.sink.forward_terminal(terminal),
    }
  }
}

impl<T, U> Disposable for MapSink<T, U> {
  fn dispose(&self) { self.sink.dispose() }

  fn is_disposed(&self) -> bool { self.sink.is_disposed() }
}

impl<T: Send + 'static, U: 'static> Producer<U> for Map<T, U> {
  fn subscribe(&self, observer: AnyObserver<U>) -> BoxedDisposable {
    let sink = MapSink { sink: Sink::new(observer), transform: self.transform.clone() };
    sink::run(&self.source, sink, |s| &s.sink)
  }
}

impl<T: Send + 'static> Observable<T> {
  /// Applies `f` to every value.
  pub fn map<U, F>(&self, f: F) -> Observable<U>
  where
    U: Send + 'static,
    F: Fn(T) -> U + Send + Sync + 'static,
  {
    self.try_map(move |value| Ok(f(value)))
  }

  /// Applies a fallible `f` to every value. The first failure is delivered
  /// as `Error` and ends the subscription.
  pub fn try_map<U, F>(&self, f: F) -> Observable<U>
  where
    U: Send + 'static,
    F: Fn(T) -> Result<U, RxError> + Send + Sync + 'static,
  {
    Observable::new(Map { source: self.clone(), transform: Arc::new(f) })
  }
}
