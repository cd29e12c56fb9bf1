use std::sync::Arc;

use crate::{
  disposable::{BoxedDisposable, Disposable},
  error::RxError,
  event::Event,
  observable::{Observable, Producer},
  observer::{AnyObserver, Observer},
  sink::{self, Sink},
};

type Predicate<T> = Arc<dyn Fn(&T) -> Result<bool, RxError> + Send + Sync>;

struct Filter<T> {
  source: Observable<T>,
  predicate: Predicate<T>,
}

struct FilterSink<T> {
  sink: Sink<T>,
  predicate: Predicate<T>,
}

impl<T> Observer<T> for FilterSink<T> {
  fn on(&self, event: Event<T>) {
    match event {
      Event::Next(value) => match (self.predicate)(&value) {
        Ok(true) => self.sink.forward_on(Event::Next(value)),
        Ok(false) => {}
        Err(err) => self.sink.forward_terminal(Event::Error(err)),
      },
      terminal => self.sink.forward_terminal(terminal),
    }
  }
}

impl<T> Disposable for FilterSink<T> {
  fn dispose(&self) { self.sink.dispose() }

  fn is_disposed(&self) -> bool { self.sink.is_disposed() }
}

impl<T: Send + 'static> Producer<T> for Filter<T> {
  fn subscribe(&self, observer: AnyObserver<T>) -> BoxedDisposable {
    let sink = FilterSink { sink: Sink::new(observer), predicate: self.predicate.clone() };
    sink::run(&self.source, sink, |s| &s.sink)
  }
}

impl<T: Send + 'static> Observable<T> {
  /// Forwards only the values matching `predicate`.
  pub fn filter<F>(&self, predicate: F) -> Observable<T>
  where
    F: Fn(&T) -> bool + Send + Sync + 'static,
  {
    self.try_filter(move |value| Ok(predicate(value)))
  }

  /// Like [`Observable::filter`] with a fallible predicate; a failure ends
  /// the stream with `Error`.
  pub fn try_filter<F>(&self, predicate: F) -> Observable<T>
  where
    F: Fn(&T) -> Result<bool, RxError> + Send + Sync + 'static,
  {
    Observable::new(Filter { source: self.clone(), predicate: Arc::new(predicate) })
  }
}
