use std::sync::Arc;

use crate::{
  disposable::{BoxedDisposable, Disposable},
  error::RxError,
  event::Event,
  observable::{Observable, Producer},
  observer::{AnyObserver, Observer},
  sink::{self, Sink},
};

type Transform<T, U> = Arc<dyn Fn(T) -> Result<Option<U>, RxError> + Send + Sync>;

struct CompactMap<T, U> {
  source: Observable<T>,
  transform: Transform<T, U>,
}

struct CompactMapSink<T, U> {
  sink: Sink<U>,
  transform: Transform<T, U>,
}

impl<T, U> Observer<T> for CompactMapSink<T, U> {
  fn on(&self, event: Event<T>) {
    match event {
      Event::Next(value) => match (self.transform)(value) {
        Ok(Some(mapped)) => self.sink.forward_on(Event::Next(mapped)),
        Ok(None) => {}
        Err(err) => self.sink.forward_terminal(Event::Error(err)),
      },
      Event::Error(err) => self.sink.forward_terminal(Event::Error(err)),
      Event::Completed => self.sink.forward_terminal(Event::Completed),
    }
  }
}

impl<T, U> Disposable for CompactMapSink<T, U> {
  fn dispose(&self) { self.sink.dispose() }

  fn is_disposed(&self) -> bool { self.sink.is_disposed() }
}

impl<T: Send + 'static, U: 'static> Producer<U> for CompactMap<T, U> {
  fn subscribe(&self, observer: AnyObserver<U>) -> BoxedDisposable {
    let sink = CompactMapSink { sink: Sink::new(observer), transform: self.transform.clone() };
    sink::run(&self.source, sink, |s| &s.sink)
  }
}

impl<T: Send + 'static> Observable<T> {
  /// Maps every value and forwards only the `Some` results.
  pub fn compact_map<U, F>(&self, f: F) -> Observable<U>
  where
    U: Send + 'static,
    F: Fn(T) -> Option<U> + Send + Sync + 'static,
  {
    self.try_compact_map(move |value| Ok(f(value)))
  }

  /// Fallible [`Observable::compact_map`].
  pub fn try_compact_map<U, F>(&self, f: F) -> Observable<U>
  where
    U: Send + 'static,
    F: Fn(T) -> Result<Option<U>, RxError> + Send + Sync + 'static,
  {
    Observable::new(CompactMap { source: self.clone(), transform: Arc::new(f) })
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::test_util::Recorder;

  #[rxcore_macro::test]
  fn drops_absent_results() {
    let recorder = Recorder::new();
    Observable::from_iter(vec!["1", "two", "3"])
      .compact_map(|s| s.parse::<i32>().ok())
      .subscribe(recorder.clone());
    assert_eq!(recorder.events(), vec![Event::Next(1), Event::Next(3), Event::Completed]);
  }

  #[rxcore_macro::test]
  fn failure_ends_the_stream() {
    let recorder = Recorder::new();
    Observable::from_iter(1..)
      .try_compact_map(|v: u32| match v {
        4 => Err(RxError::msg("four")),
        v if v % 2 == 0 => Ok(Some(v)),
        _ => Ok(None),
      })
      .subscribe(recorder.clone());
    assert_eq!(recorder.events(), vec![Event::Next(2), Event::Error(RxError::msg("four"))]);
  }
}
