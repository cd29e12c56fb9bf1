use std::sync::Arc;

use parking_lot::Mutex;

use crate::{
  disposable::{BoxedDisposable, Disposable},
  error::RxError,
  event::Event,
  observable::{Observable, Producer},
  observer::{AnyObserver, Observer},
  sink::{self, Sink},
};

type Accumulator<A, T> = Arc<dyn Fn(A, T) -> Result<A, RxError> + Send + Sync>;
type Selector<A, R> = Arc<dyn Fn(A) -> Result<R, RxError> + Send + Sync>;

struct Reduce<T, A, R> {
  source: Observable<T>,
  seed: A,
  accumulator: Accumulator<A, T>,
  selector: Selector<A, R>,
}

struct ReduceSink<T, A, R> {
  sink: Sink<R>,
  /// `None` once the result was emitted or the stream failed.
  accumulated: Mutex<Option<A>>,
  accumulator: Accumulator<A, T>,
  selector: Selector<A, R>,
}

impl<T, A: Send, R> Observer<T> for ReduceSink<T, A, R> {
  fn on(&self, event: Event<T>) {
    match event {
      Event::Next(value) => {
        let failed = {
          let mut accumulated = self.accumulated.lock();
          let Some(current) = accumulated.take() else { return };
          match (self.accumulator)(current, value) {
            Ok(next) => {
              *accumulated = Some(next);
              None
            }
            Err(err) => Some(err),
          }
        };
        if let Some(err) = failed {
          self.sink.forward_terminal(Event::Error(err));
        }
      }
      Event::Error(err) => {
        self.accumulated.lock().take();
        self.sink.forward_terminal(Event::Error(err));
      }
      Event::Completed => {
        let Some(accumulated) = self.accumulated.lock().take() else { return };
        match (self.selector)(accumulated) {
          Ok(result) => {
            self.sink.forward_on(Event::Next(result));
            self.sink.forward_terminal(Event::Completed);
          }
          Err(err) => self.sink.forward_terminal(Event::Error(err)),
        }
      }
    }
  }
}

impl<T, A: Send, R> Disposable for ReduceSink<T, A, R> {
  fn dispose(&self) { self.sink.dispose() }

  fn is_disposed(&self) -> bool { self.sink.is_disposed() }
}

impl<T, A, R> Producer<R> for Reduce<T, A, R>
where
  T: Send + 'static,
  A: Clone + Send + Sync + 'static,
  R: 'static,
{
  fn subscribe(&self, observer: AnyObserver<R>) -> BoxedDisposable {
    let sink = ReduceSink {
      sink: Sink::new(observer),
      accumulated: Mutex::new(Some(self.seed.clone())),
      accumulator: self.accumulator.clone(),
      selector: self.selector.clone(),
    };
    sink::run(&self.source, sink, |s| &s.sink)
  }
}

impl<T: Send + 'static> Observable<T> {
  /// Folds every value into `seed` and emits the final accumulation once
  /// the source completes. An empty source emits `seed`.
  pub fn reduce<A, F>(&self, seed: A, accumulator: F) -> Observable<A>
  where
    A: Clone + Send + Sync + 'static,
    F: Fn(A, T) -> A + Send + Sync + 'static,
  {
    self.try_reduce(seed, move |acc, value| Ok(accumulator(acc, value)), Ok)
  }

  /// Fallible fold with a result selector applied on completion. A failure
  /// in either closure ends the stream with `Error`; nothing partial is
  /// emitted.
  pub fn try_reduce<A, R, F, S>(&self, seed: A, accumulator: F, selector: S) -> Observable<R>
  where
    A: Clone + Send + Sync + 'static,
    R: Send + 'static,
    F: Fn(A, T) -> Result<A, RxError> + Send + Sync + 'static,
    S: Fn(A) -> Result<R, RxError> + Send + Sync + 'static,
  {
    Observable::new(Reduce {
      source: self.clone(),
      seed,
      accumulator: Arc::new(accumulator),
      selector: Arc::new(selector),
    })
  }
}
