use parking_lot::Mutex;

use crate::{
  disposable::{BoxedDisposable, Disposable},
  event::Event,
  observable::{Observable, Producer},
  observer::{AnyObserver, Observer},
  sink::{self, Sink},
};

struct Take<T> {
  source: Observable<T>,
  count: usize,
}

struct TakeSink<T> {
  sink: Sink<T>,
  remaining: Mutex<usize>,
}

impl<T> Observer<T> for TakeSink<T> {
  fn on(&self, event: Event<T>) {
    match event {
      Event::Next(value) => {
        let (emit, last) = {
          let mut remaining = self.remaining.lock();
          match *remaining {
            0 => (false, false),
            n => {
              *remaining = n - 1;
              (true, n == 1)
            }
          }
        };
        if emit {
          self.sink.forward_on(Event::Next(value));
        }
        if last {
          self.sink.forward_terminal(Event::Completed);
        }
      }
      terminal => self.sink.forward_terminal(terminal),
    }
  }
}

impl<T> Disposable for TakeSink<T> {
  fn dispose(&self) { self.sink.dispose() }

  fn is_disposed(&self) -> bool { self.sink.is_disposed() }
}

impl<T: Send + 'static> Producer<T> for Take<T> {
  fn subscribe(&self, observer: AnyObserver<T>) -> BoxedDisposable {
    let sink = TakeSink { sink: Sink::new(observer), remaining: Mutex::new(self.count) };
    sink::run(&self.source, sink, |s| &s.sink)
  }
}

impl<T: Send + 'static> Observable<T> {
  /// Forwards the first `count` values, then completes and releases the
  /// source. `take(0)` completes without subscribing to the source.
  pub fn take(&self, count: usize) -> Observable<T> {
    if count == 0 {
      return Observable::empty();
    }
    Observable::new(Take { source: self.clone(), count })
  }
}
