use crate::{
  disposable::{BoxedDisposable, Disposable},
  event::Event,
  observable::{Observable, Producer},
  observer::{AnyObserver, Observer, StopFlag},
  sink::{self, Sink},
};

struct First<T>(Observable<T>);

struct FirstSink<T> {
  sink: Sink<Option<T>>,
  done: StopFlag,
}

impl<T> Observer<T> for FirstSink<T> {
  fn on(&self, event: Event<T>) {
    match event {
      Event::Next(value) => {
        if self.done.try_stop() {
          self.sink.forward_on(Event::Next(Some(value)));
          self.sink.forward_terminal(Event::Completed);
        }
      }
      Event::Completed => {
        if self.done.try_stop() {
          self.sink.forward_on(Event::Next(None));
          self.sink.forward_terminal(Event::Completed);
        }
      }
      Event::Error(err) => self.sink.forward_terminal(Event::Error(err)),
    }
  }
}

impl<T> Disposable for FirstSink<T> {
  fn dispose(&self) { self.sink.dispose() }

  fn is_disposed(&self) -> bool { self.sink.is_disposed() }
}

impl<T: Send + 'static> Producer<Option<T>> for First<T> {
  fn subscribe(&self, observer: AnyObserver<Option<T>>) -> BoxedDisposable {
    let sink = FirstSink { sink: Sink::new(observer), done: StopFlag::new() };
    sink::run(&self.0, sink, |s| &s.sink)
  }
}

impl<T: Send + 'static> Observable<T> {
  /// Emits `Some(first value)` and completes, releasing the source right
  /// away. An empty source yields `None`.
  pub fn first(&self) -> Observable<Option<T>> { Observable::new(First(self.clone())) }
}
