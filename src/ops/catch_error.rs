use std::sync::{Arc, Weak};

use crate::{
  disposable::{BoxedDisposable, Disposable, SerialDisposable},
  error::RxError,
  event::Event,
  observable::{Observable, Producer},
  observer::{AnyObserver, Observer},
  sink::Sink,
};

type Handler<T> = Arc<dyn Fn(RxError) -> Observable<T> + Send + Sync>;

struct CatchError<T> {
  source: Observable<T>,
  handler: Handler<T>,
}

struct CatchSink<T> {
  me: Weak<Self>,
  sink: Sink<T>,
  handler: Handler<T>,
  fallback: SerialDisposable,
}

impl<T: Send + 'static> Observer<T> for CatchSink<T> {
  fn on(&self, event: Event<T>) {
    match event {
      Event::Next(_) => self.sink.forward_on(event),
      Event::Completed => {
        self.sink.forward_on(event);
        self.dispose();
      }
      Event::Error(err) => {
        let Some(me) = self.me.upgrade() else { return };
        let fallback = (self.handler)(err);
        self.fallback.set(fallback.subscribe(Arc::new(CatchSwitch { parent: me })));
      }
    }
  }
}

impl<T: Send> Disposable for CatchSink<T> {
  fn dispose(&self) {
    self.sink.dispose();
    self.fallback.dispose();
  }

  fn is_disposed(&self) -> bool { self.sink.is_disposed() }
}

/// Observes the fallback observable once the source failed.
struct CatchSwitch<T> {
  parent: Arc<CatchSink<T>>,
}

impl<T: Send> Observer<T> for CatchSwitch<T> {
  fn on(&self, event: Event<T>) {
    let terminal = event.is_terminal();
    self.parent.sink.forward_on(event);
    if terminal {
      self.parent.dispose();
    }
  }
}

impl<T: Send + 'static> Producer<T> for CatchError<T> {
  fn subscribe(&self, observer: AnyObserver<T>) -> BoxedDisposable {
    let sink = Arc::new_cyclic(|me| CatchSink {
      me: me.clone(),
      sink: Sink::new(observer),
      handler: self.handler.clone(),
      fallback: SerialDisposable::new(),
    });
    let upstream = self.source.subscribe(sink.clone());
    sink.sink.set_upstream(upstream);
    Box::new(sink)
  }
}

impl<T: Send + 'static> Observable<T> {
  /// On error, continues with the observable `handler` returns for it.
  pub fn catch_error<F>(&self, handler: F) -> Observable<T>
  where
    F: Fn(RxError) -> Observable<T> + Send + Sync + 'static,
  {
    Observable::new(CatchError { source: self.clone(), handler: Arc::new(handler) })
  }
}

impl<T: Clone + Send + Sync + 'static> Observable<T> {
  /// On error, emits `element` and completes.
  pub fn catch_error_just_return(&self, element: T) -> Observable<T> {
    self.catch_error(move |_| Observable::just(element.clone()))
  }
}
