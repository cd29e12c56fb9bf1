use std::sync::{Arc, Weak};

use parking_lot::Mutex;

use crate::{
  disposable::{BoxedDisposable, Disposable, Disposables, SerialDisposable},
  event::Event,
  observable::{Observable, Producer},
  observer::{AnyObserver, Observer},
  scheduler::{CurrentThreadScheduler, ImmediateScheduler},
  sink::Sink,
};

struct Concat<I>(I);

struct ConcatSink<T, It> {
  me: Weak<Self>,
  sink: Sink<T>,
  sources: Mutex<It>,
  current: SerialDisposable,
}

impl<T, It> ConcatSink<T, It>
where
  T: Send + 'static,
  It: Iterator<Item = Observable<T>> + Send + 'static,
{
  /// Switches to the next source on the current-thread trampoline. A source
  /// completing synchronously inside `subscribe` only queues the switch, so
  /// the stack stays flat and the caller of `subscribe` gets its disposable
  /// before the next source starts.
  fn move_next(&self) {
    let Some(me) = self.me.upgrade() else { return };
    CurrentThreadScheduler.schedule_action(Box::new(move || {
      me.subscribe_next();
      Disposables::nop()
    }));
  }

  fn subscribe_next(&self) {
    if self.sink.is_disposed() {
      return;
    }
    let next = self.sources.lock().next();
    match next {
      Some(source) => {
        let Some(me) = self.me.upgrade() else { return };
        let subscription = source.subscribe(me);
        self.current.set(subscription);
      }
      None => {
        self.sink.forward_on(Event::Completed);
        self.dispose();
      }
    }
  }
}

impl<T, It> Observer<T> for ConcatSink<T, It>
where
  T: Send + 'static,
  It: Iterator<Item = Observable<T>> + Send + 'static,
{
  fn on(&self, event: Event<T>) {
    match event {
      Event::Next(_) => self.sink.forward_on(event),
      Event::Error(_) => {
        self.sink.forward_on(event);
        self.dispose();
      }
      Event::Completed => self.move_next(),
    }
  }
}

impl<T, It: Send> Disposable for ConcatSink<T, It> {
  fn dispose(&self) {
    self.sink.dispose();
    self.current.dispose();
  }

  fn is_disposed(&self) -> bool { self.sink.is_disposed() }
}

impl<T, I> Producer<T> for Concat<I>
where
  T: Send + 'static,
  I: IntoIterator<Item = Observable<T>> + Clone + Send + Sync,
  I::IntoIter: Send + 'static,
{
  fn subscribe(&self, observer: AnyObserver<T>) -> BoxedDisposable {
    let sink = Arc::new_cyclic(|me| ConcatSink {
      me: me.clone(),
      sink: Sink::new(observer),
      sources: Mutex::new(self.0.clone().into_iter()),
      current: SerialDisposable::new(),
    });
    sink.move_next();
    Box::new(sink)
  }
}

impl<T: Send + 'static> Observable<T> {
  /// Subscribes to each source in turn, moving on when the active one
  /// completes. Values and errors are forwarded as they arrive; an error
  /// ends the whole sequence.
  ///
  /// The sequence of sources may be endless:
  ///
  /// ```rust
  /// use rxcore::prelude::*;
  ///
  /// let ones = Observable::concat(std::iter::repeat(Observable::just(1)));
  /// ones.take(3).subscribe_next(|v| assert_eq!(v, 1));
  /// ```
  pub fn concat<I>(sources: I) -> Observable<T>
  where
    I: IntoIterator<Item = Observable<T>> + Clone + Send + Sync + 'static,
    I::IntoIter: Send + 'static,
  {
    Observable::new(Concat(sources))
  }

  /// `self`, then `other`.
  pub fn concat_with(&self, other: Observable<T>) -> Observable<T> {
    Observable::concat(vec![self.clone(), other])
  }
}
