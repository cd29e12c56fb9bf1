use std::sync::Arc;

use parking_lot::Mutex;
use tracing::debug;

use crate::{
  disposable::{BoxedDisposable, Disposable},
  event::Event,
  observable::{ConnectableObservable, Connection, Observable, Producer},
  observer::{AnyObserver, Observer, StopFlag},
  sink::Sink,
};

#[derive(Default)]
struct Counter {
  subscribers: usize,
  connection: Option<Connection>,
}

struct RefCount<T> {
  source: ConnectableObservable<T>,
  counter: Arc<Mutex<Counter>>,
}

struct RefCountSink<T> {
  sink: Sink<T>,
  released: StopFlag,
  counter: Arc<Mutex<Counter>>,
}

impl<T> Observer<T> for RefCountSink<T> {
  fn on(&self, event: Event<T>) {
    let terminal = event.is_terminal();
    self.sink.forward_on(event);
    if terminal {
      self.dispose();
    }
  }
}

impl<T> Disposable for RefCountSink<T> {
  fn dispose(&self) {
    self.sink.dispose();
    if !self.released.try_stop() {
      return;
    }
    let connection = {
      let mut counter = self.counter.lock();
      counter.subscribers -= 1;
      if counter.subscribers == 0 {
        counter.connection.take()
      } else {
        None
      }
    };
    if let Some(connection) = connection {
      debug!("last subscriber left, disconnecting");
      connection.dispose();
    }
  }

  fn is_disposed(&self) -> bool { self.sink.is_disposed() }
}

impl<T: Send + 'static> Producer<T> for RefCount<T> {
  fn subscribe(&self, observer: AnyObserver<T>) -> BoxedDisposable {
    let first = {
      let mut counter = self.counter.lock();
      counter.subscribers += 1;
      counter.subscribers == 1
    };
    let sink = Arc::new(RefCountSink {
      sink: Sink::new(observer),
      released: StopFlag::new(),
      counter: self.counter.clone(),
    });
    let subscription = self.source.subscribe(sink.clone());
    sink.sink.set_upstream(subscription);

    if first {
      debug!("first subscriber, connecting");
      // The connection is only stored once `connect` returns: subscribers
      // leaving while it is still emitting must not tear it down from
      // inside that emission.
      let connection = self.source.connect();
      let stale = {
        let mut counter = self.counter.lock();
        if counter.subscribers == 0 {
          Some(connection)
        } else {
          if counter.connection.is_none() {
            counter.connection = Some(connection);
          }
          None
        }
      };
      if let Some(connection) = stale {
        debug!("no subscriber left after connecting, disconnecting");
        connection.dispose();
      }
    }
    Box::new(sink)
  }
}

impl<T: Send + 'static> ConnectableObservable<T> {
  /// An observable that connects on its first subscriber and disconnects
  /// when the last one leaves. A later subscriber connects again.
  pub fn ref_count(&self) -> Observable<T> {
    Observable::new(RefCount { source: self.clone(), counter: Arc::default() })
  }
}

#[cfg(test)]
mod tests {
  use std::sync::atomic::{AtomicUsize, Ordering};

  use super::*;
  use crate::{
    disposable::Disposables,
    subject::{PublishSubject, Subject},
    test_util::Recorder,
  };

  struct Counted {
    subscriptions: Arc<AtomicUsize>,
    disposals: Arc<AtomicUsize>,
    input: PublishSubject<i32>,
    source: Observable<i32>,
  }

  fn counted() -> Counted {
    let subscriptions = Arc::new(AtomicUsize::new(0));
    let disposals = Arc::new(AtomicUsize::new(0));
    let input = PublishSubject::new();
    let (c_subscriptions, c_disposals, c_input) =
      (subscriptions.clone(), disposals.clone(), input.clone());
    let source = Observable::create(move |observer| {
      c_subscriptions.fetch_add(1, Ordering::SeqCst);
      let inner = c_input.as_observable().subscribe(observer);
      let disposals = c_disposals.clone();
      Disposables::create(move || {
        inner.dispose();
        disposals.fetch_add(1, Ordering::SeqCst);
      })
    });
    Counted { subscriptions, disposals, input, source }
  }

  #[rxcore_macro::test]
  fn connects_once_and_disconnects_at_zero() {
    let Counted { subscriptions, disposals, input, source } = counted();
    let shared = source.publish().ref_count();
    let (a, b) = (Recorder::new(), Recorder::new());
    let da = shared.subscribe(a.clone());
    let db = shared.subscribe(b.clone());
    assert_eq!(subscriptions.load(Ordering::SeqCst), 1);

    input.on_next(1);
    da.dispose();
    input.on_next(2);
    assert_eq!(disposals.load(Ordering::SeqCst), 0);
    db.dispose();
    assert_eq!(disposals.load(Ordering::SeqCst), 1);
    assert!(!input.has_observers());

    assert_eq!(a.values(), vec![1]);
    assert_eq!(b.values(), vec![1, 2]);
  }

  #[rxcore_macro::test]
  fn reconnects_after_reaching_zero() {
    let Counted { subscriptions, input, source, .. } = counted();
    let shared = source.share();
    shared.subscribe(Recorder::new()).dispose();

    let late = Recorder::new();
    let _d = shared.subscribe(late.clone());
    input.on_next(3);
    assert_eq!(subscriptions.load(Ordering::SeqCst), 2);
    assert_eq!(late.values(), vec![3]);
  }

  #[rxcore_macro::test]
  fn completion_releases_the_connection() {
    let shared = Observable::from_iter(1..=3).share_replay(1);
    let first = Recorder::new();
    shared.subscribe(first.clone());
    assert_eq!(first.values(), vec![1, 2, 3]);
    assert_eq!(first.terminal_count(), 1);

    // The replay subject was reset with its connection, so the source runs
    // again for the next subscriber.
    let second = Recorder::new();
    shared.subscribe(second.clone());
    assert_eq!(second.values(), vec![1, 2, 3]);
  }

  #[rxcore_macro::test]
  fn take_through_share_stops_an_endless_source() {
    let recorder = Recorder::new();
    Observable::from_iter(0..).share().take(2).subscribe(recorder.clone());
    assert_eq!(recorder.events(), vec![Event::Next(0), Event::Next(1), Event::Completed]);
  }

  #[rxcore_macro::test]
  fn reaching_zero_during_connect_defers_teardown() {
    let disposals = Arc::new(AtomicUsize::new(0));
    let c_disposals = disposals.clone();
    let source = Observable::create(move |observer| {
      for v in 0..5 {
        observer.on_next(v);
      }
      let disposals = c_disposals.clone();
      Disposables::create(move || {
        disposals.fetch_add(1, Ordering::SeqCst);
      })
    });
    let subject = PublishSubject::new();
    let witness = Recorder::new();
    subject.subscribe(witness.clone());

    let recorder = Recorder::new();
    source.multicast(subject.clone()).ref_count().take(2).subscribe(recorder.clone());

    assert_eq!(recorder.values(), vec![0, 1]);
    assert_eq!(witness.values(), vec![0, 1, 2, 3, 4]);
    assert_eq!(disposals.load(Ordering::SeqCst), 1);
  }
}
