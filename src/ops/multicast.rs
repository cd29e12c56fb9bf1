use crate::{
  observable::{ConnectableObservable, Observable},
  subject::{PublishSubject, ReplaySubject, Subject},
};

impl<T: Send + 'static> Observable<T> {
  /// Shares one subscription to `self` through `subject`. The same subject
  /// serves every connection, so once it has terminated later connections
  /// only replay that terminal event.
  pub fn multicast<S: Subject<T>>(&self, subject: S) -> ConnectableObservable<T> {
    ConnectableObservable::new(self.clone(), move || subject.clone())
  }

  /// Shares one subscription to `self` through a subject produced by
  /// `factory`, called again for each connection after the previous one
  /// ended.
  pub fn multicast_with<S, F>(&self, factory: F) -> ConnectableObservable<T>
  where
    S: Subject<T>,
    F: Fn() -> S + Send + Sync + 'static,
  {
    ConnectableObservable::new(self.clone(), factory)
  }
}

impl<T: Clone + Send + Sync + 'static> Observable<T> {
  /// Multicast through a [`PublishSubject`].
  pub fn publish(&self) -> ConnectableObservable<T> { self.multicast_with(PublishSubject::new) }

  /// Multicast through a [`ReplaySubject`] keeping `buffer_size` values.
  pub fn replay(&self, buffer_size: usize) -> ConnectableObservable<T> {
    self.multicast_with(move || ReplaySubject::new(buffer_size))
  }

  /// Multicast through an unbounded [`ReplaySubject`].
  pub fn replay_all(&self) -> ConnectableObservable<T> {
    self.multicast_with(ReplaySubject::unbounded)
  }

  /// `publish().ref_count()`: connected while anybody is subscribed.
  pub fn share(&self) -> Observable<T> { self.publish().ref_count() }

  /// `replay(buffer_size).ref_count()`.
  pub fn share_replay(&self, buffer_size: usize) -> Observable<T> {
    self.replay(buffer_size).ref_count()
  }
}

#[cfg(test)]
mod tests {
  use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
  };

  use super::*;
  use crate::{
    disposable::{Disposable, Disposables},
    event::Event,
    observer::Observer,
    test_util::Recorder,
  };

  fn counted_source() -> (Arc<AtomicUsize>, PublishSubject<i32>, Observable<i32>) {
    let subscriptions = Arc::new(AtomicUsize::new(0));
    let input = PublishSubject::new();
    let (c_subscriptions, c_input) = (subscriptions.clone(), input.clone());
    let source = Observable::create(move |observer| {
      c_subscriptions.fetch_add(1, Ordering::SeqCst);
      let inner = c_input.as_observable().subscribe(observer);
      Disposables::create(move || inner.dispose())
    });
    (subscriptions, input, source)
  }

  #[rxcore_macro::test]
  fn publish_shares_one_subscription() {
    let (subscriptions, input, source) = counted_source();
    let published = source.publish();
    let (a, b) = (Recorder::new(), Recorder::new());
    published.subscribe(a.clone());
    published.subscribe(b.clone());
    let connection = published.connect();
    input.on_next(1);
    input.on_completed();

    assert_eq!(subscriptions.load(Ordering::SeqCst), 1);
    assert_eq!(a.events(), vec![Event::Next(1), Event::Completed]);
    assert_eq!(b.events(), a.events());
    assert!(connection.is_disposed());
  }

  #[rxcore_macro::test]
  fn replay_two_late_subscriber() {
    let (_, input, source) = counted_source();
    let replayed = source.replay(2);
    let _connection = replayed.connect();
    for v in 1..=3 {
      input.on_next(v);
    }
    let late = Recorder::new();
    replayed.subscribe(late.clone());
    input.on_next(4);
    assert_eq!(late.values(), vec![2, 3, 4]);
  }

  #[rxcore_macro::test]
  fn replay_all_keeps_everything() {
    let (_, input, source) = counted_source();
    let replayed = source.replay_all();
    let _connection = replayed.connect();
    for v in 0..100 {
      input.on_next(v);
    }
    let late = Recorder::new();
    replayed.subscribe(late.clone());
    assert_eq!(late.values(), (0..100).collect::<Vec<_>>());

    // a completed connection hands the next one a fresh subject
    input.on_completed();
    assert_eq!(late.terminal_count(), 1);
    let after = Recorder::<i32>::new();
    replayed.subscribe(after.clone());
    assert!(after.events().is_empty());
  }

  #[rxcore_macro::test]
  fn fixed_subject_is_reused_after_termination() {
    let subject = PublishSubject::new();
    let multicast = Observable::from_iter(vec![1]).multicast(subject.clone());
    multicast.connect();
    let late = Recorder::new();
    multicast.subscribe(late.clone());
    assert_eq!(late.events(), vec![Event::Completed]);
    assert!(!subject.has_observers());
  }

  #[rxcore_macro::test]
  fn factory_subject_is_fresh_per_connection() {
    let (subscriptions, input, source) = counted_source();
    let published = source.publish();
    let first = Recorder::new();
    published.subscribe(first.clone());
    published.connect().dispose();

    let second = Recorder::new();
    published.subscribe(second.clone());
    published.connect();
    input.on_next(5);
    assert_eq!(subscriptions.load(Ordering::SeqCst), 2);
    assert!(first.events().is_empty());
    assert_eq!(second.values(), vec![5]);
  }
}
