//! Shared machinery behind every subject flavor.
//!
//! A [`SubjectCore`] owns the observer registry, the terminal event and the
//! replay buffer. The three public subjects differ only in their
//! [`Retention`] policy.
//!
//! No subject lock is held while observers run. The state lock covers the
//! bookkeeping and the snapshot of targets; fan-out and subscribe-time
//! replay happen after it is released. A subscriber that has history to
//! replay is registered behind a [`CatchUp`], which holds live events back
//! until the replay has been delivered.

use std::{collections::VecDeque, sync::Arc};

use parking_lot::Mutex;
use smallvec::SmallVec;
use tracing::trace;

use super::subject_subscription::SubjectSubscription;
use crate::{
  disposable::{Bag, BagKey, BoxedDisposable, Disposables},
  error::RxError,
  event::Event,
  observer::{AnyObserver, Observer},
};

/// What a subject keeps of the `Next` values it has seen.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Retention {
  /// Nothing; late subscribers only see future events.
  Publish,
  /// The last `limit` values (all of them when `None`), replayed on
  /// subscribe, before and after termination.
  Replay { limit: Option<usize> },
  /// Exactly the latest value, replayed on subscribe while running.
  Behavior,
}

pub(crate) struct State<T> {
  pub(crate) observers: Bag<AnyObserver<T>>,
  stopped: Option<Event<T>>,
  disposed: bool,
  buffer: VecDeque<T>,
}

pub(crate) struct SubjectCore<T> {
  retention: Retention,
  pub(crate) state: Mutex<State<T>>,
}

type Targets<T> = SmallVec<[AnyObserver<T>; 4]>;

impl<T: Clone + Send + Sync + 'static> SubjectCore<T> {
  pub(crate) fn new(retention: Retention) -> Arc<Self> {
    Arc::new(SubjectCore {
      retention,
      state: Mutex::new(State {
        observers: Bag::new(),
        stopped: None,
        disposed: false,
        buffer: VecDeque::new(),
      }),
    })
  }

  pub(crate) fn with_value(retention: Retention, value: T) -> Arc<Self> {
    let core = Self::new(retention);
    core.state.lock().buffer.push_back(value);
    core
  }

  pub(crate) fn on(&self, event: Event<T>) {
    let targets: Targets<T> = {
      let mut state = self.state.lock();
      if state.disposed || state.stopped.is_some() {
        trace!(terminal = event.is_terminal(), "subject already stopped, event dropped");
        return;
      }
      match &event {
        Event::Next(value) => {
          self.retain(&mut state.buffer, value);
          state.observers.iter().cloned().collect()
        }
        _ => {
          state.stopped = Some(event.clone());
          state.observers.drain().collect()
        }
      }
    };
    dispatch(targets, event);
  }

  fn retain(&self, buffer: &mut VecDeque<T>, value: &T) {
    match self.retention {
      Retention::Publish => {}
      Retention::Replay { limit } => {
        buffer.push_back(value.clone());
        if let Some(limit) = limit {
          while buffer.len() > limit {
            buffer.pop_front();
          }
        }
      }
      Retention::Behavior => {
        buffer.clear();
        buffer.push_back(value.clone());
      }
    }
  }

  /// Registers `observer` and replays what the retention policy kept.
  ///
  /// Registration and the replay snapshot happen in one critical section,
  /// so every value reaches the new observer exactly once and in order.
  pub(crate) fn subscribe(self: &Arc<Self>, observer: AnyObserver<T>) -> BoxedDisposable {
    let plan = {
      let mut state = self.state.lock();
      if state.disposed {
        Plan::Finished(Vec::new(), Event::Error(RxError::Disposed { object: "subject" }))
      } else if let Some(terminal) = &state.stopped {
        let replay = match self.retention {
          Retention::Replay { .. } => state.buffer.iter().cloned().collect(),
          _ => Vec::new(),
        };
        Plan::Finished(replay, terminal.clone())
      } else {
        let replay: Vec<T> = match self.retention {
          Retention::Publish => Vec::new(),
          _ => state.buffer.iter().cloned().collect(),
        };
        if replay.is_empty() {
          Plan::Live(state.observers.insert(observer.clone()), None)
        } else {
          let catch_up = Arc::new(CatchUp::new(observer.clone()));
          Plan::Live(state.observers.insert(catch_up.clone()), Some((catch_up, replay)))
        }
      }
    };

    match plan {
      Plan::Finished(replay, terminal) => {
        for value in replay {
          observer.on(Event::Next(value));
        }
        observer.on(terminal);
        Disposables::nop()
      }
      Plan::Live(key, catch_up) => {
        let subscription = Box::new(SubjectSubscription::new(Arc::downgrade(self), key));
        if let Some((catch_up, replay)) = catch_up {
          catch_up.replay(replay);
        }
        subscription
      }
    }
  }

  pub(crate) fn value(&self) -> Result<T, RxError> {
    let state = self.state.lock();
    if state.disposed {
      return Err(RxError::Disposed { object: "behavior subject" });
    }
    if let Some(Event::Error(err)) = &state.stopped {
      return Err(err.clone());
    }
    state.buffer.back().cloned().ok_or(RxError::Disposed { object: "behavior subject" })
  }
}

impl<T> SubjectCore<T> {
  pub(crate) fn has_observers(&self) -> bool { !self.state.lock().observers.is_empty() }

  pub(crate) fn is_disposed(&self) -> bool { self.state.lock().disposed }

  pub(crate) fn dispose(&self) {
    let (observers, buffer) = {
      let mut state = self.state.lock();
      if state.disposed {
        return;
      }
      state.disposed = true;
      state.stopped = None;
      let observers: Vec<_> = state.observers.drain().collect();
      (observers, std::mem::take(&mut state.buffer))
    };
    trace!(observers = observers.len(), "subject disposed");
    drop((observers, buffer));
  }
}

enum Plan<T> {
  /// The subject is over: replay, then the terminal, no registration.
  Finished(Vec<T>, Event<T>),
  Live(BagKey, Option<(Arc<CatchUp<T>>, Vec<T>)>),
}

/// Wraps a subscriber while its replay is in flight. Live events that race
/// the replay are queued and delivered after it, in arrival order.
struct CatchUp<T> {
  observer: AnyObserver<T>,
  /// `Some` while replaying.
  backlog: Mutex<Option<VecDeque<Event<T>>>>,
}

impl<T> CatchUp<T> {
  fn new(observer: AnyObserver<T>) -> Self {
    CatchUp { observer, backlog: Mutex::new(Some(VecDeque::new())) }
  }

  fn replay(&self, values: Vec<T>) {
    for value in values {
      self.observer.on(Event::Next(value));
    }
    loop {
      let event = {
        let mut backlog = self.backlog.lock();
        match backlog.as_mut().and_then(VecDeque::pop_front) {
          Some(event) => event,
          None => {
            *backlog = None;
            return;
          }
        }
      };
      self.observer.on(event);
    }
  }
}

impl<T: Send> Observer<T> for CatchUp<T> {
  fn on(&self, event: Event<T>) {
    {
      let mut backlog = self.backlog.lock();
      if let Some(queue) = backlog.as_mut() {
        queue.push_back(event);
        return;
      }
    }
    self.observer.on(event);
  }
}

fn dispatch<T: Clone>(targets: Targets<T>, event: Event<T>) {
  if let Some((last, rest)) = targets.split_last() {
    for observer in rest {
      observer.on(event.clone());
    }
    last.on(event);
  }
}

#[cfg(test)]
mod tests {
  use std::{
    sync::{
      atomic::{AtomicUsize, Ordering},
      Barrier,
    },
    thread,
  };

  use super::*;
  use crate::{
    observable::Producer,
    subject::{PublishSubject, ReplaySubject, Subject},
  };

  /// Forwards every value below 3, incremented, into `target`. The first
  /// value waits at the barrier so both threads are inside a fan-out at once.
  struct Relay {
    target: PublishSubject<u32>,
    barrier: Arc<Barrier>,
    seen: AtomicUsize,
  }

  impl Observer<u32> for Relay {
    fn on(&self, event: Event<u32>) {
      if let Event::Next(v) = event {
        self.seen.fetch_add(1, Ordering::SeqCst);
        if v == 0 {
          self.barrier.wait();
        }
        if v < 3 {
          self.target.on_next(v + 1);
        }
      }
    }
  }

  #[rxcore_macro::test]
  fn subjects_relaying_into_each_other_from_two_threads() {
    let a = PublishSubject::new();
    let b = PublishSubject::new();
    let barrier = Arc::new(Barrier::new(2));
    let a_to_b =
      Arc::new(Relay { target: b.clone(), barrier: barrier.clone(), seen: AtomicUsize::new(0) });
    let b_to_a = Arc::new(Relay { target: a.clone(), barrier, seen: AtomicUsize::new(0) });
    let sa = a.subscribe(a_to_b.clone());
    let sb = b.subscribe(b_to_a.clone());

    thread::scope(|scope| {
      scope.spawn(|| a.on_next(0));
      scope.spawn(|| b.on_next(0));
    });

    // Each chain visits both relays twice: 0..=3 alternating.
    assert_eq!(a_to_b.seen.load(Ordering::SeqCst), 4);
    assert_eq!(b_to_a.seen.load(Ordering::SeqCst), 4);
    sa.dispose();
    sb.dispose();
  }

  struct PushDuringReplay {
    subject: ReplaySubject<i32>,
    seen: Mutex<Vec<i32>>,
  }

  impl Observer<i32> for PushDuringReplay {
    fn on(&self, event: Event<i32>) {
      if let Event::Next(v) = event {
        self.seen.lock().push(v);
        if v == 1 {
          self.subject.on_next(10);
        }
      }
    }
  }

  #[rxcore_macro::test]
  fn live_values_wait_for_replay() {
    let subject = ReplaySubject::new(3);
    subject.on_next(1);
    subject.on_next(2);
    let observer =
      Arc::new(PushDuringReplay { subject: subject.clone(), seen: Mutex::new(Vec::new()) });
    let _subscription = subject.subscribe(observer.clone());
    assert_eq!(*observer.seen.lock(), vec![1, 2, 10]);

    subject.on_next(4);
    assert_eq!(*observer.seen.lock(), vec![1, 2, 10, 4]);
  }

  #[rxcore_macro::test]
  fn catch_up_unwraps_after_replay() {
    let subject = ReplaySubject::new(1);
    subject.on_next(1);
    let recorder = crate::test_util::Recorder::new();
    let _subscription = subject.subscribe(recorder.clone());
    subject.on_next(2);
    subject.on_completed();
    assert_eq!(recorder.events(), vec![Event::Next(1), Event::Next(2), Event::Completed]);
    assert!(!subject.has_observers());
  }
}
