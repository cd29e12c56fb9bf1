use std::{
  sync::Arc,
  thread::{self, ThreadId},
  time::{Duration, Instant},
};

use once_cell::sync::OnceCell;
use parking_lot::{Condvar, Mutex, MutexGuard};
use tracing::{debug, error};

use super::{timer_queue::TimerQueue, Action, ImmediateScheduler, PeriodicAction, Scheduler};
use crate::{disposable::BoxedDisposable, error::RxError};

/// Settings of a [`SerialQueueScheduler`] worker.
#[derive(Clone, Debug)]
pub struct QueueConfiguration {
  /// Name given to the worker thread.
  pub name: String,
  /// Work due within `leeway` of now runs in the current pass instead of
  /// waiting for its exact due time.
  pub leeway: Duration,
}

impl Default for QueueConfiguration {
  fn default() -> Self {
    QueueConfiguration { name: "rxcore.serial".to_owned(), leeway: Duration::ZERO }
  }
}

impl QueueConfiguration {
  pub fn with_name(mut self, name: impl Into<String>) -> Self {
    self.name = name.into();
    self
  }

  pub fn with_leeway(mut self, leeway: Duration) -> Self {
    self.leeway = leeway;
    self
  }
}

struct QueueState {
  timers: TimerQueue<Instant>,
  shutdown: bool,
}

struct Shared {
  name: String,
  leeway: Duration,
  state: Mutex<QueueState>,
  wakeup: Condvar,
  worker: OnceCell<ThreadId>,
}

impl Shared {
  fn enqueue(
    &self, push: impl FnOnce(&mut TimerQueue<Instant>) -> BoxedDisposable,
  ) -> BoxedDisposable {
    let disposable = push(&mut self.state.lock().timers);
    self.wakeup.notify_one();
    disposable
  }
}

/// Stops the worker when the last handle goes away. Scheduler clones and
/// queued work each hold one.
struct Handle(Arc<Shared>);

impl Drop for Handle {
  fn drop(&mut self) {
    self.0.state.lock().shutdown = true;
    self.0.wakeup.notify_one();
  }
}

/// Runs all work, one item at a time, on a dedicated worker thread.
///
/// Items run in due-time order; items due at the same time run in the order
/// they were scheduled. The worker exits once every clone of the scheduler
/// is dropped and no queued work is left; disposing queued work releases its
/// hold on the worker.
#[derive(Clone)]
pub struct SerialQueueScheduler {
  handle: Arc<Handle>,
}

impl SerialQueueScheduler {
  /// Spawns the worker thread.
  pub fn new(config: QueueConfiguration) -> Result<Self, RxError> {
    let shared = Arc::new(Shared {
      name: config.name,
      leeway: config.leeway,
      state: Mutex::new(QueueState { timers: TimerQueue::new(), shutdown: false }),
      wakeup: Condvar::new(),
      worker: OnceCell::new(),
    });
    let worker = shared.clone();
    thread::Builder::new().name(shared.name.clone()).spawn(move || run(worker)).map_err(|err| {
      error!(queue = %shared.name, error = %err, "failed to spawn serial queue worker");
      RxError::Scheduler { scheduler: "serial queue", reason: err.to_string() }
    })?;
    Ok(SerialQueueScheduler { handle: Arc::new(Handle(shared)) })
  }

  /// `true` when called from this scheduler's worker thread.
  pub fn is_on_queue(&self) -> bool {
    self.shared().worker.get().is_some_and(|id| *id == thread::current().id())
  }

  pub fn name(&self) -> &str { &self.shared().name }

  fn shared(&self) -> &Shared { &self.handle.0 }
}

fn run(shared: Arc<Shared>) {
  let _ = shared.worker.set(thread::current().id());
  debug!(queue = %shared.name, "serial queue started");
  let mut state = shared.state.lock();
  while !state.shutdown {
    let horizon = Instant::now() + shared.leeway;
    if let Some(entry) = state.timers.pop_due(horizon) {
      let rearmed = MutexGuard::unlocked(&mut state, || entry.run());
      if let Some(entry) = rearmed {
        state.timers.requeue(entry);
      }
      continue;
    }
    match state.timers.next_due() {
      Some(due) => {
        shared.wakeup.wait_until(&mut state, due);
      }
      None => shared.wakeup.wait(&mut state),
    }
  }
  let leftovers = state.timers.take_all();
  drop(state);
  drop(leftovers);
  debug!(queue = %shared.name, "serial queue stopped");
}

impl SerialQueueScheduler {
  /// Ties the worker's lifetime to `action`: the worker keeps running while
  /// queued work holds a handle, even after every scheduler clone is gone.
  fn retain(&self, action: Action) -> Action {
    let handle = self.handle.clone();
    Box::new(move || {
      let _handle = handle;
      action()
    })
  }
}

impl ImmediateScheduler for SerialQueueScheduler {
  fn schedule_action(&self, action: Action) -> BoxedDisposable {
    let action = self.retain(action);
    self.shared().enqueue(|timers| timers.push_once(Instant::now(), action))
  }
}

impl Scheduler for SerialQueueScheduler {
  fn schedule_relative_action(&self, due: Duration, action: Action) -> BoxedDisposable {
    let action = self.retain(action);
    self.shared().enqueue(|timers| timers.push_once(Instant::now() + due, action))
  }

  fn schedule_periodic_action(
    &self, start_after: Duration, period: Duration, mut action: PeriodicAction,
  ) -> BoxedDisposable {
    let handle = self.handle.clone();
    let action: PeriodicAction = Box::new(move || {
      let _handle: &Arc<Handle> = &handle;
      action()
    });
    self
      .shared()
      .enqueue(|timers| timers.push_periodic(Instant::now() + start_after, period, action))
  }
}

#[cfg(test)]
mod tests {
  use std::sync::mpsc;

  use super::*;
  use crate::{
    disposable::{Disposable, Disposables},
    scheduler::{ImmediateSchedulerExt, SchedulerExt},
  };

  #[rxcore_macro::test]
  fn runs_in_order_on_its_own_thread() {
    let config = QueueConfiguration::default().with_name("test.queue");
    let queue = SerialQueueScheduler::new(config).unwrap();
    let (tx, rx) = mpsc::channel();
    for i in 0..5 {
      let tx = tx.clone();
      let c_queue = queue.clone();
      queue.schedule(i, move |i| {
        tx.send((i, c_queue.is_on_queue(), thread::current().name().map(str::to_owned))).unwrap();
        Disposables::nop()
      });
    }
    let got: Vec<_> = rx.iter().take(5).collect();
    assert_eq!(got.iter().map(|(i, ..)| *i).collect::<Vec<_>>(), vec![0, 1, 2, 3, 4]);
    assert!(got
      .iter()
      .all(|(_, on_queue, name)| *on_queue && name.as_deref() == Some("test.queue")));
    assert!(!queue.is_on_queue());
  }

  #[rxcore_macro::test]
  fn relative_work_waits_and_can_be_cancelled() {
    let queue = SerialQueueScheduler::new(QueueConfiguration::default()).unwrap();
    let (tx, rx) = mpsc::channel();
    let c_tx = tx.clone();
    let start = Instant::now();
    let cancelled = queue.schedule_relative("cancelled", Duration::from_millis(20), move |tag| {
      c_tx.send(tag).unwrap();
      Disposables::nop()
    });
    queue.schedule_relative("kept", Duration::from_millis(40), move |tag| {
      tx.send(tag).unwrap();
      Disposables::nop()
    });
    cancelled.dispose();

    assert_eq!(rx.recv().unwrap(), "kept");
    assert!(start.elapsed() >= Duration::from_millis(40));
  }

  #[rxcore_macro::test]
  fn periodic_until_disposed() {
    let queue = SerialQueueScheduler::new(QueueConfiguration::default()).unwrap();
    let (tx, rx) = mpsc::channel();
    let d = queue.schedule_periodic(0, Duration::ZERO, Duration::from_millis(5), move |n| {
      let _ = tx.send(n);
      n + 1
    });
    let got: Vec<_> = rx.iter().take(3).collect();
    d.dispose();
    assert_eq!(got, vec![0, 1, 2]);
  }

  #[rxcore_macro::test]
  fn queued_work_outlives_the_scheduler() {
    let (tx, rx) = mpsc::channel();
    {
      let queue = SerialQueueScheduler::new(QueueConfiguration::default()).unwrap();
      queue.schedule_relative((), Duration::from_millis(10), move |_| {
        tx.send(thread::current().name().map(str::to_owned)).unwrap();
        Disposables::nop()
      });
    }
    let ran_on = rx.recv_timeout(Duration::from_secs(5)).unwrap();
    assert_eq!(ran_on.as_deref(), Some("rxcore.serial"));
  }

  #[rxcore_macro::test]
  fn worker_stops_once_cancelled_work_lets_go() {
    let queue = SerialQueueScheduler::new(QueueConfiguration::default()).unwrap();
    let shared = Arc::downgrade(&queue.handle);
    let d = queue.schedule_relative((), Duration::from_secs(3600), |_| Disposables::nop());
    drop(queue);
    assert!(shared.upgrade().is_some());
    d.dispose();
    assert!(shared.upgrade().is_none());
  }
}
