use std::{
  sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
  },
  time::Duration,
};

use super::{
  serial_queue::{QueueConfiguration, SerialQueueScheduler},
  Action, ImmediateScheduler, PeriodicAction, Scheduler,
};
use crate::{
  disposable::{BoxedDisposable, Disposable, Disposables, SingleAssignmentDisposable},
  error::RxError,
};

/// A serial queue optimized for delivering results back to "its" thread.
///
/// Work scheduled from the queue's own thread while nothing else is pending
/// runs inline, so `observe_on(main)` costs nothing when the events already
/// arrive on the main thread. Anything else is enqueued, which keeps the
/// order of everything scheduled through it.
#[derive(Clone)]
pub struct MainScheduler {
  queue: SerialQueueScheduler,
  number_enqueued: Arc<AtomicUsize>,
}

impl MainScheduler {
  pub fn new(config: QueueConfiguration) -> Result<Self, RxError> {
    let queue = SerialQueueScheduler::new(config)?;
    Ok(MainScheduler { queue, number_enqueued: Arc::default() })
  }

  /// `true` when called from the scheduler's thread.
  #[inline]
  pub fn is_main_thread(&self) -> bool { self.queue.is_on_queue() }

  /// Fails with [`RxError::NotOnScheduler`] when called from any other
  /// thread than the scheduler's.
  pub fn ensure_executing_on_scheduler(&self) -> Result<(), RxError> {
    if self.is_main_thread() {
      Ok(())
    } else {
      Err(RxError::NotOnScheduler { scheduler: "main" })
    }
  }
}

impl ImmediateScheduler for MainScheduler {
  fn schedule_action(&self, action: Action) -> BoxedDisposable {
    let previous = self.number_enqueued.fetch_add(1, Ordering::AcqRel);
    if previous == 0 && self.is_main_thread() {
      let disposable = action();
      self.number_enqueued.fetch_sub(1, Ordering::AcqRel);
      return disposable;
    }

    let cancel = Arc::new(SingleAssignmentDisposable::new());
    let c_cancel = cancel.clone();
    let counter = self.number_enqueued.clone();
    self.queue.schedule_action(Box::new(move || {
      if !c_cancel.is_disposed() {
        c_cancel.set(action());
      }
      counter.fetch_sub(1, Ordering::AcqRel);
      Disposables::nop()
    }));
    Box::new(cancel)
  }
}

impl Scheduler for MainScheduler {
  fn schedule_relative_action(&self, due: Duration, action: Action) -> BoxedDisposable {
    self.queue.schedule_relative_action(due, action)
  }

  fn schedule_periodic_action(
    &self, start_after: Duration, period: Duration, action: PeriodicAction,
  ) -> BoxedDisposable {
    self.queue.schedule_periodic_action(start_after, period, action)
  }
}

#[cfg(test)]
mod tests {
  use std::sync::mpsc;

  use parking_lot::Mutex;

  use super::*;
  use crate::scheduler::ImmediateSchedulerExt;

  fn main_scheduler() -> MainScheduler {
    MainScheduler::new(QueueConfiguration::default().with_name("test.main")).unwrap()
  }

  #[rxcore_macro::test]
  fn off_thread_work_is_enqueued() {
    let main = main_scheduler();
    assert_eq!(
      main.ensure_executing_on_scheduler(),
      Err(RxError::NotOnScheduler { scheduler: "main" })
    );

    let (tx, rx) = mpsc::channel();
    let c_main = main.clone();
    main.schedule((), move |_| {
      tx.send(c_main.ensure_executing_on_scheduler()).unwrap();
      Disposables::nop()
    });
    assert_eq!(rx.recv().unwrap(), Ok(()));
  }

  #[rxcore_macro::test]
  fn inline_only_when_idle_on_its_thread() {
    let main = main_scheduler();
    let (snapshot_tx, snapshot_rx) = mpsc::channel();
    let (queued_tx, queued_rx) = mpsc::channel();
    let c_main = main.clone();
    // goes through the raw queue, so the main scheduler has nothing pending
    main.queue.schedule((), move |_| {
      let log = Arc::new(Mutex::new(vec![]));
      let (c_log, nested_log) = (log.clone(), log.clone());
      let inner_main = c_main.clone();
      c_main.schedule((), move |_| {
        c_log.lock().push("inline");
        // pending behind the inline item, so this one is enqueued
        inner_main.schedule((), move |_| {
          nested_log.lock().push("queued");
          queued_tx.send(()).unwrap();
          Disposables::nop()
        });
        c_log.lock().push("inline end");
        Disposables::nop()
      });
      snapshot_tx.send((log.lock().clone(), log.clone())).unwrap();
      Disposables::nop()
    });

    let (snapshot, log) = snapshot_rx.recv().unwrap();
    assert_eq!(snapshot, vec!["inline", "inline end"]);
    queued_rx.recv().unwrap();
    assert_eq!(*log.lock(), vec!["inline", "inline end", "queued"]);
  }
}
