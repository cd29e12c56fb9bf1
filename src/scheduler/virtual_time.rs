use std::{
  sync::Arc,
  time::{Duration, Instant},
};

use parking_lot::Mutex;

use super::{timer_queue::TimerQueue, Action, ImmediateScheduler, PeriodicAction, Scheduler};
use crate::disposable::BoxedDisposable;

struct VirtualState {
  clock: Duration,
  timers: TimerQueue<Duration>,
}

/// A scheduler whose clock only moves when told to.
///
/// Work is queued against a virtual clock that starts at zero. Nothing runs
/// until [`advance_by`](Self::advance_by), [`advance_to`](Self::advance_to)
/// or [`start`](Self::start) is called, which makes time-based operators
/// testable without sleeping. Everything runs on the thread that advances
/// the clock.
#[derive(Clone)]
pub struct VirtualTimeScheduler {
  epoch: Instant,
  state: Arc<Mutex<VirtualState>>,
}

impl Default for VirtualTimeScheduler {
  fn default() -> Self { Self::new() }
}

impl VirtualTimeScheduler {
  pub fn new() -> Self {
    let state = VirtualState { clock: Duration::ZERO, timers: TimerQueue::new() };
    VirtualTimeScheduler { epoch: Instant::now(), state: Arc::new(Mutex::new(state)) }
  }

  /// Virtual time elapsed since creation.
  pub fn clock(&self) -> Duration { self.state.lock().clock }

  /// Runs everything due within the next `delta`, then moves the clock
  /// forward by `delta`.
  pub fn advance_by(&self, delta: Duration) {
    let target = self.clock() + delta;
    self.advance_to(target);
  }

  /// Runs everything due at or before `target`, in due order, then sets the
  /// clock to `target`. The clock never moves backwards.
  pub fn advance_to(&self, target: Duration) {
    loop {
      let entry = {
        let mut state = self.state.lock();
        match state.timers.pop_due(target) {
          Some(entry) => {
            state.clock = state.clock.max(entry.due);
            entry
          }
          None => {
            state.clock = state.clock.max(target);
            return;
          }
        }
      };
      if let Some(rearmed) = entry.run() {
        self.state.lock().timers.requeue(rearmed);
      }
    }
  }

  /// Runs until no work is left. Live periodic work keeps it running
  /// forever.
  pub fn start(&self) {
    while let Some(due) = self.next_due() {
      self.advance_to(due);
    }
  }

  /// Number of scheduled items that were not cancelled.
  pub fn pending_count(&self) -> usize { self.state.lock().timers.live_len() }

  fn next_due(&self) -> Option<Duration> { self.state.lock().timers.next_due() }

  fn enqueue(
    &self, due_in: Duration,
    push: impl FnOnce(&mut TimerQueue<Duration>, Duration) -> BoxedDisposable,
  ) -> BoxedDisposable {
    let mut state = self.state.lock();
    let due = state.clock + due_in;
    push(&mut state.timers, due)
  }
}

impl ImmediateScheduler for VirtualTimeScheduler {
  fn schedule_action(&self, action: Action) -> BoxedDisposable {
    self.enqueue(Duration::ZERO, |timers, due| timers.push_once(due, action))
  }
}

impl Scheduler for VirtualTimeScheduler {
  fn now(&self) -> Instant { self.epoch + self.clock() }

  fn schedule_relative_action(&self, due: Duration, action: Action) -> BoxedDisposable {
    self.enqueue(due, |timers, due| timers.push_once(due, action))
  }

  fn schedule_periodic_action(
    &self, start_after: Duration, period: Duration, action: PeriodicAction,
  ) -> BoxedDisposable {
    self.enqueue(start_after, |timers, due| timers.push_periodic(due, period, action))
  }
}
