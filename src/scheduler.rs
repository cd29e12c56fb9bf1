//! Schedulers decide where and when a piece of work runs.
//!
//! Two capabilities are modelled as separate traits:
//!
//! * [`ImmediateScheduler`] runs work "as soon as possible": inline, on a
//!   trampoline, on a queue or on a pool.
//! * [`Scheduler`] additionally runs work after a delay and periodically.
//!
//! Both take type-erased boxed actions so they stay object safe; the
//! [`ImmediateSchedulerExt`] and [`SchedulerExt`] extension traits add the
//! uniform `(state, action) -> Disposable` shape on top.
//!
//! Every method returns a [`BoxedDisposable`]. Disposing it before the work
//! starts cancels it; disposing it afterwards disposes whatever the action
//! returned. Timer resources are owned by that disposable alone.

mod current_thread;
pub mod defaults;
mod main_scheduler;
mod recursive;
mod serial_queue;
#[cfg(feature = "futures-scheduler")]
mod thread_pool_scheduler;
mod timer_queue;
#[cfg(feature = "tokio-scheduler")]
mod tokio_scheduler;
mod virtual_time;

use std::{
  sync::Arc,
  time::{Duration, Instant},
};

pub use current_thread::CurrentThreadScheduler;
pub use main_scheduler::MainScheduler;
pub use recursive::RecursiveScheduler;
pub use serial_queue::{QueueConfiguration, SerialQueueScheduler};
#[cfg(feature = "futures-scheduler")]
pub use thread_pool_scheduler::ThreadPoolScheduler;
#[cfg(feature = "tokio-scheduler")]
pub use tokio_scheduler::TokioScheduler;
pub use virtual_time::VirtualTimeScheduler;

use crate::disposable::BoxedDisposable;

/// A unit of scheduled work. The returned disposable is owned by the
/// scheduled item and disposed together with it.
pub type Action = Box<dyn FnOnce() -> BoxedDisposable + Send>;

/// Work invoked once per period until disposed.
pub type PeriodicAction = Box<dyn FnMut() + Send>;

/// Shortest period periodic work runs at; shorter periods are rounded up.
pub const MIN_PERIOD: Duration = Duration::from_millis(1);

/// Runs work as soon as possible.
pub trait ImmediateScheduler: Send + Sync {
  fn schedule_action(&self, action: Action) -> BoxedDisposable;
}

/// Runs work now, later, or periodically.
pub trait Scheduler: ImmediateScheduler {
  /// The scheduler's notion of the current time.
  fn now(&self) -> Instant { Instant::now() }

  /// Runs `action` once `due` has elapsed.
  fn schedule_relative_action(&self, due: Duration, action: Action) -> BoxedDisposable;

  /// Runs `action` after `start_after`, then every `period` (at least
  /// [`MIN_PERIOD`]).
  fn schedule_periodic_action(
    &self, start_after: Duration, period: Duration, action: PeriodicAction,
  ) -> BoxedDisposable;
}

impl<S: ImmediateScheduler + ?Sized> ImmediateScheduler for Arc<S> {
  #[inline]
  fn schedule_action(&self, action: Action) -> BoxedDisposable { (**self).schedule_action(action) }
}

impl<S: Scheduler + ?Sized> Scheduler for Arc<S> {
  #[inline]
  fn now(&self) -> Instant { (**self).now() }

  #[inline]
  fn schedule_relative_action(&self, due: Duration, action: Action) -> BoxedDisposable {
    (**self).schedule_relative_action(due, action)
  }

  #[inline]
  fn schedule_periodic_action(
    &self, start_after: Duration, period: Duration, action: PeriodicAction,
  ) -> BoxedDisposable {
    (**self).schedule_periodic_action(start_after, period, action)
  }
}

// ============================================================================
// State-threading helpers
// ============================================================================

pub trait ImmediateSchedulerExt: ImmediateScheduler {
  /// Runs `action(state)` as soon as possible.
  fn schedule<St, F>(&self, state: St, action: F) -> BoxedDisposable
  where
    St: Send + 'static,
    F: FnOnce(St) -> BoxedDisposable + Send + 'static,
  {
    self.schedule_action(Box::new(move || action(state)))
  }
}

impl<S: ImmediateScheduler + ?Sized> ImmediateSchedulerExt for S {}

pub trait SchedulerExt: Scheduler {
  /// Runs `action(state)` after `due`.
  fn schedule_relative<St, F>(&self, state: St, due: Duration, action: F) -> BoxedDisposable
  where
    St: Send + 'static,
    F: FnOnce(St) -> BoxedDisposable + Send + 'static,
  {
    self.schedule_relative_action(due, Box::new(move || action(state)))
  }

  /// Runs `action(state)` at `at`, or as soon as possible if `at` is past.
  fn schedule_absolute<St, F>(&self, state: St, at: Instant, action: F) -> BoxedDisposable
  where
    St: Send + 'static,
    F: FnOnce(St) -> BoxedDisposable + Send + 'static,
  {
    let due = at.saturating_duration_since(self.now());
    self.schedule_relative(state, due, action)
  }

  /// Runs `action` every `period`, starting after `start_after`. Each
  /// invocation receives the state the previous one returned.
  fn schedule_periodic<St, F>(
    &self, state: St, start_after: Duration, period: Duration, mut action: F,
  ) -> BoxedDisposable
  where
    St: Send + 'static,
    F: FnMut(St) -> St + Send + 'static,
  {
    let mut state = Some(state);
    self.schedule_periodic_action(
      start_after,
      period,
      Box::new(move || {
        if let Some(current) = state.take() {
          state = Some(action(current));
        }
      }),
    )
  }
}

impl<S: Scheduler + ?Sized> SchedulerExt for S {}

/// Runs `action(state, recurse)` on `scheduler`; the action reschedules
/// itself through `recurse`. Disposing the result cancels every pending
/// invocation.
pub fn schedule_recursive<St, Sch, F>(
  scheduler: Arc<Sch>, state: St, action: F,
) -> BoxedDisposable
where
  St: Send + 'static,
  Sch: ImmediateScheduler + ?Sized + 'static,
  F: Fn(St, &RecursiveScheduler<St, Sch>) + Send + Sync + 'static,
{
  let recursive = RecursiveScheduler::new(scheduler, action);
  recursive.schedule(state);
  Box::new(recursive)
}
