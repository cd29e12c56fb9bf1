use std::{sync::Arc, time::Duration};

use tokio::{runtime::Handle, task::JoinHandle, time};

use super::{Action, ImmediateScheduler, PeriodicAction, Scheduler, MIN_PERIOD};
use crate::{
  disposable::{BoxedDisposable, Disposable, Disposables, SingleAssignmentDisposable},
  error::RxError,
};

/// Runs work as tasks on a tokio runtime.
///
/// Relative and periodic work is driven by `tokio::time`; disposing aborts
/// the task, which drops the timer with it.
#[derive(Clone, Debug)]
pub struct TokioScheduler {
  handle: Handle,
}

impl TokioScheduler {
  /// Uses the runtime the caller is running on.
  pub fn current() -> Result<Self, RxError> {
    let handle = Handle::try_current()
      .map_err(|err| RxError::Scheduler { scheduler: "tokio", reason: err.to_string() })?;
    Ok(TokioScheduler { handle })
  }

  pub fn from_handle(handle: Handle) -> Self { TokioScheduler { handle } }

  fn spawn_action(&self, action: Action, delay: Option<Duration>) -> BoxedDisposable {
    let result = Arc::new(SingleAssignmentDisposable::new());
    let c_result = result.clone();
    let task = self.handle.spawn(async move {
      if let Some(delay) = delay {
        time::sleep(delay).await;
      }
      if !c_result.is_disposed() {
        c_result.set(action());
      }
    });
    Disposables::composite([abort_on_dispose(task), Box::new(result) as BoxedDisposable])
  }
}

fn abort_on_dispose(task: JoinHandle<()>) -> BoxedDisposable {
  Disposables::create(move || task.abort())
}

impl ImmediateScheduler for TokioScheduler {
  fn schedule_action(&self, action: Action) -> BoxedDisposable { self.spawn_action(action, None) }
}

impl Scheduler for TokioScheduler {
  fn schedule_relative_action(&self, due: Duration, action: Action) -> BoxedDisposable {
    self.spawn_action(action, Some(due))
  }

  fn schedule_periodic_action(
    &self, start_after: Duration, period: Duration, mut action: PeriodicAction,
  ) -> BoxedDisposable {
    let period = period.max(MIN_PERIOD);
    let task = self.handle.spawn(async move {
      let mut ticks = time::interval_at(time::Instant::now() + start_after, period);
      loop {
        ticks.tick().await;
        action();
      }
    });
    abort_on_dispose(task)
  }
}
