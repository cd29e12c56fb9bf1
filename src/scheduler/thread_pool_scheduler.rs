use std::sync::Arc;

use futures::{executor::ThreadPool, future};

use super::{Action, ImmediateScheduler};
use crate::{
  disposable::{BoxedDisposable, Disposable, SingleAssignmentDisposable},
  error::RxError,
};

/// Runs work concurrently on a `futures` thread pool.
///
/// Only immediate scheduling is offered: the pool has no timers. Items may
/// run in parallel and in any order.
#[derive(Clone)]
pub struct ThreadPoolScheduler {
  pool: ThreadPool,
}

impl ThreadPoolScheduler {
  pub fn new() -> Result<Self, RxError> {
    let pool = ThreadPool::builder().name_prefix("rxcore.pool-").create().map_err(|err| {
      tracing::error!(error = %err, "failed to create thread pool");
      RxError::Scheduler { scheduler: "thread pool", reason: err.to_string() }
    })?;
    Ok(ThreadPoolScheduler { pool })
  }

  pub fn from_pool(pool: ThreadPool) -> Self { ThreadPoolScheduler { pool } }
}

impl ImmediateScheduler for ThreadPoolScheduler {
  fn schedule_action(&self, action: Action) -> BoxedDisposable {
    let cancel = Arc::new(SingleAssignmentDisposable::new());
    let c_cancel = cancel.clone();
    self.pool.spawn_ok(future::lazy(move |_| {
      if !c_cancel.is_disposed() {
        c_cancel.set(action());
      }
    }));
    Box::new(cancel)
  }
}
