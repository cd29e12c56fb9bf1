use std::{cell::RefCell, collections::VecDeque, sync::Arc};

use super::{timer_queue::ScheduledToken, Action, ImmediateScheduler};
use crate::disposable::{BoxedDisposable, Disposable, SingleAssignmentDisposable};

thread_local! {
  static TRAMPOLINE: RefCell<Option<VecDeque<(Action, ScheduledToken)>>> =
    const { RefCell::new(None) };
}

/// Runs work on the calling thread.
///
/// The first action scheduled on a thread runs inline; everything scheduled
/// while it runs is queued and drained, in order, before the outermost
/// `schedule_action` returns. Recursion through this scheduler therefore
/// never grows the stack.
#[derive(Clone, Copy, Debug, Default)]
pub struct CurrentThreadScheduler;

impl CurrentThreadScheduler {
  /// `true` when no action is running on this thread, i.e. scheduling now
  /// would run inline instead of queueing.
  pub fn is_schedule_required() -> bool { TRAMPOLINE.with(|t| t.borrow().is_none()) }
}

/// Resets the trampoline even if an action panics.
struct Running;

impl Drop for Running {
  fn drop(&mut self) { TRAMPOLINE.with(|t| t.borrow_mut().take()); }
}

impl ImmediateScheduler for CurrentThreadScheduler {
  fn schedule_action(&self, action: Action) -> BoxedDisposable {
    let queued = TRAMPOLINE.with(|t| match t.borrow_mut().as_mut() {
      Some(queue) => {
        let token: ScheduledToken = Arc::new(SingleAssignmentDisposable::new());
        queue.push_back((action, token.clone()));
        Err(token)
      }
      None => Ok(action),
    });
    let action = match queued {
      Ok(action) => action,
      Err(token) => return Box::new(token),
    };

    TRAMPOLINE.with(|t| *t.borrow_mut() = Some(VecDeque::new()));
    let _running = Running;
    let disposable = action();
    while let Some((action, token)) =
      TRAMPOLINE.with(|t| t.borrow_mut().as_mut().and_then(VecDeque::pop_front))
    {
      if !token.is_disposed() {
        token.set(action());
      }
    }
    disposable
  }
}
