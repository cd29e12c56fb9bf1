use std::{sync::Arc, time::Duration};

use parking_lot::Mutex;

use super::{Action, ImmediateScheduler, Scheduler};
use crate::disposable::{BagKey, BoxedDisposable, CompositeDisposable, Disposable, Disposables};

type RecursiveAction<St, Sch> = Arc<dyn Fn(St, &RecursiveScheduler<St, Sch>) + Send + Sync>;

struct Inner<St, Sch: ?Sized> {
  action: Mutex<Option<RecursiveAction<St, Sch>>>,
  group: CompositeDisposable,
  scheduler: Arc<Sch>,
}

/// Progress of one scheduled invocation, shared between the scheduling call
/// and the invocation itself, which may run first.
enum Slot {
  Pending,
  Added(BagKey),
  Done,
}

/// Lets an action schedule its own next invocation.
///
/// Outstanding invocations are tracked in a composite disposable; disposing
/// the recursive scheduler drops the action and cancels all of them.
pub struct RecursiveScheduler<St, Sch: ?Sized> {
  inner: Arc<Inner<St, Sch>>,
}

impl<St, Sch: ?Sized> Clone for RecursiveScheduler<St, Sch> {
  fn clone(&self) -> Self { RecursiveScheduler { inner: self.inner.clone() } }
}

impl<St, Sch> RecursiveScheduler<St, Sch>
where
  St: Send + 'static,
  Sch: ImmediateScheduler + ?Sized + 'static,
{
  pub fn new<F>(scheduler: Arc<Sch>, action: F) -> Self
  where
    F: Fn(St, &RecursiveScheduler<St, Sch>) + Send + Sync + 'static,
  {
    let action: RecursiveAction<St, Sch> = Arc::new(action);
    RecursiveScheduler {
      inner: Arc::new(Inner {
        action: Mutex::new(Some(action)),
        group: CompositeDisposable::new(),
        scheduler,
      }),
    }
  }

  /// Schedules the next invocation as soon as possible.
  pub fn schedule(&self, state: St) {
    self.schedule_with(state, |scheduler, action| scheduler.schedule_action(action))
  }

  fn schedule_with(&self, state: St, submit: impl FnOnce(&Sch, Action) -> BoxedDisposable) {
    let slot = Arc::new(Mutex::new(Slot::Pending));
    let (this, c_slot) = (self.clone(), slot.clone());
    let scheduled = submit(
      &self.inner.scheduler,
      Box::new(move || {
        if this.inner.group.is_disposed() {
          return Disposables::nop();
        }
        let previous = std::mem::replace(&mut *c_slot.lock(), Slot::Done);
        if let Slot::Added(key) = previous {
          this.inner.group.remove(key);
        }
        let action = this.inner.action.lock().clone();
        if let Some(action) = action {
          action(state, &this);
        }
        Disposables::nop()
      }),
    );

    let mut slot = slot.lock();
    if let Slot::Pending = *slot {
      if let Some(key) = self.inner.group.insert(scheduled) {
        *slot = Slot::Added(key);
      }
    }
  }
}

impl<St, Sch> RecursiveScheduler<St, Sch>
where
  St: Send + 'static,
  Sch: Scheduler + ?Sized + 'static,
{
  /// Schedules the next invocation after `due`.
  pub fn schedule_after(&self, state: St, due: Duration) {
    self.schedule_with(state, |scheduler, action| scheduler.schedule_relative_action(due, action))
  }
}

impl<St, Sch: ?Sized> Disposable for RecursiveScheduler<St, Sch>
where
  St: 'static,
  Sch: Send + Sync + 'static,
{
  fn dispose(&self) {
    let action = self.inner.action.lock().take();
    drop(action);
    self.inner.group.dispose();
  }

  fn is_disposed(&self) -> bool { self.inner.group.is_disposed() }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::scheduler::VirtualTimeScheduler;

  #[rxcore_macro::test]
  fn reschedules_after_delay_until_disposed() {
    let scheduler = Arc::new(VirtualTimeScheduler::new());
    let ticks = Arc::new(Mutex::new(vec![]));
    let (c_ticks, clock) = (ticks.clone(), scheduler.clone());
    let recursive = RecursiveScheduler::new(scheduler.clone(), move |n: u32, recurse| {
      c_ticks.lock().push((n, clock.clock()));
      recurse.schedule_after(n + 1, Duration::from_millis(10));
    });
    recursive.schedule(0);

    scheduler.advance_by(Duration::from_millis(25));
    let ms = Duration::from_millis;
    assert_eq!(*ticks.lock(), vec![(0, ms(0)), (1, ms(10)), (2, ms(20))]);
    assert_eq!(scheduler.pending_count(), 1);

    recursive.dispose();
    assert_eq!(scheduler.pending_count(), 0);
    scheduler.advance_by(Duration::from_secs(1));
    assert_eq!(ticks.lock().len(), 3);
  }
}
