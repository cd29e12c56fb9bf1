use std::{sync::Arc, time::Duration};

use crate::{
  observable::Observable,
  observer::Observer,
  scheduler::{Scheduler, SchedulerExt},
};

impl Observable<usize> {
  /// Emits `0, 1, 2, ...`, one value every `period` on `scheduler`, starting
  /// one period after subscription. Never completes.
  pub fn interval<S>(period: Duration, scheduler: Arc<S>) -> Self
  where
    S: Scheduler + ?Sized + 'static,
  {
    Observable::create(move |observer| {
      scheduler.schedule_periodic(0, period, period, move |tick| {
        observer.on_next(tick);
        tick + 1
      })
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{disposable::Disposable, scheduler::VirtualTimeScheduler, test_util::Recorder};

  #[rxcore_macro::test]
  fn ticks_until_disposed() {
    let scheduler = Arc::new(VirtualTimeScheduler::new());
    let recorder = Recorder::new();
    let d = Observable::interval(Duration::from_millis(10), scheduler.clone())
      .subscribe(recorder.clone());

    scheduler.advance_by(Duration::from_millis(9));
    assert!(recorder.values().is_empty());
    scheduler.advance_by(Duration::from_millis(31));
    assert_eq!(recorder.values(), vec![0, 1, 2, 3]);

    d.dispose();
    assert_eq!(scheduler.pending_count(), 0);
    scheduler.advance_by(Duration::from_secs(1));
    assert_eq!(recorder.values().len(), 4);
    assert_eq!(recorder.terminal_count(), 0);
  }
}
