use std::{sync::Arc, time::Duration};

use crate::{
  disposable::Disposables,
  observable::Observable,
  observer::Observer,
  scheduler::{Scheduler, SchedulerExt},
};

impl Observable<usize> {
  /// Emits `0` once `due` has elapsed on `scheduler`, then completes.
  pub fn timer<S>(due: Duration, scheduler: Arc<S>) -> Self
  where
    S: Scheduler + ?Sized + 'static,
  {
    Observable::create(move |observer| {
      scheduler.schedule_relative(observer, due, |observer| {
        observer.on_next(0);
        observer.on_completed();
        Disposables::nop()
      })
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{
    disposable::Disposable, event::Event, scheduler::VirtualTimeScheduler, test_util::Recorder,
  };

  #[rxcore_macro::test]
  fn fires_once_at_due_time() {
    let scheduler = Arc::new(VirtualTimeScheduler::new());
    let recorder = Recorder::new();
    Observable::timer(Duration::from_secs(2), scheduler.clone()).subscribe(recorder.clone());

    scheduler.advance_by(Duration::from_millis(1999));
    assert!(recorder.events().is_empty());
    scheduler.advance_by(Duration::from_millis(1));
    assert_eq!(recorder.events(), vec![Event::Next(0), Event::Completed]);
  }

  #[rxcore_macro::test]
  fn disposed_timer_never_fires() {
    let scheduler = Arc::new(VirtualTimeScheduler::new());
    let recorder = Recorder::<usize>::new();
    let timer = Observable::timer(Duration::from_secs(1), scheduler.clone());
    let d = timer.subscribe(recorder.clone());
    d.dispose();
    scheduler.start();
    assert!(recorder.events().is_empty());
  }
}
