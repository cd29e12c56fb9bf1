use std::sync::Arc;

use crate::{
  disposable::BoxedDisposable,
  observable::{Observable, Producer},
  observer::AnyObserver,
  scheduler::ImmediateScheduler,
};

struct SubscribeOn<T, S: ?Sized> {
  source: Observable<T>,
  scheduler: Arc<S>,
}

impl<T, S> Producer<T> for SubscribeOn<T, S>
where
  T: Send + 'static,
  S: ImmediateScheduler + ?Sized + 'static,
{
  fn subscribe(&self, observer: AnyObserver<T>) -> BoxedDisposable {
    let source = self.source.clone();
    self.scheduler.schedule_action(Box::new(move || source.subscribe(observer)))
  }
}

impl<T: Send + 'static> Observable<T> {
  /// Performs the subscription to the source (and whatever the source does
  /// synchronously inside it) on `scheduler`.
  pub fn subscribe_on<S>(&self, scheduler: Arc<S>) -> Observable<T>
  where
    S: ImmediateScheduler + ?Sized + 'static,
  {
    Observable::new(SubscribeOn { source: self.clone(), scheduler })
  }
}

#[cfg(test)]
mod tests {
  use std::{sync::mpsc, thread, time::Duration};

  use super::*;
  use crate::{
    disposable::Disposable,
    event::Event,
    observer::Observer,
    scheduler::{QueueConfiguration, SerialQueueScheduler, VirtualTimeScheduler},
    test_util::Recorder,
  };

  #[rxcore_macro::test]
  fn subscription_is_deferred() {
    let scheduler = Arc::new(VirtualTimeScheduler::new());
    let recorder = Recorder::new();
    Observable::just(1).subscribe_on(scheduler.clone()).subscribe(recorder.clone());
    assert!(recorder.events().is_empty());
    scheduler.advance_by(Duration::ZERO);
    assert_eq!(recorder.events(), vec![Event::Next(1), Event::Completed]);
  }

  #[rxcore_macro::test]
  fn cancelled_before_subscribing() {
    let scheduler = Arc::new(VirtualTimeScheduler::new());
    let recorder = Recorder::<i32>::new();
    let d = Observable::just(1).subscribe_on(scheduler.clone()).subscribe(recorder.clone());
    d.dispose();
    scheduler.start();
    assert!(recorder.events().is_empty());
  }

  #[rxcore_macro::test]
  fn source_runs_on_the_scheduler_thread() {
    let scheduler = Arc::new(SerialQueueScheduler::new(QueueConfiguration::default()).unwrap());
    let (tx, rx) = mpsc::channel();
    let source = Observable::create(move |observer| {
      observer.on_next(thread::current().id());
      observer.on_completed();
      crate::disposable::Disposables::nop()
    });
    source.subscribe_on(scheduler).subscribe_next(move |id| tx.send(id).unwrap());
    let id = rx.recv_timeout(Duration::from_secs(5)).unwrap();
    assert_ne!(id, thread::current().id());
  }
}
